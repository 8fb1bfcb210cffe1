// ABOUTME: Resolves normalized shortcuts to bindings and drives launch / focus-toggle actions
// ABOUTME: Runs on the key-event path; blocking activation is handed to the activation worker

use crate::activation::{Activation, ActivationQueue, ActivationRequest};
use crate::error::Error;
use crate::keys::Shortcut;
use crate::registry::ShortcutRegistry;
use crate::platform::Workspace;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What a single key event led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No binding holds this shortcut.
    Unbound,
    /// Same shortcut arrived again inside the debounce window.
    Debounced,
    /// The application is not running and could not be located.
    NotFound,
    /// The application was located but could not be started.
    LaunchFailed,
    Dispatched { launched: bool, activation: Activation },
}

/// Suppresses repeats of the same shortcut within a window. A zero window never suppresses.
struct Debounce {
    window: Duration,
    last: Mutex<Option<(Shortcut, Instant)>>,
}

impl Debounce {
    fn new(window: Duration) -> Self {
        Self {
            window,
            last: Mutex::new(None),
        }
    }

    fn admit(&self, shortcut: &Shortcut) -> bool {
        if self.window.is_zero() {
            return true;
        }

        let now = Instant::now();
        let mut last = self.last.lock();
        let repeated = matches!(
            last.as_ref(),
            Some((previous, at)) if previous == shortcut && now.duration_since(*at) < self.window
        );
        if !repeated {
            *last = Some((shortcut.clone(), now));
        }
        !repeated
    }
}

pub struct Dispatcher {
    registry: Arc<ShortcutRegistry>,
    workspace: Arc<dyn Workspace>,
    activations: ActivationQueue,
    debounce: Debounce,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<ShortcutRegistry>,
        workspace: Arc<dyn Workspace>,
        activations: ActivationQueue,
        debounce: Duration,
    ) -> Self {
        Self {
            registry,
            workspace,
            activations,
            debounce: Debounce::new(debounce),
        }
    }

    /// Entry point for every normalized key event from either listener.
    pub fn on_key_event(&self, shortcut: &Shortcut) -> DispatchOutcome {
        let Some(binding) = self.registry.lookup(shortcut.as_str()) else {
            tracing::trace!("No binding for {}", shortcut);
            return DispatchOutcome::Unbound;
        };

        if !self.debounce.admit(shortcut) {
            tracing::debug!("Ignoring repeated {} inside debounce window", shortcut);
            return DispatchOutcome::Debounced;
        }

        let app = binding.application_id.as_str();
        let in_focus = self.workspace.is_frontmost(app);

        let mut launched = false;
        if binding.launch_on_invoke && !self.workspace.is_running(app) {
            let Some(location) = self.workspace.resolve_application(app) else {
                tracing::warn!("{}", Error::ApplicationNotFound(app.to_string()));
                return DispatchOutcome::NotFound;
            };
            if let Err(e) = self.workspace.launch(app, &location) {
                tracing::warn!("{}", e);
                return DispatchOutcome::LaunchFailed;
            }
            tracing::info!("Launched {} from {}", app, location.display());
            launched = true;
        }

        let activation = if binding.toggle_on_invoke && in_focus {
            Activation::Hide
        } else {
            Activation::Front
        };

        tracing::debug!(
            shortcut = %shortcut,
            in_focus,
            launched,
            "{} {}",
            activation,
            app
        );
        self.activations.submit(ActivationRequest {
            application_id: binding.application_id.clone(),
            activation,
        });

        DispatchOutcome::Dispatched { launched, activation }
    }
}

// ABOUTME: Wires the key monitors, normalizer, registry, dispatcher and activation worker into one service
// ABOUTME: Owns the lifecycle: start subscribes, stop detaches, shutdown drains the worker

use crate::activation::{ActivationReport, ActivationWorker};
use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::keys::Normalizer;
use crate::monitor::{ShortcutHandler, ShortcutMonitor};
use crate::platform::{Activator, KeySource, Platform, Workspace};
use crate::registry::{Binding, ShortcutRegistry};
use crate::store::{BindingStore, StoreWatcher};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::Receiver;

pub struct HotkeyService {
    // Declaration order is drop order: detach listeners before the worker goes away
    monitor: ShortcutMonitor,
    watcher: Option<StoreWatcher>,
    dispatcher: Arc<Dispatcher>,
    registry: Arc<ShortcutRegistry>,
    normalizer: Normalizer,
    worker: ActivationWorker,
}

impl HotkeyService {
    /// Builds the service on the native platform and indexes the bindings stored at `bindings_path`.
    pub fn new(config: &Config, bindings_path: &Path) -> Result<Self> {
        let mut service = Self::with_platform(
            config,
            Platform::key_source(),
            Platform::workspace(),
            Platform::activator(&config.activation),
        )?;

        let store = BindingStore::open(bindings_path)?;
        service.load_bindings(store.bindings().iter().cloned());

        if config.store.watch {
            match StoreWatcher::spawn(bindings_path, service.registry.clone()) {
                Ok(watcher) => service.watcher = Some(watcher),
                Err(e) => tracing::warn!("Bindings will not reload automatically: {:#}", e),
            }
        }

        Ok(service)
    }

    pub fn with_platform(
        config: &Config,
        key_source: Box<dyn KeySource>,
        workspace: Arc<dyn Workspace>,
        activator: Box<dyn Activator>,
    ) -> Result<Self> {
        let registry = Arc::new(ShortcutRegistry::new());
        let worker = ActivationWorker::spawn(activator).context("Failed to start activation worker")?;
        let dispatcher = Arc::new(Dispatcher::new(
            registry.clone(),
            workspace,
            worker.queue(),
            config.dispatch.debounce(),
        ));

        Ok(Self {
            monitor: ShortcutMonitor::new(key_source, config.monitor.clone()),
            watcher: None,
            dispatcher,
            registry,
            normalizer: Normalizer::native(),
            worker,
        })
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn registry(&self) -> &Arc<ShortcutRegistry> {
        &self.registry
    }

    pub fn load_bindings<I>(&self, bindings: I) -> usize
    where
        I: IntoIterator<Item = Binding>,
    {
        let count = self.registry.load_all(bindings);
        tracing::info!("Loaded {} shortcuts", count);
        count
    }

    pub fn is_running(&self) -> bool {
        self.monitor.is_monitoring()
    }

    pub fn start(&mut self) -> Result<()> {
        let normalizer = self.normalizer;
        tracing::debug!("Labelling digit and function keys with {} key codes", normalizer.keymap().name());
        let dispatcher = self.dispatcher.clone();
        let handler: ShortcutHandler = Arc::new(move |source, event| {
            let shortcut = normalizer.normalize(&event);
            tracing::trace!(?source, key_code = event.key_code, "Key event {}", shortcut);
            dispatcher.on_key_event(&shortcut);
        });

        self.monitor.start(handler)
    }

    pub fn stop(&mut self) {
        self.monitor.stop();
    }

    /// Hands activation outcomes to the event loop. Only the first call returns the channel.
    pub fn take_reports(&mut self) -> Option<Receiver<ActivationReport>> {
        self.worker.take_reports()
    }

    /// Stops listening, then lets the worker finish queued requests.
    pub fn shutdown(mut self) -> Vec<ActivationReport> {
        self.stop();
        if let Some(watcher) = self.watcher.take() {
            tracing::debug!("No longer watching {}", watcher.path().display());
        }
        let Self { worker, .. } = self;
        worker.shutdown()
    }
}

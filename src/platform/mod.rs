// ABOUTME: Platform abstraction layer defining the OS capabilities the dispatcher depends on
// ABOUTME: Key-event subscriptions, process/focus queries, and privileged front/hide requests

use crate::activation::ActivationReport;
use crate::config::ActivationConfig;
use crate::error::Result;
use crate::keys::RawKeyEvent;
use crate::monitor::Subscription;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

#[cfg(target_os = "macos")]
pub mod macos;
#[cfg(any(target_os = "linux", target_os = "freebsd"))]
pub mod unix;

/// Callback invoked for every key-down event a subscription observes.
pub type KeyHandler = Arc<dyn Fn(RawKeyEvent) + Send + Sync>;

/// Key-down event subscriptions supplied by the host OS.
pub trait KeySource {
    /// Checks (and optionally prompts for) the permission global monitoring needs.
    fn check_accessibility(&self, prompt: bool) -> bool;

    /// Observes key-down events system-wide, even when this process is not focused.
    fn subscribe_global(&mut self, handler: KeyHandler) -> anyhow::Result<Subscription>;

    /// Observes key-down events delivered to this process. Events keep propagating.
    fn subscribe_local(&mut self, handler: KeyHandler) -> anyhow::Result<Subscription>;
}

/// Process enumeration, focus state, and launching.
pub trait Workspace: Send + Sync {
    fn frontmost_application(&self) -> Option<String>;

    fn is_frontmost(&self, application_id: &str) -> bool {
        self.frontmost_application().as_deref() == Some(application_id)
    }

    fn is_running(&self, application_id: &str) -> bool;

    fn resolve_application(&self, application_id: &str) -> Option<PathBuf>;

    fn launch(&self, application_id: &str, location: &Path) -> Result<()>;
}

/// Privileged automation channel that fronts or hides an application.
pub trait Activator: Send {
    fn bring_to_front(&self, application_id: &str) -> Result<()>;

    fn hide(&self, application_id: &str) -> Result<()>;
}

/// Platform factory to get the appropriate implementations
pub struct Platform;

impl Platform {
    #[cfg(target_os = "macos")]
    pub fn key_source() -> Box<dyn KeySource> {
        Box::new(macos::MacKeySource::new())
    }

    #[cfg(any(target_os = "linux", target_os = "freebsd"))]
    pub fn key_source() -> Box<dyn KeySource> {
        Box::new(unix::UnixKeySource::new())
    }

    #[cfg(target_os = "macos")]
    pub fn workspace() -> Arc<dyn Workspace> {
        Arc::new(macos::MacWorkspace::new())
    }

    #[cfg(any(target_os = "linux", target_os = "freebsd"))]
    pub fn workspace() -> Arc<dyn Workspace> {
        Arc::new(unix::UnixWorkspace::new())
    }

    #[cfg(target_os = "macos")]
    pub fn activator(config: &ActivationConfig) -> Box<dyn Activator> {
        Box::new(macos::MacActivator::new(config.clone()))
    }

    #[cfg(any(target_os = "linux", target_os = "freebsd"))]
    pub fn activator(config: &ActivationConfig) -> Box<dyn Activator> {
        Box::new(unix::UnixActivator::new(config.clone()))
    }

    /// Must run on the main thread before any key source is subscribed.
    #[cfg(target_os = "macos")]
    pub fn prepare_event_loop() -> anyhow::Result<()> {
        macos::prepare_application()
    }

    #[cfg(any(target_os = "linux", target_os = "freebsd"))]
    pub fn prepare_event_loop() -> anyhow::Result<()> {
        Ok(())
    }

    /// Blocks for the lifetime of the process.
    #[cfg(target_os = "macos")]
    pub fn run_event_loop(reports: Option<Receiver<ActivationReport>>) -> anyhow::Result<()> {
        if let Some(reports) = reports {
            std::thread::Builder::new()
                .name("hotswitch-reports".to_string())
                .spawn(move || crate::activation::run_report_loop(reports))?;
        }
        macos::run_application()
    }

    #[cfg(any(target_os = "linux", target_os = "freebsd"))]
    pub fn run_event_loop(reports: Option<Receiver<ActivationReport>>) -> anyhow::Result<()> {
        match reports {
            Some(reports) => crate::activation::run_report_loop(reports),
            None => loop {
                std::thread::park();
            },
        }
        Ok(())
    }

    /// Waits up to `timeout` for a value, servicing the native event loop when it
    /// has to run on the calling thread for key callbacks to arrive.
    #[cfg(target_os = "macos")]
    pub fn recv_with_events<T>(receiver: &Receiver<T>, timeout: Duration) -> Option<T> {
        if let Ok(value) = receiver.try_recv() {
            return Some(value);
        }
        if let Err(e) = macos::pump_events(timeout) {
            tracing::warn!("Cannot dispatch key events: {:#}", e);
            std::thread::sleep(timeout);
        }
        receiver.try_recv().ok()
    }

    #[cfg(any(target_os = "linux", target_os = "freebsd"))]
    pub fn recv_with_events<T>(receiver: &Receiver<T>, timeout: Duration) -> Option<T> {
        receiver.recv_timeout(timeout).ok()
    }
}

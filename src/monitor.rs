// ABOUTME: Lifecycle for the global and local key-event subscriptions
// ABOUTME: start() installs handlers and keeps their guards; stop() or drop detaches every handler

use crate::config::MonitorConfig;
use crate::keys::{EventSource, RawKeyEvent};
use crate::platform::{KeyHandler, KeySource};
use anyhow::{Result, anyhow};
use std::sync::Arc;

/// Scoped handle for one OS event subscription. Dropping it detaches the handler.
pub struct Subscription {
    label: &'static str,
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new<F>(label: &'static str, cancel: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            label,
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to detach, for sources that cannot deliver events.
    pub fn inert(label: &'static str) -> Self {
        Self {
            label,
            cancel: None,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
            tracing::debug!("Detached {} key monitor", self.label);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

pub type ShortcutHandler = Arc<dyn Fn(EventSource, RawKeyEvent) + Send + Sync>;

pub struct ShortcutMonitor {
    source: Box<dyn KeySource>,
    config: MonitorConfig,
    subscriptions: Vec<Subscription>,
}

impl ShortcutMonitor {
    pub fn new(source: Box<dyn KeySource>, config: MonitorConfig) -> Self {
        Self {
            source,
            config,
            subscriptions: Vec::new(),
        }
    }

    pub fn is_monitoring(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    pub fn start(&mut self, handler: ShortcutHandler) -> Result<()> {
        if self.is_monitoring() {
            tracing::debug!("Shortcut monitor already running");
            return Ok(());
        }

        if !self.source.check_accessibility(self.config.prompt_for_accessibility) {
            tracing::warn!(
                "Accessibility permission not granted; global shortcuts stay inactive until it is"
            );
        }

        if self.config.global {
            let handler = handler.clone();
            let tagged: KeyHandler = Arc::new(move |event| handler(EventSource::Global, event));
            match self.source.subscribe_global(tagged) {
                Ok(subscription) => self.subscriptions.push(subscription),
                Err(e) => tracing::warn!("Global key monitor unavailable: {:#}", e),
            }
        }

        if self.config.local {
            let handler = handler.clone();
            let tagged: KeyHandler = Arc::new(move |event| handler(EventSource::Local, event));
            match self.source.subscribe_local(tagged) {
                Ok(subscription) => self.subscriptions.push(subscription),
                Err(e) => tracing::warn!("Local key monitor unavailable: {:#}", e),
            }
        }

        if self.subscriptions.is_empty() {
            return Err(anyhow!("no key event source could be subscribed"));
        }

        let labels: Vec<_> = self.subscriptions.iter().map(Subscription::label).collect();
        tracing::info!("Listening for shortcuts ({})", labels.join(", "));
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.subscriptions.is_empty() {
            return;
        }
        for subscription in self.subscriptions.drain(..) {
            subscription.cancel();
        }
        tracing::info!("Stopped listening for shortcuts");
    }
}

impl Drop for ShortcutMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

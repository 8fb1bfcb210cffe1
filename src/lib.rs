// ABOUTME: Library root for hotswitch, global shortcuts that launch, focus, and hide applications
// ABOUTME: Exposes the normalizer, registry, dispatcher, and platform seams for the binary and tests

pub mod activation;
pub mod app;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod keys;
pub mod logging;
pub mod monitor;
pub mod platform;
pub mod record;
pub mod registry;
pub mod store;

pub use app::HotkeyService;
pub use config::Config;
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::{Error, Result};
pub use keys::{Normalizer, RawKeyEvent, Shortcut};
pub use registry::{Binding, ShortcutRegistry};

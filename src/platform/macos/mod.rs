// ABOUTME: macOS platform implementations: NSEvent key monitors, NSWorkspace queries, AppleScript activation
// ABOUTME: Also owns the accessory-policy NSApplication the monitors need to receive events

mod activator;
mod monitor;
mod permissions;
mod workspace;

pub use activator::MacActivator;
pub use monitor::MacKeySource;
pub use workspace::MacWorkspace;

use anyhow::{Result, anyhow};
use objc2_app_kit::{NSApplication, NSApplicationActivationPolicy, NSEventMask};
use objc2_foundation::{MainThreadMarker, NSDate, NSDefaultRunLoopMode};
use std::time::Duration;

fn main_thread() -> Result<MainThreadMarker> {
    MainThreadMarker::new().ok_or_else(|| anyhow!("the macOS event loop must run on the main thread"))
}

/// Creates the shared application as a background (no Dock icon) app.
pub fn prepare_application() -> Result<()> {
    let mtm = main_thread()?;
    let app = NSApplication::sharedApplication(mtm);
    if !app.setActivationPolicy(NSApplicationActivationPolicy::Accessory) {
        tracing::warn!("Could not switch to the accessory activation policy");
    }
    tracing::debug!("NSApplication prepared");
    Ok(())
}

pub fn run_application() -> Result<()> {
    let mtm = main_thread()?;
    let app = NSApplication::sharedApplication(mtm);
    tracing::info!("Entering the macOS run loop");
    #[allow(unused_unsafe)]
    unsafe {
        app.run();
    }
    Ok(())
}

/// Dispatches at most one AppKit event, waiting up to `timeout` for it to arrive.
/// Lets short-lived commands receive monitor callbacks without entering `run`.
pub fn pump_events(timeout: Duration) -> Result<()> {
    let mtm = main_thread()?;
    let app = NSApplication::sharedApplication(mtm);
    let until = NSDate::dateWithTimeIntervalSinceNow(timeout.as_secs_f64());
    #[allow(unused_unsafe)]
    let event = unsafe {
        app.nextEventMatchingMask_untilDate_inMode_dequeue(
            NSEventMask::Any,
            Some(&until),
            NSDefaultRunLoopMode,
            true,
        )
    };
    if let Some(event) = event {
        app.sendEvent(&event);
    }
    Ok(())
}

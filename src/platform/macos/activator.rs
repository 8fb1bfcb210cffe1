// ABOUTME: Brings applications to the front through System Events AppleScript and hides them via AppKit
// ABOUTME: Runs on the activation worker, so blocking on osascript is acceptable here

use super::workspace::running_application;
use crate::activation::Activation;
use crate::config::ActivationConfig;
use crate::error::{Error, Result};
use crate::platform::Activator;
use std::process::Command;

pub struct MacActivator {
    config: ActivationConfig,
}

impl MacActivator {
    pub fn new(config: ActivationConfig) -> Self {
        Self { config }
    }
}

fn applescript_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Fronts the application's process, activating it if System Events cannot see one.
pub(crate) fn front_script(bundle_id: &str, raise_windows: bool) -> String {
    let id = applescript_escape(bundle_id);
    let mut script = format!(
        r#"tell application "System Events"
    set matches to (every application process whose bundle identifier is "{id}")
    if (count of matches) > 0 then
        set frontmost of (first item of matches) to true
    else
        tell application id "{id}" to activate
    end if
end tell"#
    );

    if raise_windows {
        script.push_str(&format!(
            r#"
tell application id "{id}"
    set windowCount to count of windows
    repeat with i from 1 to windowCount
        set index of window i to 1
    end repeat
end tell"#
        ));
    }

    script
}

impl Activator for MacActivator {
    fn bring_to_front(&self, application_id: &str) -> Result<()> {
        let script = front_script(application_id, self.config.raise_windows);
        let output = Command::new(&self.config.osascript)
            .args(["-e", &script])
            .output()
            .map_err(|e| Error::activation(application_id, Activation::Front, e.to_string()))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(Error::activation(application_id, Activation::Front, stderr.trim()))
        }
    }

    fn hide(&self, application_id: &str) -> Result<()> {
        let app = running_application(application_id)
            .ok_or_else(|| Error::activation(application_id, Activation::Hide, "not running"))?;

        #[allow(unused_unsafe)]
        let hidden = unsafe { app.hide() };
        if hidden {
            Ok(())
        } else {
            Err(Error::activation(application_id, Activation::Hide, "request refused"))
        }
    }
}

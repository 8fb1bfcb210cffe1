// ABOUTME: Fronts and minimizes application windows with wmctrl or xdotool
// ABOUTME: Wayland compositors do not allow this, so requests there fail with an activation error

use super::{DisplayServer, class_hint};
use crate::activation::Activation;
use crate::config::ActivationConfig;
use crate::error::{Error, Result};
use crate::platform::Activator;
use std::process::{Command, Stdio};

pub struct UnixActivator {
    config: ActivationConfig,
}

impl UnixActivator {
    pub fn new(config: ActivationConfig) -> Self {
        Self { config }
    }

    fn ensure_x11(&self, application_id: &str, action: Activation) -> Result<()> {
        if DisplayServer::detect() == DisplayServer::Wayland {
            return Err(Error::activation(
                application_id,
                action,
                "window activation is not available on Wayland",
            ));
        }
        Ok(())
    }
}

fn run(program: &str, args: &[&str]) -> bool {
    if which::which(program).is_err() {
        return false;
    }
    Command::new(program)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

/// xdotool arguments that find the application's windows and apply `action` to all of them.
pub(crate) fn xdotool_args<'a>(class: &'a str, action: &'a str, all_windows: bool) -> Vec<&'a str> {
    let mut args = vec!["search", "--onlyvisible", "--class", class, action];
    if all_windows {
        args.push("%@");
    }
    args
}

impl Activator for UnixActivator {
    fn bring_to_front(&self, application_id: &str) -> Result<()> {
        self.ensure_x11(application_id, Activation::Front)?;
        let class = class_hint(application_id);

        if run("wmctrl", &["-x", "-a", class]) {
            return Ok(());
        }
        if run("xdotool", &xdotool_args(class, "windowactivate", false)) {
            if self.config.raise_windows {
                run("xdotool", &xdotool_args(class, "windowraise", true));
            }
            return Ok(());
        }

        Err(Error::activation(
            application_id,
            Activation::Front,
            "no window found (requires wmctrl or xdotool)",
        ))
    }

    fn hide(&self, application_id: &str) -> Result<()> {
        self.ensure_x11(application_id, Activation::Hide)?;
        let class = class_hint(application_id);

        if run("xdotool", &xdotool_args(class, "windowminimize", true)) {
            Ok(())
        } else {
            Err(Error::activation(
                application_id,
                Activation::Hide,
                "no window found (requires xdotool)",
            ))
        }
    }
}

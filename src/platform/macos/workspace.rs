// ABOUTME: NSWorkspace-backed process, focus, and location queries keyed by bundle identifier
// ABOUTME: Launching opens the resolved application bundle

use crate::error::{Error, Result};
use crate::platform::Workspace;
use objc2::rc::Retained;
use objc2_app_kit::{NSRunningApplication, NSWorkspace};
use objc2_foundation::NSString;
use std::path::{Path, PathBuf};
use std::process::Command;

pub struct MacWorkspace;

impl MacWorkspace {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MacWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// First running instance of the application, if any.
pub(crate) fn running_application(bundle_id: &str) -> Option<Retained<NSRunningApplication>> {
    let bundle_id = NSString::from_str(bundle_id);
    #[allow(unused_unsafe)]
    let running = unsafe { NSRunningApplication::runningApplicationsWithBundleIdentifier(&bundle_id) };
    running.firstObject()
}

impl Workspace for MacWorkspace {
    fn frontmost_application(&self) -> Option<String> {
        let workspace = NSWorkspace::sharedWorkspace();
        let app = workspace.frontmostApplication()?;
        app.bundleIdentifier().map(|id| id.to_string())
    }

    fn is_running(&self, application_id: &str) -> bool {
        running_application(application_id).is_some()
    }

    fn resolve_application(&self, application_id: &str) -> Option<PathBuf> {
        let workspace = NSWorkspace::sharedWorkspace();
        let bundle_id = NSString::from_str(application_id);
        let url = workspace.URLForApplicationWithBundleIdentifier(&bundle_id)?;
        url.path().map(|path| PathBuf::from(path.to_string()))
    }

    fn launch(&self, application_id: &str, location: &Path) -> Result<()> {
        let launch_error = |source| Error::Launch {
            application_id: application_id.to_string(),
            source,
        };

        let status = Command::new("open").arg(location).status().map_err(launch_error)?;
        if !status.success() {
            return Err(launch_error(std::io::Error::other(format!(
                "open exited with {}",
                status
            ))));
        }
        Ok(())
    }
}

// ABOUTME: Process and focus queries through wmctrl, xdotool, and pgrep
// ABOUTME: Applications resolve to XDG desktop entries first, then to executables on PATH

use super::class_matches;
use crate::error::{Error, Result};
use crate::platform::Workspace;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;

pub struct UnixWorkspace;

impl UnixWorkspace {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UnixWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Stdout of a helper tool, or None when it is missing or fails.
pub(crate) fn tool_output(program: &str, args: &[&str]) -> Option<String> {
    which::which(program).ok()?;
    let output = Command::new(program)
        .args(args)
        .stderr(Stdio::null())
        .output()
        .ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).into_owned())
}

/// WM_CLASS column ("instance.Class") of each `wmctrl -lx` line.
pub(crate) fn window_classes(wmctrl_output: &str) -> Vec<&str> {
    wmctrl_output
        .lines()
        .filter_map(|line| line.split_whitespace().nth(2))
        .filter(|wm_class| wm_class.contains('.'))
        .collect()
}

/// Instance and class may both contain dots, so every split point is tried.
pub(crate) fn wm_class_matches(wm_class: &str, application_id: &str) -> bool {
    wm_class.match_indices('.').any(|(i, _)| {
        class_matches(&wm_class[..i], application_id) || class_matches(&wm_class[i + 1..], application_id)
    })
}

pub(crate) fn desktop_dirs() -> Vec<PathBuf> {
    let mut directories = Vec::new();
    if let Some(data) = dirs::data_dir() {
        directories.push(data.join("applications"));
    }
    match std::env::var("XDG_DATA_DIRS") {
        Ok(value) if !value.is_empty() => directories.extend(
            value
                .split(':')
                .filter(|dir| !dir.is_empty())
                .map(|dir| Path::new(dir).join("applications")),
        ),
        _ => {
            directories.push(PathBuf::from("/usr/local/share/applications"));
            directories.push(PathBuf::from("/usr/share/applications"));
        }
    }
    directories
}

/// Command line from a desktop entry's Exec value, without field codes such as %u.
pub(crate) fn exec_command(exec: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = exec.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => quoted = !quoted,
            '\\' if quoted => current.extend(chars.next()),
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        args.push(current);
    }

    args.retain(|arg| !(arg.len() == 2 && arg.starts_with('%')));
    args
}

#[cfg(target_os = "linux")]
fn desktop_exec(path: &Path) -> std::io::Result<Vec<String>> {
    use freedesktop_desktop_entry::DesktopEntry;
    use std::io::{Error as IoError, ErrorKind};

    let content = std::fs::read_to_string(path)?;
    let entry = DesktopEntry::decode(path, &content)
        .map_err(|e| IoError::new(ErrorKind::InvalidData, format!("{:?}", e)))?;
    let exec = entry
        .exec()
        .ok_or_else(|| IoError::new(ErrorKind::InvalidData, "desktop entry has no Exec line"))?;
    Ok(exec_command(exec))
}

#[cfg(not(target_os = "linux"))]
fn desktop_exec(path: &Path) -> std::io::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    content
        .lines()
        .find_map(|line| line.strip_prefix("Exec="))
        .map(exec_command)
        .ok_or_else(|| std::io::Error::other("desktop entry has no Exec line"))
}

impl Workspace for UnixWorkspace {
    fn frontmost_application(&self) -> Option<String> {
        let class = tool_output("xdotool", &["getactivewindow", "getwindowclassname"])?;
        let class = class.trim();
        (!class.is_empty()).then(|| class.to_string())
    }

    fn is_frontmost(&self, application_id: &str) -> bool {
        self.frontmost_application()
            .is_some_and(|class| class_matches(&class, application_id))
    }

    fn is_running(&self, application_id: &str) -> bool {
        if let Some(output) = tool_output("wmctrl", &["-lx"]) {
            let found = window_classes(&output)
                .into_iter()
                .any(|wm_class| wm_class_matches(wm_class, application_id));
            if found {
                return true;
            }
        }

        let process = super::class_hint(application_id);
        tool_output("pgrep", &["-x", process]).is_some()
    }

    fn resolve_application(&self, application_id: &str) -> Option<PathBuf> {
        let file_name = format!("{}.desktop", application_id);
        desktop_dirs()
            .into_iter()
            .map(|dir| dir.join(&file_name))
            .find(|path| path.is_file())
            .or_else(|| which::which(application_id).ok())
    }

    fn launch(&self, application_id: &str, location: &Path) -> Result<()> {
        let launch_error = |source| Error::Launch {
            application_id: application_id.to_string(),
            source,
        };

        let command = if location.extension().is_some_and(|ext| ext == "desktop") {
            desktop_exec(location).map_err(launch_error)?
        } else {
            vec![location.to_string_lossy().into_owned()]
        };

        let (program, args) = command
            .split_first()
            .ok_or_else(|| launch_error(std::io::Error::other("empty Exec line")))?;

        tracing::debug!("Launching {}: {} {:?}", application_id, program, args);
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(launch_error)?;
        reap_in_background(application_id, child);
        Ok(())
    }
}

/// Waits for a launched application on its own thread so its exit status is collected.
pub(crate) fn reap_in_background(application_id: &str, mut child: Child) {
    let application_id = application_id.to_string();
    let spawned = thread::Builder::new()
        .name("hotswitch-reaper".to_string())
        .spawn(move || match child.wait() {
            Ok(status) => tracing::debug!("{} exited: {}", application_id, status),
            Err(e) => tracing::debug!("Could not wait for {}: {}", application_id, e),
        });
    if let Err(e) = spawned {
        tracing::warn!("Launched process will not be reaped: {}", e);
    }
}

// ABOUTME: Unix platform implementations for Linux and FreeBSD
// ABOUTME: XInput2 raw key events, wmctrl/xdotool window control, and desktop-entry launching

mod activator;
mod monitor;
mod workspace;

pub use activator::UnixActivator;
pub use monitor::UnixKeySource;
pub use workspace::UnixWorkspace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayServer {
    X11,
    Wayland,
    Unknown,
}

impl DisplayServer {
    pub fn detect() -> Self {
        Self::from_env(
            std::env::var_os("WAYLAND_DISPLAY").is_some(),
            std::env::var_os("DISPLAY").is_some(),
        )
    }

    fn from_env(wayland_display: bool, x_display: bool) -> Self {
        if wayland_display {
            DisplayServer::Wayland
        } else if x_display {
            DisplayServer::X11
        } else {
            DisplayServer::Unknown
        }
    }
}

/// WM_CLASS-style name for an application id: "org.gnome.Nautilus" becomes "Nautilus".
pub(crate) fn class_hint(application_id: &str) -> &str {
    application_id.rsplit('.').next().unwrap_or(application_id)
}

pub(crate) fn class_matches(window_class: &str, application_id: &str) -> bool {
    window_class.eq_ignore_ascii_case(application_id)
        || window_class.eq_ignore_ascii_case(class_hint(application_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_server_detection() {
        assert_eq!(DisplayServer::from_env(true, true), DisplayServer::Wayland);
        assert_eq!(DisplayServer::from_env(false, true), DisplayServer::X11);
        assert_eq!(DisplayServer::from_env(false, false), DisplayServer::Unknown);
    }

    #[test]
    fn test_class_hint() {
        assert_eq!(class_hint("org.gnome.Nautilus"), "Nautilus");
        assert_eq!(class_hint("firefox"), "firefox");
    }

    #[test]
    fn test_class_matches() {
        assert!(class_matches("Nautilus", "org.gnome.Nautilus"));
        assert!(class_matches("firefox", "Firefox"));
        assert!(!class_matches("Navigator", "firefox"));
    }
}

// ABOUTME: Layout-independent label tables for digit and function keys keyed by physical scan code
// ABOUTME: Ships the macOS virtual key codes and the X11 evdev key codes

#[derive(Debug)]
pub struct Keymap {
    name: &'static str,
    entries: &'static [(u16, &'static str)],
}

const MACOS_ENTRIES: &[(u16, &str)] = &[
    (0x12, "1"),
    (0x13, "2"),
    (0x14, "3"),
    (0x15, "4"),
    (0x17, "5"),
    (0x16, "6"),
    (0x1A, "7"),
    (0x1C, "8"),
    (0x19, "9"),
    (0x1D, "0"),
    (0x7A, "F1"),
    (0x78, "F2"),
    (0x63, "F3"),
    (0x76, "F4"),
    (0x60, "F5"),
    (0x61, "F6"),
    (0x62, "F7"),
    (0x64, "F8"),
    (0x65, "F9"),
    (0x6D, "F10"),
    (0x67, "F11"),
    (0x6F, "F12"),
];

// evdev scan code + 8, as reported in X11 KeyPress.detail
const X11_EVDEV_ENTRIES: &[(u16, &str)] = &[
    (10, "1"),
    (11, "2"),
    (12, "3"),
    (13, "4"),
    (14, "5"),
    (15, "6"),
    (16, "7"),
    (17, "8"),
    (18, "9"),
    (19, "0"),
    (67, "F1"),
    (68, "F2"),
    (69, "F3"),
    (70, "F4"),
    (71, "F5"),
    (72, "F6"),
    (73, "F7"),
    (74, "F8"),
    (75, "F9"),
    (76, "F10"),
    (95, "F11"),
    (96, "F12"),
];

impl Keymap {
    pub const MACOS: Keymap = Keymap {
        name: "macos",
        entries: MACOS_ENTRIES,
    };

    pub const X11_EVDEV: Keymap = Keymap {
        name: "x11-evdev",
        entries: X11_EVDEV_ENTRIES,
    };

    /// The table matching the key codes delivered by this build's platform adapter.
    pub fn native() -> &'static Keymap {
        if cfg!(target_os = "macos") {
            &Self::MACOS
        } else {
            &Self::X11_EVDEV
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn label(&self, key_code: u16) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(code, _)| *code == key_code)
            .map(|(_, label)| *label)
    }

    pub fn key_code(&self, label: &str) -> Option<u16> {
        self.entries
            .iter()
            .find(|(_, candidate)| candidate.eq_ignore_ascii_case(label))
            .map(|(code, _)| *code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macos_digit_codes_follow_physical_layout() {
        assert_eq!(Keymap::MACOS.label(0x12), Some("1"));
        assert_eq!(Keymap::MACOS.label(0x17), Some("5"));
        assert_eq!(Keymap::MACOS.label(0x16), Some("6"));
        assert_eq!(Keymap::MACOS.label(0x1D), Some("0"));
    }

    #[test]
    fn test_function_keys() {
        assert_eq!(Keymap::MACOS.label(0x7A), Some("F1"));
        assert_eq!(Keymap::MACOS.label(0x6F), Some("F12"));
        assert_eq!(Keymap::X11_EVDEV.label(67), Some("F1"));
        assert_eq!(Keymap::X11_EVDEV.label(96), Some("F12"));
    }

    #[test]
    fn test_unmapped_code() {
        // 0x0C is "Q" on macOS: letters are resolved from the reported character
        assert_eq!(Keymap::MACOS.label(0x0C), None);
        assert_eq!(Keymap::X11_EVDEV.label(24), None);
    }

    #[test]
    fn test_reverse_lookup() {
        assert_eq!(Keymap::MACOS.key_code("f5"), Some(0x60));
        assert_eq!(Keymap::X11_EVDEV.key_code("7"), Some(16));
        assert_eq!(Keymap::MACOS.key_code("Q"), None);
    }

    #[test]
    fn test_tables_are_complete() {
        for keymap in [&Keymap::MACOS, &Keymap::X11_EVDEV] {
            for digit in 0..=9 {
                assert!(keymap.key_code(&digit.to_string()).is_some(), "{} missing {}", keymap.name(), digit);
            }
            for n in 1..=12 {
                assert!(keymap.key_code(&format!("F{n}")).is_some(), "{} missing F{}", keymap.name(), n);
            }
        }
    }
}

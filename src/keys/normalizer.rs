// ABOUTME: Converts raw key-down events into canonical, order-stable shortcut strings
// ABOUTME: Digits and function keys resolve by scan code; other keys fall back to the reported character

use super::event::RawKeyEvent;
use super::keymap::Keymap;
use super::shortcut::Shortcut;

const UNKNOWN_KEY: &str = "Unknown";

#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    keymap: &'static Keymap,
}

impl Normalizer {
    pub fn new(keymap: &'static Keymap) -> Self {
        Self { keymap }
    }

    pub fn native() -> Self {
        Self::new(Keymap::native())
    }

    pub fn keymap(&self) -> &'static Keymap {
        self.keymap
    }

    pub fn normalize(&self, event: &RawKeyEvent) -> Shortcut {
        Shortcut::compose(event.modifiers, &self.key_label(event))
    }

    /// False when the key would only be labelled "Unknown".
    pub fn recognizes(&self, event: &RawKeyEvent) -> bool {
        self.keymap.label(event.key_code).is_some()
            || event.characters.as_deref().is_some_and(|c| !c.is_empty())
    }

    fn key_label(&self, event: &RawKeyEvent) -> String {
        if let Some(label) = self.keymap.label(event.key_code) {
            return label.to_string();
        }

        match event.characters.as_deref() {
            Some(characters) if !characters.is_empty() => characters.to_uppercase(),
            _ => UNKNOWN_KEY.to_string(),
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::native()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Modifiers;

    const KEY_1: u16 = 0x12;
    const KEY_Q: u16 = 0x0C;

    fn mac() -> Normalizer {
        Normalizer::new(&Keymap::MACOS)
    }

    #[test]
    fn test_modifier_order_is_fixed() {
        let event = RawKeyEvent::new(Modifiers::SHIFT | Modifiers::COMMAND, KEY_1, Some("!"));
        assert_eq!(mac().normalize(&event).as_str(), "Cmd+Shift+1");

        let all = RawKeyEvent::new(
            Modifiers::OPTION | Modifiers::CONTROL | Modifiers::SHIFT | Modifiers::COMMAND,
            KEY_Q,
            Some("q"),
        );
        assert_eq!(mac().normalize(&all).as_str(), "Cmd+Shift+Ctrl+Opt+Q");
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let mut a = Modifiers::empty();
        a.insert(Modifiers::OPTION);
        a.insert(Modifiers::COMMAND);
        let mut b = Modifiers::empty();
        b.insert(Modifiers::COMMAND);
        b.insert(Modifiers::OPTION);

        let left = mac().normalize(&RawKeyEvent::new(a, 0x7A, None));
        let right = mac().normalize(&RawKeyEvent::new(b, 0x7A, None));
        assert_eq!(left, right);
        assert_eq!(left.as_str(), "Cmd+Opt+F1");
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let event = RawKeyEvent::new(Modifiers::CONTROL, KEY_Q, Some("q"));
        assert_eq!(mac().normalize(&event), mac().normalize(&event));
    }

    #[test]
    fn test_scan_code_wins_over_character() {
        // A non-US layout may report a different character for the "1" key
        let event = RawKeyEvent::new(Modifiers::COMMAND, KEY_1, Some("&"));
        assert_eq!(mac().normalize(&event).as_str(), "Cmd+1");
    }

    #[test]
    fn test_fallback_character_is_uppercased() {
        let event = RawKeyEvent::new(Modifiers::empty(), KEY_Q, Some("q"));
        assert_eq!(mac().normalize(&event).as_str(), "Q");
    }

    #[test]
    fn test_missing_character_is_unknown() {
        let event = RawKeyEvent::new(Modifiers::empty(), KEY_Q, None);
        assert_eq!(mac().normalize(&event).as_str(), "Unknown");

        let empty = RawKeyEvent::new(Modifiers::COMMAND, KEY_Q, Some(""));
        assert_eq!(mac().normalize(&empty).as_str(), "Cmd+Unknown");
    }

    #[test]
    fn test_recognizes() {
        assert!(mac().recognizes(&RawKeyEvent::new(Modifiers::COMMAND, KEY_1, None)));
        assert!(mac().recognizes(&RawKeyEvent::new(Modifiers::COMMAND, KEY_Q, Some("q"))));
        assert!(!mac().recognizes(&RawKeyEvent::new(Modifiers::COMMAND, KEY_Q, Some(""))));
    }

    #[test]
    fn test_x11_keymap() {
        let normalizer = Normalizer::new(&Keymap::X11_EVDEV);
        let event = RawKeyEvent::new(Modifiers::COMMAND, 10, Some("1"));
        assert_eq!(normalizer.normalize(&event).as_str(), "Cmd+1");
    }

    #[test]
    fn test_matches_parsed_shortcut() {
        let event = RawKeyEvent::new(Modifiers::SHIFT | Modifiers::COMMAND, KEY_1, Some("1"));
        assert_eq!(mac().normalize(&event), Shortcut::parse("shift+cmd+1").unwrap());
    }
}

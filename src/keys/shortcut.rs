// ABOUTME: Canonical shortcut string with an "unset" sentinel and a parser for user-typed shortcuts
// ABOUTME: Parsed shortcuts are byte-identical to what the normalizer produces for the same key press

use super::event::{MODIFIER_LABELS, Modifiers};
use super::keymap::Keymap;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Marker older stores wrote for a binding without a key.
const LEGACY_UNSET_MARKER: &str = "null";

/// Canonical encoding of a modifier set plus a key, e.g. `Cmd+Shift+1`.
///
/// The empty string is the unset sentinel: it is never indexed and is exempt
/// from the uniqueness invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Shortcut(String);

impl Shortcut {
    pub fn unset() -> Self {
        Shortcut(String::new())
    }

    pub fn is_unset(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn compose(modifiers: Modifiers, key_label: &str) -> Self {
        let mut shortcut = String::with_capacity(key_label.len() + 16);
        for (flag, label) in MODIFIER_LABELS {
            if modifiers.contains(flag) {
                shortcut.push_str(label);
            }
        }
        shortcut.push_str(key_label);
        Shortcut(shortcut)
    }

    /// Parses a user-typed shortcut such as `shift+cmd+1` into canonical form.
    ///
    /// A trailing `++` names the plus key. Keys longer than one character must be a
    /// function key or one of the names in `NAMED_KEYS`, so every accepted shortcut
    /// is one the normalizer can produce.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason| Error::InvalidShortcut {
            input: input.to_string(),
            reason,
        };

        if input.trim().is_empty() {
            return Err(invalid("empty shortcut"));
        }

        let (modifier_part, key) = split_key(input);
        let key = if !key.is_empty() && key.trim().is_empty() {
            " "
        } else {
            key.trim()
        };
        if key.is_empty() {
            return Err(invalid("missing key"));
        }

        let mut modifiers = Modifiers::empty();
        if let Some(modifier_part) = modifier_part {
            for token in modifier_part.split('+') {
                modifiers |= match token.trim().to_lowercase().as_str() {
                    "cmd" | "command" | "super" => Modifiers::COMMAND,
                    "shift" => Modifiers::SHIFT,
                    "ctrl" | "control" => Modifiers::CONTROL,
                    "opt" | "option" | "alt" => Modifiers::OPTION,
                    "" => return Err(invalid("empty modifier")),
                    _ => return Err(invalid("unknown modifier")),
                };
            }
        }

        let key_label = key_label(key).ok_or_else(|| invalid("unknown key"))?;
        Ok(Self::compose(modifiers, &key_label))
    }
}

/// Key names accepted for keys whose label is a single control or blank character.
const NAMED_KEYS: [(&str, &str); 7] = [
    ("space", " "),
    ("plus", "+"),
    ("enter", "\r"),
    ("return", "\r"),
    ("tab", "\t"),
    ("escape", "\u{1b}"),
    ("esc", "\u{1b}"),
];

/// Splits off the key token. `None` means no separator was present.
fn split_key(input: &str) -> (Option<&str>, &str) {
    let input = input.trim_start();
    let end_trimmed = input.trim_end();
    if end_trimmed == "+" {
        return (None, "+");
    }
    if let Some(modifier_part) = end_trimmed.strip_suffix("++") {
        return (Some(modifier_part), "+");
    }
    match input.rsplit_once('+') {
        Some((modifier_part, key)) => (Some(modifier_part), key),
        None => (None, input),
    }
}

fn key_label(key: &str) -> Option<String> {
    let mut chars = key.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(c.to_uppercase().collect());
    }

    let keymap = Keymap::native();
    if let Some(label) = keymap.key_code(key).and_then(|code| keymap.label(code)) {
        return Some(label.to_string());
    }

    NAMED_KEYS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .map(|(_, label)| label.to_string())
}

impl From<String> for Shortcut {
    fn from(value: String) -> Self {
        if value.is_empty() || value == LEGACY_UNSET_MARKER {
            return Shortcut::unset();
        }
        match Shortcut::parse(&value) {
            Ok(shortcut) => {
                if shortcut.as_str() != value {
                    tracing::debug!("Stored shortcut {:?} read as {:?}", value, shortcut.as_str());
                }
                shortcut
            }
            Err(e) => {
                tracing::warn!("Keeping stored shortcut {:?} as written: {}", value, e);
                Shortcut(value)
            }
        }
    }
}

impl From<Shortcut> for String {
    fn from(value: Shortcut) -> Self {
        value.0
    }
}

impl FromStr for Shortcut {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Shortcut::parse(s)
    }
}

impl Borrow<str> for Shortcut {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unset() {
            f.write_str("(unset)")
        } else {
            f.write_str(&self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{Normalizer, RawKeyEvent};

    #[test]
    fn test_parse_reorders_modifiers() {
        assert_eq!(Shortcut::parse("shift+cmd+1").unwrap().as_str(), "Cmd+Shift+1");
        assert_eq!(
            Shortcut::parse("alt+ctrl+shift+command+k").unwrap().as_str(),
            "Cmd+Shift+Ctrl+Opt+K"
        );
    }

    #[test]
    fn test_parse_is_idempotent_on_canonical_input() {
        let canonical = "Cmd+Ctrl+F5";
        assert_eq!(Shortcut::parse(canonical).unwrap().as_str(), canonical);
    }

    #[test]
    fn test_parse_aliases_and_spacing() {
        assert_eq!(Shortcut::parse(" Super + Option + q ").unwrap().as_str(), "Cmd+Opt+Q");
        assert_eq!(Shortcut::parse("ctrl+space").unwrap().as_str(), "Ctrl+ ");
        assert_eq!(Shortcut::parse("f12").unwrap().as_str(), "F12");
    }

    #[test]
    fn test_parse_without_modifiers() {
        assert_eq!(Shortcut::parse("q").unwrap().as_str(), "Q");
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert!(Shortcut::parse("").is_err());
        assert!(Shortcut::parse("cmd+").is_err());
        assert!(Shortcut::parse("cmd++1").is_err());
        assert!(Shortcut::parse("++").is_err());
        let err = Shortcut::parse("hyper+1").unwrap_err();
        assert!(err.to_string().contains("unknown modifier"));
    }

    #[test]
    fn test_parse_plus_key() {
        let mac = Normalizer::new(&Keymap::MACOS);
        let plus = RawKeyEvent::new(Modifiers::COMMAND, 0x18, Some("+"));
        assert_eq!(Shortcut::parse("cmd++").unwrap(), mac.normalize(&plus));
        assert_eq!(Shortcut::parse("Cmd++").unwrap().as_str(), "Cmd++");
        assert_eq!(Shortcut::parse("cmd+plus").unwrap().as_str(), "Cmd++");
        assert_eq!(Shortcut::parse("+").unwrap().as_str(), "+");
    }

    #[test]
    fn test_parse_named_keys_match_reported_characters() {
        let mac = Normalizer::new(&Keymap::MACOS);
        let enter = RawKeyEvent::new(Modifiers::COMMAND, 0x24, Some("\r"));
        assert_eq!(Shortcut::parse("cmd+enter").unwrap(), mac.normalize(&enter));
        assert_eq!(Shortcut::parse("cmd+return").unwrap(), mac.normalize(&enter));

        let tab = RawKeyEvent::new(Modifiers::OPTION, 0x30, Some("\t"));
        assert_eq!(Shortcut::parse("alt+tab").unwrap(), mac.normalize(&tab));
    }

    #[test]
    fn test_parse_rejects_unknown_key_names() {
        let err = Shortcut::parse("cmd+foo").unwrap_err();
        assert!(err.to_string().contains("unknown key"));
        assert!(Shortcut::parse("cmd+f13").is_err());
        assert!(Shortcut::parse("cmd+Unknown").is_err());
    }

    #[test]
    fn test_parse_accepts_canonical_space() {
        let canonical = Shortcut::parse("ctrl+space").unwrap();
        assert_eq!(Shortcut::parse(canonical.as_str()).unwrap(), canonical);
    }

    #[test]
    fn test_legacy_marker_is_unset() {
        assert!(Shortcut::from("null".to_string()).is_unset());
        assert!(Shortcut::from(String::new()).is_unset());
        assert!(!Shortcut::from("Cmd+1".to_string()).is_unset());
    }

    #[test]
    fn test_stored_strings_are_canonicalized() {
        assert_eq!(Shortcut::from("cmd+1".to_string()).as_str(), "Cmd+1");
        assert_eq!(Shortcut::from("shift+cmd+q".to_string()).as_str(), "Cmd+Shift+Q");
        assert_eq!(Shortcut::from("Cmd+F5".to_string()).as_str(), "Cmd+F5");
    }

    #[test]
    fn test_unparseable_stored_string_is_kept() {
        let kept = Shortcut::from("Cmd+Unknown".to_string());
        assert_eq!(kept.as_str(), "Cmd+Unknown");
        assert!(!kept.is_unset());
    }

    #[test]
    fn test_display() {
        assert_eq!(Shortcut::unset().to_string(), "(unset)");
        assert_eq!(Shortcut::parse("cmd+2").unwrap().to_string(), "Cmd+2");
    }
}

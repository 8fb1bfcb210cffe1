// ABOUTME: Immutable key-down payload built once at the OS boundary
// ABOUTME: Carries the modifier set, physical key code, and the OS-reported fallback character

use bitflags::bitflags;

bitflags! {
    /// The four modifier classes a shortcut may use.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const COMMAND = 1 << 0;
        const SHIFT = 1 << 1;
        const CONTROL = 1 << 2;
        const OPTION = 1 << 3;
    }
}

/// Canonical label order. Shortcut strings always list modifiers in this order.
pub(crate) const MODIFIER_LABELS: [(Modifiers, &str); 4] = [
    (Modifiers::COMMAND, "Cmd+"),
    (Modifiers::SHIFT, "Shift+"),
    (Modifiers::CONTROL, "Ctrl+"),
    (Modifiers::OPTION, "Opt+"),
];

/// Which listener delivered an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    Global,
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawKeyEvent {
    pub modifiers: Modifiers,
    pub key_code: u16,
    /// Character produced by the key with no modifiers applied, if the OS reports one.
    pub characters: Option<String>,
}

impl RawKeyEvent {
    pub fn new(modifiers: Modifiers, key_code: u16, characters: Option<&str>) -> Self {
        Self {
            modifiers,
            key_code,
            characters: characters.map(str::to_string),
        }
    }
}

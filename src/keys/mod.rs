// ABOUTME: Key event normalization: raw OS key events to canonical shortcut strings
// ABOUTME: Pure and platform-independent apart from the choice of scan-code table

pub mod event;
pub mod keymap;
pub mod normalizer;
pub mod shortcut;

pub use event::{EventSource, Modifiers, RawKeyEvent};
pub use keymap::Keymap;
pub use normalizer::Normalizer;
pub use shortcut::Shortcut;

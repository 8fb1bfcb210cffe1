// ABOUTME: XInput2 raw key-press listener on the X11 root window
// ABOUTME: Raw events carry no modifier state, so it is read from QueryPointer when a key goes down

use super::DisplayServer;
use crate::keys::{Modifiers, RawKeyEvent};
use crate::monitor::Subscription;
use crate::platform::{KeyHandler, KeySource};
use anyhow::{Context, Result, anyhow};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use x11rb::connection::Connection;
use x11rb::errors::ConnectionError;
use x11rb::protocol::Event;
use x11rb::protocol::xinput::{self, ConnectionExt as _};
use x11rb::protocol::xproto::{self, ConnectionExt as _};
use x11rb::rust_connection::RustConnection;

// Core protocol modifier mask bits
const SHIFT_MASK: u16 = 1 << 0;
const CONTROL_MASK: u16 = 1 << 2;
const MOD1_MASK: u16 = 1 << 3;
const MOD4_MASK: u16 = 1 << 6;

pub struct UnixKeySource;

impl UnixKeySource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UnixKeySource {
    fn default() -> Self {
        Self::new()
    }
}

/// Alt maps to Option and Super to Command.
pub(crate) fn modifiers_from_state(state: u16) -> Modifiers {
    let mut modifiers = Modifiers::empty();
    modifiers.set(Modifiers::COMMAND, state & MOD4_MASK != 0);
    modifiers.set(Modifiers::SHIFT, state & SHIFT_MASK != 0);
    modifiers.set(Modifiers::CONTROL, state & CONTROL_MASK != 0);
    modifiers.set(Modifiers::OPTION, state & MOD1_MASK != 0);
    modifiers
}

pub(crate) fn is_modifier_keysym(keysym: u32) -> bool {
    // Shift_L..Hyper_R, Mode_switch, ISO_Level3_Shift
    (0xffe1..=0xffee).contains(&keysym) || keysym == 0xff7e || keysym == 0xfe03
}

/// Printable Latin-1 keysyms equal their code point. Return, Tab and Escape report
/// the control characters macOS uses for them.
pub(crate) fn keysym_char(keysym: u32) -> Option<char> {
    match keysym {
        0x20..=0x7e | 0xa0..=0xff => char::from_u32(keysym),
        0xff0d | 0xff8d => Some('\r'),
        0xff09 => Some('\t'),
        0xff1b => Some('\u{1b}'),
        _ => None,
    }
}

/// Unshifted keysym for each keycode, fetched once per subscription.
struct KeyboardMap {
    min_keycode: u8,
    per_keycode: usize,
    keysyms: Vec<u32>,
}

impl KeyboardMap {
    fn fetch(conn: &RustConnection) -> Result<Self> {
        let setup = conn.setup();
        let count = setup.max_keycode - setup.min_keycode + 1;
        let reply = conn
            .get_keyboard_mapping(setup.min_keycode, count)?
            .reply()
            .context("Failed to read the X11 keyboard mapping")?;
        Ok(Self {
            min_keycode: setup.min_keycode,
            per_keycode: usize::from(reply.keysyms_per_keycode),
            keysyms: reply.keysyms,
        })
    }

    fn keysym(&self, keycode: u32) -> Option<u32> {
        let offset = keycode.checked_sub(u32::from(self.min_keycode))? as usize;
        self.keysyms
            .get(offset * self.per_keycode)
            .copied()
            .filter(|keysym| *keysym != 0)
    }
}

/// Client message the subscription sends to its own window to unblock the listener.
pub(crate) fn wake_event(wake_window: xproto::Window) -> xproto::ClientMessageEvent {
    xproto::ClientMessageEvent::new(32, wake_window, xproto::AtomEnum::NONE, [0u32; 5])
}

pub(crate) fn is_wake_event(event: &Event, wake_window: xproto::Window) -> bool {
    matches!(event, Event::ClientMessage(message) if message.window == wake_window)
}

fn wake(conn: &RustConnection, wake_window: xproto::Window) -> Result<(), ConnectionError> {
    conn.send_event(false, wake_window, xproto::EventMask::NO_EVENT, wake_event(wake_window))?;
    conn.flush()
}

fn listen(
    conn: Arc<RustConnection>,
    root: xproto::Window,
    wake_window: xproto::Window,
    keyboard: KeyboardMap,
    handler: KeyHandler,
    stopped: Arc<AtomicBool>,
) {
    tracing::debug!("X11 key listener started");

    loop {
        let event = match conn.wait_for_event() {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("X11 connection lost: {}", e);
                break;
            }
        };
        if stopped.load(Ordering::SeqCst) || is_wake_event(&event, wake_window) {
            break;
        }

        let Event::XinputRawKeyPress(press) = event else {
            continue;
        };

        let keysym = keyboard.keysym(press.detail);
        if keysym.is_some_and(is_modifier_keysym) {
            continue;
        }

        let state = match conn.query_pointer(root).map(|cookie| cookie.reply()) {
            Ok(Ok(reply)) => u16::from(reply.mask),
            Ok(Err(e)) => {
                tracing::debug!("QueryPointer failed: {}", e);
                0
            }
            Err(e) => {
                tracing::debug!("QueryPointer failed: {}", e);
                0
            }
        };

        let characters = keysym.and_then(keysym_char).map(|c| c.to_string());
        let Ok(key_code) = u16::try_from(press.detail) else {
            continue;
        };
        handler(RawKeyEvent {
            modifiers: modifiers_from_state(state),
            key_code,
            characters,
        });
    }

    tracing::debug!("X11 key listener finished");
}

impl KeySource for UnixKeySource {
    fn check_accessibility(&self, _prompt: bool) -> bool {
        true
    }

    fn subscribe_global(&mut self, handler: KeyHandler) -> Result<Subscription> {
        if DisplayServer::detect() == DisplayServer::Wayland {
            tracing::warn!("Wayland session: only keys typed into X11 (XWayland) clients are observed");
        }

        let (conn, screen_num) = x11rb::connect(None)
            .map_err(|e| anyhow!("Failed to connect to X11 display: {}. Ensure DISPLAY is set.", e))?;
        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .map(|screen| screen.root)
            .ok_or_else(|| anyhow!("X11 screen {} not found", screen_num))?;

        conn.xinput_xi_query_version(2, 0)?
            .reply()
            .context("XInput2 is not available on this display")?;
        let mask = xinput::EventMask {
            deviceid: xinput::Device::ALL_MASTER.into(),
            mask: vec![xinput::XIEventMask::RAW_KEY_PRESS.into()],
        };
        conn.xinput_xi_select_events(root, &[mask])?
            .check()
            .context("Failed to select XInput2 raw key events")?;

        // Unmapped input-only window that only ever receives our own wake-up message
        let wake_window = conn.generate_id()?;
        conn.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            wake_window,
            root,
            0,
            0,
            1,
            1,
            0,
            xproto::WindowClass::INPUT_ONLY,
            x11rb::COPY_FROM_PARENT,
            &xproto::CreateWindowAux::new(),
        )?
        .check()
        .context("Failed to create the X11 wake-up window")?;
        conn.flush()?;

        let keyboard = KeyboardMap::fetch(&conn)?;
        let conn = Arc::new(conn);
        let stopped = Arc::new(AtomicBool::new(false));
        let listener_conn = conn.clone();
        let listener_stopped = stopped.clone();
        let listener = thread::Builder::new()
            .name("hotswitch-x11-keys".to_string())
            .spawn(move || listen(listener_conn, root, wake_window, keyboard, handler, listener_stopped))?;

        Ok(Subscription::new("global", move || {
            stopped.store(true, Ordering::SeqCst);
            match wake(&conn, wake_window) {
                Ok(()) => {
                    if listener.join().is_err() {
                        tracing::error!("X11 key listener panicked");
                    }
                }
                Err(e) => tracing::warn!("Could not wake the X11 key listener, leaving it detached: {}", e),
            }
        }))
    }

    fn subscribe_local(&mut self, _handler: KeyHandler) -> Result<Subscription> {
        // Without a window of our own, every key press already reaches the global listener
        Ok(Subscription::inert("local"))
    }
}

// ABOUTME: NSEvent key-down monitors feeding raw key events to the shortcut handler
// ABOUTME: Global monitors observe other apps; local monitors observe our own and pass events on

use super::permissions;
use crate::keys::{Modifiers, RawKeyEvent};
use crate::monitor::Subscription;
use crate::platform::{KeyHandler, KeySource};
use anyhow::{Result, anyhow};
use block2::RcBlock;
use objc2::rc::Retained;
use objc2::runtime::AnyObject;
use objc2_app_kit::{NSEvent, NSEventMask, NSEventModifierFlags, NSEventType};
use std::ptr::NonNull;

pub struct MacKeySource;

impl MacKeySource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MacKeySource {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn modifiers_from_flags(flags: NSEventModifierFlags) -> Modifiers {
    let mut modifiers = Modifiers::empty();
    modifiers.set(Modifiers::COMMAND, flags.contains(NSEventModifierFlags::Command));
    modifiers.set(Modifiers::SHIFT, flags.contains(NSEventModifierFlags::Shift));
    modifiers.set(Modifiers::CONTROL, flags.contains(NSEventModifierFlags::Control));
    modifiers.set(Modifiers::OPTION, flags.contains(NSEventModifierFlags::Option));
    modifiers
}

fn raw_event(event: &NSEvent) -> Option<RawKeyEvent> {
    if event.r#type() != NSEventType::KeyDown {
        return None;
    }

    #[allow(unused_unsafe)]
    let characters = unsafe { event.charactersIgnoringModifiers() }.map(|s| s.to_string());
    Some(RawKeyEvent {
        modifiers: modifiers_from_flags(event.modifierFlags()),
        key_code: event.keyCode(),
        characters,
    })
}

fn subscription(label: &'static str, monitor: Retained<AnyObject>) -> Subscription {
    Subscription::new(label, move || unsafe {
        NSEvent::removeMonitor(&monitor);
    })
}

impl KeySource for MacKeySource {
    fn check_accessibility(&self, prompt: bool) -> bool {
        permissions::is_trusted(prompt)
    }

    fn subscribe_global(&mut self, handler: KeyHandler) -> Result<Subscription> {
        let block = RcBlock::new(move |event: NonNull<NSEvent>| {
            let event = unsafe { event.as_ref() };
            if let Some(raw) = raw_event(event) {
                handler(raw);
            }
        });

        let monitor =
            unsafe { NSEvent::addGlobalMonitorForEventsMatchingMask_handler(NSEventMask::KeyDown, &block) };
        match monitor {
            Some(monitor) => Ok(subscription("global", monitor)),
            None => Err(anyhow!(
                "macOS refused the global key monitor; grant Accessibility access in System Settings"
            )),
        }
    }

    fn subscribe_local(&mut self, handler: KeyHandler) -> Result<Subscription> {
        let block = RcBlock::new(move |event: NonNull<NSEvent>| -> *mut NSEvent {
            if let Some(raw) = raw_event(unsafe { event.as_ref() }) {
                handler(raw);
            }
            // Returning the event lets it continue to the focused responder
            event.as_ptr()
        });

        let monitor =
            unsafe { NSEvent::addLocalMonitorForEventsMatchingMask_handler(NSEventMask::KeyDown, &block) };
        monitor
            .map(|monitor| subscription("local", monitor))
            .ok_or_else(|| anyhow!("macOS refused the local key monitor"))
    }
}

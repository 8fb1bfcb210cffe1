// ABOUTME: Accessibility trust check for system-wide key monitoring
// ABOUTME: Optionally asks macOS to show the permission prompt

use objc2_core_foundation::{CFBoolean, CFDictionary, CFString};
use std::ffi::c_void;

#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    fn AXIsProcessTrusted() -> bool;
    fn AXIsProcessTrustedWithOptions(options: *const c_void) -> bool;
}

// Value of kAXTrustedCheckOptionPrompt
const TRUSTED_CHECK_OPTION_PROMPT: &str = "AXTrustedCheckOptionPrompt";

pub(crate) fn is_trusted(prompt: bool) -> bool {
    if !prompt {
        return unsafe { AXIsProcessTrusted() };
    }

    let key = CFString::from_static_str(TRUSTED_CHECK_OPTION_PROMPT);
    let value = CFBoolean::new(true);
    let options = CFDictionary::<CFString, CFBoolean>::from_slices(&[&*key], &[value]);

    let trusted = unsafe { AXIsProcessTrustedWithOptions(&*options as *const _ as *const c_void) };
    if !trusted {
        tracing::info!(
            "Enable Hotswitch in System Settings > Privacy & Security > Accessibility, then restart it"
        );
    }
    trusted
}

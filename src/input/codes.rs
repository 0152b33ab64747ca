//! evdev event codes
//!
//! Consolidates the codes padmap reads from the controller and writes to
//! the virtual device. Event types come from [`evdev::EventType`]; these
//! are Linux input event codes from <linux/input-event-codes.h>.

use evdev::EventType;

// ============================================================================
// Axis and Synchronization Codes
// ============================================================================

/// End of a batch of changes
pub const SYN_REPORT: u16 = 0;

/// Relative X axis
pub const REL_X: u16 = 0x00;

/// Relative Y axis
pub const REL_Y: u16 = 0x01;

// ============================================================================
// Controller Buttons
// ============================================================================

/// Primary action button ("A")
pub const BTN_THUMB: u16 = 0x121;

/// Secondary modifier button ("B")
pub const BTN_THUMB2: u16 = 0x122;

/// Select button
pub const BTN_BASE3: u16 = 0x128;

/// Start button
pub const BTN_BASE4: u16 = 0x129;

/// Directional pad, reported by the controller as plain buttons
pub const DPAD_UP: u16 = 0x12c;
pub const DPAD_RIGHT: u16 = 0x12d;
pub const DPAD_DOWN: u16 = 0x12e;
pub const DPAD_LEFT: u16 = 0x12f;

// ============================================================================
// Mouse Buttons
// ============================================================================

/// Left mouse button
pub const BTN_LEFT: u16 = 0x110;

// ============================================================================
// Modifier Keys
// ============================================================================

pub const KEY_LEFTCTRL: u16 = 29;
pub const KEY_LEFTSHIFT: u16 = 42;
pub const KEY_LEFTALT: u16 = 56;
pub const KEY_RIGHTALT: u16 = 100;
pub const KEY_LEFTMETA: u16 = 125;

/// Right meta, used as the "super" modifier
pub const KEY_RIGHTMETA: u16 = 126;

// ============================================================================
// Navigation Keys
// ============================================================================

pub const KEY_UP: u16 = 103;
pub const KEY_LEFT: u16 = 105;
pub const KEY_RIGHT: u16 = 106;
pub const KEY_DOWN: u16 = 108;

pub const KEY_ESC: u16 = 1;
pub const KEY_TAB: u16 = 15;
pub const KEY_ENTER: u16 = 28;
pub const KEY_SPACE: u16 = 57;

// ============================================================================
// Character Keys
// ============================================================================

pub const KEY_1: u16 = 2;
pub const KEY_2: u16 = 3;
pub const KEY_4: u16 = 5;
pub const KEY_EQUAL: u16 = 13;
pub const KEY_Q: u16 = 16;
pub const KEY_W: u16 = 17;
pub const KEY_R: u16 = 19;
pub const KEY_T: u16 = 20;
pub const KEY_I: u16 = 23;
pub const KEY_LEFTBRACE: u16 = 26;
pub const KEY_A: u16 = 30;
pub const KEY_S: u16 = 31;
pub const KEY_F: u16 = 33;
pub const KEY_G: u16 = 34;
pub const KEY_H: u16 = 35;
pub const KEY_K: u16 = 37;
pub const KEY_L: u16 = 38;
pub const KEY_Z: u16 = 44;
pub const KEY_C: u16 = 46;
pub const KEY_V: u16 = 47;
pub const KEY_B: u16 = 48;
pub const KEY_M: u16 = 50;
pub const KEY_SLASH: u16 = 53;
pub const KEY_KPASTERISK: u16 = 55;

/// Key between left shift and Z on ISO keyboards
pub const KEY_102ND: u16 = 86;

pub const KEY_KPLEFTPAREN: u16 = 179;
pub const KEY_DOLLAR: u16 = 0x1b2;

// ============================================================================
// Function Keys
// ============================================================================

pub const KEY_F1: u16 = 59;
pub const KEY_F2: u16 = 60;
pub const KEY_F3: u16 = 61;
pub const KEY_F4: u16 = 62;
pub const KEY_F5: u16 = 63;
pub const KEY_F6: u16 = 64;
pub const KEY_F7: u16 = 65;
pub const KEY_F8: u16 = 66;
pub const KEY_F9: u16 = 67;
pub const KEY_F10: u16 = 68;
pub const KEY_F11: u16 = 87;
pub const KEY_F12: u16 = 88;

// ============================================================================
// Helper Functions
// ============================================================================

/// Arrow key corresponding to a directional pad button
#[inline]
pub const fn arrow_for(code: u16) -> Option<u16> {
    match code {
        DPAD_UP => Some(KEY_UP),
        DPAD_DOWN => Some(KEY_DOWN),
        DPAD_LEFT => Some(KEY_LEFT),
        DPAD_RIGHT => Some(KEY_RIGHT),
        _ => None,
    }
}

/// Symbolic name of an event code, for logging
///
/// Codes are only unambiguous together with their type, so the type is
/// required to pick the right namespace.
pub fn code_name(kind: EventType, code: u16) -> String {
    let name = if kind == EventType::SYNCHRONIZATION {
        match code {
            SYN_REPORT => Some("SYN_REPORT"),
            _ => None,
        }
    } else if kind == EventType::RELATIVE {
        match code {
            REL_X => Some("REL_X"),
            REL_Y => Some("REL_Y"),
            _ => None,
        }
    } else if kind == EventType::KEY {
        key_name(code)
    } else {
        None
    };
    name.map(str::to_string)
        .unwrap_or_else(|| format!("{:#x}", code))
}

fn key_name(code: u16) -> Option<&'static str> {
    let name = match code {
        BTN_THUMB => "BTN_THUMB",
        BTN_THUMB2 => "BTN_THUMB2",
        BTN_BASE3 => "BTN_BASE3",
        BTN_BASE4 => "BTN_BASE4",
        DPAD_UP => "DPAD_UP",
        DPAD_RIGHT => "DPAD_RIGHT",
        DPAD_DOWN => "DPAD_DOWN",
        DPAD_LEFT => "DPAD_LEFT",
        BTN_LEFT => "BTN_LEFT",
        KEY_LEFTSHIFT => "KEY_LEFTSHIFT",
        KEY_LEFTCTRL => "KEY_LEFTCTRL",
        KEY_LEFTALT => "KEY_LEFTALT",
        KEY_LEFTMETA => "KEY_LEFTMETA",
        KEY_RIGHTMETA => "KEY_RIGHTMETA",
        KEY_UP => "KEY_UP",
        KEY_DOWN => "KEY_DOWN",
        KEY_LEFT => "KEY_LEFT",
        KEY_RIGHT => "KEY_RIGHT",
        KEY_TAB => "KEY_TAB",
        KEY_ENTER => "KEY_ENTER",
        KEY_SPACE => "KEY_SPACE",
        KEY_ESC => "KEY_ESC",
        _ => return None,
    };
    Some(name)
}

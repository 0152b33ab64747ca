//! Select-held overlay
//!
//! While select is held, window-manager navigation replaces every
//! per-application mapping. Only press edges produce output.

use crate::dispatch::Action;
use crate::input::codes::*;
use crate::input::RawEvent;
use crate::output::{Chord, Modifiers};

use super::keys::KeyState;

/// Actions for `ev` if the overlay owns it
///
/// `keys` must already reflect `ev`. None hands the event to the
/// dispatch table.
pub fn intercept(ev: &RawEvent, keys: &KeyState) -> Option<Vec<Action>> {
    if ev.code == BTN_BASE3 {
        // Entering flashes the focused window; leaving is silent
        return Some(if ev.value == 1 {
            vec![Action::Outline]
        } else {
            Vec::new()
        });
    }
    if !keys.select {
        return None;
    }
    if ev.value != 1 {
        return Some(Vec::new());
    }

    let alt = |code| Action::Tap(Chord::new(code, Modifiers::ALT));
    let actions = match ev.code {
        DPAD_UP => vec![alt(KEY_TAB), Action::Outline],
        DPAD_DOWN => vec![alt(KEY_ENTER)],
        DPAD_LEFT => vec![alt(KEY_H), Action::Outline],
        DPAD_RIGHT => vec![alt(KEY_L), Action::Outline],
        BTN_BASE4 => vec![Action::Menu],
        BTN_THUMB => vec![alt(KEY_SPACE)],
        BTN_THUMB2 => vec![Action::Tap(Chord::new(KEY_C, Modifiers::SHIFT | Modifiers::ALT))],
        _ => Vec::new(),
    };
    Some(actions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(keys: &mut KeyState, code: u16, value: i32) -> Option<Vec<Action>> {
        let ev = RawEvent::key(code, value);
        keys.update(&ev);
        intercept(&ev, keys)
    }

    #[test]
    fn test_select_press_flashes_outline() {
        let mut keys = KeyState::default();
        assert_eq!(apply(&mut keys, BTN_BASE3, 1), Some(vec![Action::Outline]));
        assert_eq!(apply(&mut keys, BTN_BASE3, 0), Some(vec![]));
    }

    #[test]
    fn test_off_passes_through() {
        let mut keys = KeyState::default();
        assert_eq!(apply(&mut keys, DPAD_UP, 1), None);
        assert_eq!(apply(&mut keys, BTN_BASE4, 1), None);
    }

    #[test]
    fn test_navigation_while_held() {
        let mut keys = KeyState::default();
        apply(&mut keys, BTN_BASE3, 1);
        assert_eq!(
            apply(&mut keys, DPAD_UP, 1),
            Some(vec![Action::Tap(Chord::new(KEY_TAB, Modifiers::ALT)), Action::Outline])
        );
        // Release edges are swallowed, not dispatched
        assert_eq!(apply(&mut keys, DPAD_UP, 0), Some(vec![]));
        assert_eq!(apply(&mut keys, BTN_BASE4, 1), Some(vec![Action::Menu]));
        assert_eq!(
            apply(&mut keys, BTN_THUMB2, 1),
            Some(vec![Action::Tap(Chord::new(KEY_C, Modifiers::SHIFT | Modifiers::ALT))])
        );
    }
}

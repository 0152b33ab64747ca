//! Held/released state of the controller buttons

use log::debug;

use crate::input::codes::*;
use crate::input::RawEvent;

/// Button flags, set on press edges and cleared on release edges
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KeyState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub select: bool,
    pub start: bool,
    pub a: bool,
    /// Secondary modifier
    pub b: bool,
}

impl KeyState {
    /// Apply a press/release edge; other codes and autorepeat are ignored
    ///
    /// Returns true if `ev` targeted a tracked button.
    pub fn update(&mut self, ev: &RawEvent) -> bool {
        if !ev.is_key() || !ev.is_edge() {
            return false;
        }
        let (flag, name) = match ev.code {
            DPAD_UP => (&mut self.up, "UP"),
            DPAD_DOWN => (&mut self.down, "DOWN"),
            DPAD_LEFT => (&mut self.left, "LEFT"),
            DPAD_RIGHT => (&mut self.right, "RIGHT"),
            BTN_BASE3 => (&mut self.select, "SELECT"),
            BTN_BASE4 => (&mut self.start, "START"),
            BTN_THUMB => (&mut self.a, "A"),
            BTN_THUMB2 => (&mut self.b, "B"),
            _ => return false,
        };
        *flag = ev.value == 1;
        debug!("keys {}: {}", name, ev.value);
        true
    }

    pub fn any_direction(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

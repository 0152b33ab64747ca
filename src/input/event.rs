//! Input event values
//!
//! The engine works on plain (type, code, value) triples. Timestamps are
//! dropped on the way in and left to the kernel on the way out, so the
//! conversion to and from [`evdev::InputEvent`] only touches those three
//! fields.

use evdev::{EventType, InputEvent};
use std::fmt;

use super::codes;

/// One input event, immutable once read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub kind: EventType,
    pub code: u16,
    pub value: i32,
}

impl RawEvent {
    pub const fn new(kind: EventType, code: u16, value: i32) -> Self {
        Self { kind, code, value }
    }

    /// Key/button state change
    pub const fn key(code: u16, value: i32) -> Self {
        Self::new(EventType::KEY, code, value)
    }

    /// Frame terminator
    pub const fn syn() -> Self {
        Self::new(EventType::SYNCHRONIZATION, codes::SYN_REPORT, 0)
    }

    /// Relative axis motion
    pub const fn rel(code: u16, value: i32) -> Self {
        Self::new(EventType::RELATIVE, code, value)
    }

    pub fn is_key(&self) -> bool {
        self.kind == EventType::KEY
    }

    /// Press or release edge (autorepeat value 2 is not an edge)
    pub fn is_edge(&self) -> bool {
        self.value == 0 || self.value == 1
    }
}

impl From<InputEvent> for RawEvent {
    fn from(ev: InputEvent) -> Self {
        Self::new(ev.event_type(), ev.code(), ev.value())
    }
}

impl From<RawEvent> for InputEvent {
    fn from(ev: RawEvent) -> Self {
        InputEvent::new(ev.kind, ev.code, ev.value)
    }
}

impl fmt::Display for RawEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type={:?} code={} value={}",
            self.kind,
            codes::code_name(self.kind, self.code),
            self.value
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_event_fields_carried_over() {
        let kernel = InputEvent::new(EventType::KEY, codes::DPAD_LEFT, 1);
        assert_eq!(RawEvent::from(kernel), RawEvent::key(codes::DPAD_LEFT, 1));
    }

    #[test]
    fn test_negative_motion_reaches_output_event() {
        let out = InputEvent::from(RawEvent::rel(codes::REL_Y, -7));
        assert_eq!(out.event_type(), EventType::RELATIVE);
        assert_eq!(out.code(), codes::REL_Y);
        assert_eq!(out.value(), -7);
    }

    #[test]
    fn test_unknown_type_is_not_a_key() {
        let ev = RawEvent::new(EventType(0x11), 0, 1);
        assert!(!ev.is_key());
        assert!(RawEvent::key(codes::BTN_THUMB, 1).is_key());
    }

    #[test]
    fn test_autorepeat_is_not_an_edge() {
        assert!(RawEvent::key(codes::BTN_THUMB, 0).is_edge());
        assert!(RawEvent::key(codes::BTN_THUMB, 1).is_edge());
        assert!(!RawEvent::key(codes::BTN_THUMB, 2).is_edge());
    }

    #[test]
    fn test_display_uses_symbolic_names() {
        let text = RawEvent::key(codes::BTN_THUMB, 1).to_string();
        assert!(text.contains("code=BTN_THUMB"), "{}", text);
        assert!(text.ends_with("value=1"), "{}", text);
    }
}

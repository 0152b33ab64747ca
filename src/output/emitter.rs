//! Synthetic key and motion emission
//!
//! Frames key chords and pointer motion for the uinput device.
//! Modifier press order is fixed (shift, meta, alt, super, ctrl) and
//! releases mirror it exactly in reverse.

use anyhow::Result;
use bitflags::bitflags;
use log::debug;
use std::time::Duration;

use crate::input::codes::{
    KEY_LEFTALT, KEY_LEFTCTRL, KEY_LEFTMETA, KEY_LEFTSHIFT, KEY_RIGHTMETA, REL_X, REL_Y,
};
use crate::input::RawEvent;

bitflags! {
    /// Modifier set for one emitted chord
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CTRL = 1 << 1;
        const ALT = 1 << 2;
        const META = 1 << 3;
        const SUPER = 1 << 4;
    }
}

/// A key together with the modifiers held around it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chord {
    pub code: u16,
    pub mods: Modifiers,
}

impl Chord {
    pub const fn new(code: u16, mods: Modifiers) -> Self {
        Self { code, mods }
    }

    /// Bare key, no modifiers
    pub const fn key(code: u16) -> Self {
        Self::new(code, Modifiers::empty())
    }
}

/// Modifier press order and the key each modifier is sent as
const PRESS_ORDER: [(Modifiers, u16); 5] = [
    (Modifiers::SHIFT, KEY_LEFTSHIFT),
    (Modifiers::META, KEY_LEFTMETA),
    (Modifiers::ALT, KEY_LEFTALT),
    (Modifiers::SUPER, KEY_RIGHTMETA),
    (Modifiers::CTRL, KEY_LEFTCTRL),
];

/// Destination for emitted frames
///
/// A frame is written as a whole and closed with one SYN_REPORT by the
/// sink.
pub trait EventSink {
    fn emit_frame(&mut self, events: &[RawEvent]) -> Result<()>;
}

/// Key/motion framer on top of an [`EventSink`]
pub struct Emitter<S> {
    sink: S,
    /// Pause after pressing meta (window managers key off its timing)
    meta_delay: Duration,
}

impl<S: EventSink> Emitter<S> {
    pub fn new(sink: S, meta_delay: Duration) -> Self {
        Self { sink, meta_delay }
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    #[cfg(test)]
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    fn frame(&mut self, events: &[RawEvent]) -> Result<()> {
        self.sink.emit_frame(events)?;
        for ev in events {
            debug!("sent event: {}", ev);
        }
        Ok(())
    }

    /// Emit one edge of `code` with `mods` held around it
    pub fn emit_key(&mut self, code: u16, pressed: bool, mods: Modifiers) -> Result<()> {
        if pressed {
            if !mods.is_empty() {
                let group: Vec<RawEvent> = PRESS_ORDER
                    .iter()
                    .filter(|(flag, _)| mods.contains(*flag))
                    .map(|&(_, key)| RawEvent::key(key, 1))
                    .collect();
                self.frame(&group)?;
                if mods.contains(Modifiers::META) && !self.meta_delay.is_zero() {
                    std::thread::sleep(self.meta_delay);
                }
            }
            self.frame(&[RawEvent::key(code, 1)])
        } else {
            self.frame(&[RawEvent::key(code, 0)])?;
            for (flag, key) in PRESS_ORDER.iter().rev() {
                if mods.contains(*flag) {
                    self.frame(&[RawEvent::key(*key, 0)])?;
                }
            }
            Ok(())
        }
    }

    /// Press immediately followed by release
    pub fn tap(&mut self, code: u16, mods: Modifiers) -> Result<()> {
        self.emit_key(code, true, mods)?;
        self.emit_key(code, false, mods)
    }

    pub fn tap_chord(&mut self, chord: Chord) -> Result<()> {
        self.tap(chord.code, chord.mods)
    }

    /// Relative pointer motion; nothing is written for (0, 0)
    pub fn emit_motion(&mut self, dx: i32, dy: i32) -> Result<()> {
        let motion: Vec<RawEvent> = [(REL_X, dx), (REL_Y, dy)]
            .into_iter()
            .filter(|&(_, delta)| delta != 0)
            .map(|(axis, delta)| RawEvent::rel(axis, delta))
            .collect();
        if motion.is_empty() {
            return Ok(());
        }
        self.frame(&motion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::codes::{KEY_C, KEY_LEFT, KEY_TAB};
    use crate::testing::RecordingSink;

    fn emitter() -> Emitter<RecordingSink> {
        Emitter::new(RecordingSink::default(), Duration::ZERO)
    }

    fn key(code: u16, value: i32) -> RawEvent {
        RawEvent::key(code, value)
    }

    #[test]
    fn test_plain_press_is_key_and_terminator() {
        let mut e = emitter();
        e.emit_key(KEY_LEFT, true, Modifiers::empty()).unwrap();
        assert_eq!(e.sink().events, vec![key(KEY_LEFT, 1), RawEvent::syn()]);
    }

    #[test]
    fn test_alt_tab_tap_framing() {
        let mut e = emitter();
        e.tap(KEY_TAB, Modifiers::ALT).unwrap();
        assert_eq!(
            e.sink().events,
            vec![
                key(KEY_LEFTALT, 1),
                RawEvent::syn(),
                key(KEY_TAB, 1),
                RawEvent::syn(),
                key(KEY_TAB, 0),
                RawEvent::syn(),
                key(KEY_LEFTALT, 0),
                RawEvent::syn(),
            ]
        );
    }

    #[test]
    fn test_release_mirrors_press_order() {
        let mods = Modifiers::all();
        let mut e = emitter();
        e.emit_key(KEY_C, true, mods).unwrap();
        let pressed: Vec<u16> = e
            .sink()
            .events
            .iter()
            .filter(|ev| ev.is_key() && ev.code != KEY_C)
            .map(|ev| ev.code)
            .collect();
        assert_eq!(
            pressed,
            vec![KEY_LEFTSHIFT, KEY_LEFTMETA, KEY_LEFTALT, KEY_RIGHTMETA, KEY_LEFTCTRL]
        );

        e.sink_mut().events.clear();
        e.emit_key(KEY_C, false, mods).unwrap();
        let events = &e.sink().events;
        assert_eq!(events[0], key(KEY_C, 0));
        assert_eq!(events[1], RawEvent::syn());

        // Every released modifier is followed by its own terminator
        let released: Vec<u16> = events[2..]
            .chunks(2)
            .map(|pair| {
                assert_eq!(pair[1], RawEvent::syn());
                assert_eq!(pair[0].value, 0);
                pair[0].code
            })
            .collect();
        let mut reversed = pressed.clone();
        reversed.reverse();
        assert_eq!(released, reversed);
    }

    #[test]
    fn test_shift_alt_press_is_one_group() {
        let mut e = emitter();
        e.emit_key(KEY_C, true, Modifiers::SHIFT | Modifiers::ALT).unwrap();
        assert_eq!(
            e.sink().events,
            vec![
                key(KEY_LEFTSHIFT, 1),
                key(KEY_LEFTALT, 1),
                RawEvent::syn(),
                key(KEY_C, 1),
                RawEvent::syn(),
            ]
        );
    }

    #[test]
    fn test_motion_frames_only_nonzero_axes() {
        let mut e = emitter();
        e.emit_motion(0, 0).unwrap();
        assert!(e.sink().events.is_empty());

        e.emit_motion(0, -3).unwrap();
        assert_eq!(e.sink().events, vec![RawEvent::rel(REL_Y, -3), RawEvent::syn()]);

        e.sink_mut().events.clear();
        e.emit_motion(4, 4).unwrap();
        assert_eq!(
            e.sink().events,
            vec![RawEvent::rel(REL_X, 4), RawEvent::rel(REL_Y, 4), RawEvent::syn()]
        );
    }

    #[test]
    fn test_sink_failure_propagates() {
        let mut e = Emitter::new(RecordingSink::failing_after(1), Duration::ZERO);
        assert!(e.tap(KEY_TAB, Modifiers::empty()).is_err());
        // The press frame went out, the release frame did not
        assert_eq!(e.sink().events, vec![key(KEY_TAB, 1), RawEvent::syn()]);
    }
}

//! Synthetic output
//!
//! - `emitter`: key chord and pointer motion framing
//! - `uinput`: the virtual device the frames are written to

pub mod emitter;
pub mod uinput;

pub use emitter::{Chord, Emitter, EventSink, Modifiers};
pub use uinput::VirtualDevice;

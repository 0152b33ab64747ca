//! Input handling
//!
//! Read raw button events from the physical controller.
//! - evdev events from /dev/input/eventN (non-blocking)
//! - Readiness wait with poll(2), long when idle, short while the
//!   pointer is being emulated

pub mod codes;
pub mod device;
pub mod event;

pub use device::{Controller, Readiness};
pub use event::RawEvent;

//! uinput virtual device
//!
//! Creates the virtual keyboard/pointer that synthetic events are written
//! to. Capability bits are registered once at setup; the engine only ever
//! emits codes listed in [`KEY_CAPABILITIES`].

use anyhow::{Context, Result};
use evdev::uinput::{VirtualDevice as UinputDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, InputEvent, Key, RelativeAxisType};
use log::{info, warn};

use super::emitter::EventSink;
use crate::input::codes::*;
use crate::input::RawEvent;

/// Every key/button code the virtual device may emit
pub const KEY_CAPABILITIES: &[u16] = &[
    BTN_LEFT,
    // Function keys
    KEY_F1, KEY_F2, KEY_F3, KEY_F4, KEY_F5, KEY_F6,
    KEY_F7, KEY_F8, KEY_F9, KEY_F10, KEY_F11, KEY_F12,
    // Digits and letters
    KEY_1, KEY_2, KEY_4,
    KEY_A, KEY_B, KEY_C, KEY_F, KEY_G, KEY_H, KEY_I, KEY_K, KEY_L,
    KEY_M, KEY_Q, KEY_R, KEY_S, KEY_T, KEY_V, KEY_W, KEY_Z,
    // Symbols (workspace bindings on a programmer layout)
    KEY_SLASH, KEY_KPASTERISK, KEY_KPLEFTPAREN, KEY_DOLLAR,
    KEY_LEFTBRACE, KEY_EQUAL, KEY_102ND,
    // Navigation
    KEY_UP, KEY_DOWN, KEY_LEFT, KEY_RIGHT,
    KEY_ESC, KEY_ENTER, KEY_SPACE, KEY_TAB,
    // Modifiers
    KEY_LEFTALT, KEY_RIGHTALT, KEY_LEFTSHIFT, KEY_LEFTCTRL,
    KEY_LEFTMETA, KEY_RIGHTMETA,
];

/// Relative axes the virtual device may emit
pub const REL_CAPABILITIES: &[u16] = &[REL_X, REL_Y];

/// Check if the virtual device declares `code`
#[cfg(test)]
pub fn can_emit_key(code: u16) -> bool {
    KEY_CAPABILITIES.contains(&code)
}

/// Longest name uinput accepts, without the trailing NUL
const MAX_NAME_LEN: usize = 79;

fn key_set() -> AttributeSet<Key> {
    let mut keys = AttributeSet::<Key>::new();
    for &code in KEY_CAPABILITIES {
        keys.insert(Key::new(code));
    }
    keys
}

fn axis_set() -> AttributeSet<RelativeAxisType> {
    let mut axes = AttributeSet::<RelativeAxisType>::new();
    for &code in REL_CAPABILITIES {
        axes.insert(RelativeAxisType(code));
    }
    axes
}

fn device_name(name: &str) -> &[u8] {
    let bytes = name.as_bytes();
    if bytes.len() > MAX_NAME_LEN {
        warn!("uinput device name truncated to {} bytes", MAX_NAME_LEN);
        return &bytes[..MAX_NAME_LEN];
    }
    bytes
}

/// Virtual output device
///
/// The kernel removes the device when the handle is closed.
pub struct VirtualDevice {
    device: UinputDevice,
}

impl VirtualDevice {
    /// Register capabilities and create the device on /dev/uinput
    pub fn create(name: &str) -> Result<Self> {
        let mut device = VirtualDeviceBuilder::new()
            .context("Cannot open /dev/uinput")?
            .name(device_name(name))
            .with_keys(&key_set())
            .context("Failed to set key capabilities")?
            .with_relative_axes(&axis_set())
            .context("Failed to set relative axes")?
            .build()
            .context("Failed to create virtual device")?;

        info!(
            "Virtual device created: {} ({} keys, {} axes)",
            name,
            KEY_CAPABILITIES.len(),
            REL_CAPABILITIES.len()
        );
        if let Ok(mut nodes) = device.enumerate_dev_nodes_blocking() {
            if let Some(Ok(path)) = nodes.next() {
                info!("Virtual device node: {}", path.display());
            }
        }
        Ok(Self { device })
    }
}

impl EventSink for VirtualDevice {
    fn emit_frame(&mut self, events: &[RawEvent]) -> Result<()> {
        let frame: Vec<InputEvent> = events.iter().copied().map(InputEvent::from).collect();
        self.device
            .emit(&frame)
            .context("uinput write error")
    }
}

impl Drop for VirtualDevice {
    fn drop(&mut self) {
        info!("Virtual device destroyed");
    }
}

//! Pointer emulation from held directional buttons
//!
//! While active, every tick moves the pointer by the current step along
//! the held directions and grows the step (linear acceleration). A tick
//! with no direction held goes idle and resets the step.

use log::debug;
use std::time::Duration;

use super::keys::KeyState;
use crate::config::MouseConfig;

pub struct MouseEmulation {
    active: bool,
    step: i32,
    base_step: i32,
    step_increment: i32,
    tick: Duration,
    idle_timeout: Duration,
}

impl MouseEmulation {
    pub fn new(config: &MouseConfig) -> Self {
        Self {
            active: false,
            step: config.base_step,
            base_step: config.base_step,
            step_increment: config.step_increment,
            tick: config.tick(),
            idle_timeout: config.idle_timeout(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    #[cfg(test)]
    pub fn step(&self) -> i32 {
        self.step
    }

    pub fn engage(&mut self) {
        if !self.active {
            debug!("mouse emulation on");
        }
        self.active = true;
    }

    /// Stop ticking; the step is kept until a tick finds no direction
    pub fn release(&mut self) {
        if self.active {
            debug!("mouse emulation off");
        }
        self.active = false;
    }

    /// Displacement for the held directions at the current step
    pub fn motion(&self, keys: &KeyState) -> (i32, i32) {
        let axis = |neg: bool, pos: bool| {
            (if neg { -self.step } else { 0 }) + (if pos { self.step } else { 0 })
        };
        (axis(keys.left, keys.right), axis(keys.up, keys.down))
    }

    /// Advance one tick; returns the motion to emit, if any
    pub fn tick(&mut self, keys: &KeyState) -> Option<(i32, i32)> {
        if !self.active {
            return None;
        }
        if !keys.any_direction() {
            self.active = false;
            self.step = self.base_step;
            debug!("mouse emulation idle, step reset to {}", self.step);
            return None;
        }
        let motion = self.motion(keys);
        self.step = self.step.saturating_add(self.step_increment);
        Some(motion)
    }

    /// Readiness wait timeout: the tick while active, long otherwise
    pub fn poll_timeout(&self) -> Duration {
        if self.active {
            self.tick
        } else {
            self.idle_timeout
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mouse() -> MouseEmulation {
        MouseEmulation::new(&MouseConfig::default())
    }

    fn holding(f: impl FnOnce(&mut KeyState)) -> KeyState {
        let mut keys = KeyState::default();
        f(&mut keys);
        keys
    }

    #[test]
    fn test_idle_tick_does_nothing() {
        let mut m = mouse();
        let keys = holding(|k| k.up = true);
        assert_eq!(m.tick(&keys), None);
        assert_eq!(m.poll_timeout(), Duration::from_millis(10_000));
    }

    #[test]
    fn test_step_grows_while_held() {
        let mut m = mouse();
        let keys = holding(|k| k.up = true);
        m.engage();
        assert_eq!(m.poll_timeout(), Duration::from_millis(10));

        let ys: Vec<i32> = (0..3).map(|_| m.tick(&keys).unwrap().1).collect();
        assert_eq!(ys, vec![-2, -3, -4]);
    }

    #[test]
    fn test_tick_without_direction_resets() {
        let mut m = mouse();
        m.engage();
        m.tick(&holding(|k| k.right = true));
        m.tick(&holding(|k| k.right = true));
        assert_eq!(m.step(), 4);

        assert_eq!(m.tick(&KeyState::default()), None);
        assert!(!m.is_active());
        assert_eq!(m.step(), 2);
    }

    #[test]
    fn test_release_keeps_step() {
        let mut m = mouse();
        m.engage();
        m.tick(&holding(|k| k.left = true));
        m.release();
        assert!(!m.is_active());
        assert_eq!(m.step(), 3);
    }

    #[test]
    fn test_opposite_directions_cancel() {
        let m = mouse();
        let keys = holding(|k| {
            k.left = true;
            k.right = true;
            k.down = true;
        });
        assert_eq!(m.motion(&keys), (0, 2));
    }
}

//! Remapping engine
//!
//! Owns all per-process state (key flags, pointer emulation) and the
//! three seams to the outside: the output sink, the window source and
//! the process host. The main loop feeds it events and timeouts.
//!
//! Per key event:
//! 1. update key state
//! 2. resolve the focused window
//! 3. select overlay if it owns the event, dispatch table otherwise
//! 4. perform the resulting actions

pub mod keys;
pub mod mouse;
pub mod overlay;

use anyhow::Result;
use log::{debug, error, trace, warn};
use std::time::Duration;

use crate::config::Config;
use crate::dispatch::{Action, DispatchTable};
use crate::input::RawEvent;
use crate::menu::{catalog, match_label, Layout, Menu, MenuAction, MenuItem};
use crate::output::{Emitter, EventSink};
use crate::process::{ForkSide, Processes};
use crate::window::WindowSource;

use self::keys::KeyState;
use self::mouse::MouseEmulation;

pub struct Engine<S: EventSink, W: WindowSource, P: Processes> {
    emitter: Emitter<S>,
    windows: W,
    processes: P,
    table: DispatchTable,
    keys: KeyState,
    mouse: MouseEmulation,
    /// Command flashing the focused window outline
    outline: String,
    /// Pid of the process running the main loop
    engine_pid: i32,
}

impl<S: EventSink, W: WindowSource, P: Processes> Engine<S, W, P> {
    pub fn new(sink: S, windows: W, processes: P, config: &Config) -> Self {
        Self {
            emitter: Emitter::new(sink, config.emitter.meta_delay()),
            windows,
            processes,
            table: DispatchTable::standard(),
            keys: KeyState::default(),
            mouse: MouseEmulation::new(&config.mouse),
            outline: config.helpers.outline.clone(),
            engine_pid: std::process::id() as i32,
        }
    }

    /// How long the main loop may wait for the next event
    pub fn poll_timeout(&self) -> Duration {
        self.mouse.poll_timeout()
    }

    pub fn handle_event(&mut self, ev: &RawEvent) -> Result<()> {
        if !ev.is_key() {
            trace!("ignoring event of type: {:?}", ev.kind);
            return Ok(());
        }

        self.keys.update(ev);

        // Focus can move between two events of one burst: never cache
        let ctx = self.windows.current_context()?;

        let actions = match overlay::intercept(ev, &self.keys) {
            Some(actions) => actions,
            None => self.table.dispatch(&ctx, ev, &self.keys),
        };
        for action in actions {
            self.perform(action)?;
        }
        Ok(())
    }

    /// Poll timeout elapsed without input
    pub fn on_timeout(&mut self) -> Result<()> {
        debug!(
            "poll timeout: mouse_mode={} timeout={}ms",
            self.mouse.is_active(),
            self.poll_timeout().as_millis()
        );
        if let Some((dx, dy)) = self.mouse.tick(&self.keys) {
            self.emitter.emit_motion(dx, dy)?;
        }
        Ok(())
    }

    fn perform(&mut self, action: Action) -> Result<()> {
        trace!("action: {:?}", action);
        match action {
            Action::Key { code, pressed, mods } => self.emitter.emit_key(code, pressed, mods),
            Action::Tap(chord) => self.emitter.tap_chord(chord),
            Action::EngagePointer => {
                self.mouse.engage();
                let (dx, dy) = self.mouse.motion(&self.keys);
                self.emitter.emit_motion(dx, dy)
            }
            Action::ReleasePointer => {
                self.mouse.release();
                Ok(())
            }
            Action::Outline => self.processes.spawn_detached(&self.outline),
            Action::Menu => self.launch_menu(),
        }
    }

    /// Run the top-level menu in a detached process
    fn launch_menu(&mut self) -> Result<()> {
        match self.processes.fork_detached()? {
            ForkSide::Parent => Ok(()),
            ForkSide::Detached => {
                let menu = catalog::main_menu(self.engine_pid);
                let result = self
                    .windows
                    .reconnect()
                    .and_then(|()| self.run_menu(&menu));
                let status = match result {
                    Ok(_) => 0,
                    Err(e) => {
                        error!("menu failed: {:#}", e);
                        1
                    }
                };
                self.processes.finish_detached(status);
                Ok(())
            }
        }
    }

    /// Show `menu`, then perform the picked item's action
    ///
    /// Returns the index of the picked item; None if nothing matched.
    pub fn run_menu(&mut self, menu: &Menu) -> Result<Option<usize>> {
        let Some(answer) = self.prompt(&menu.labels(), menu.layout)? else {
            return Ok(None);
        };
        let Some(index) = menu.find(&answer) else {
            debug!("no menu item matches {:?}", answer);
            return Ok(None);
        };
        self.invoke(&menu.items[index])?;
        Ok(Some(index))
    }

    fn prompt(&mut self, labels: &[&str], layout: Layout) -> Result<Option<String>> {
        let window = self.windows.focused_window()?;
        let answer = self.processes.choose(labels, window, layout)?;
        if answer.is_none() {
            debug!("no selection");
        }
        Ok(answer)
    }

    fn invoke(&mut self, item: &MenuItem) -> Result<()> {
        debug!("menu item: {}", item.label);
        match &item.action {
            MenuAction::Chord(chord) => self.emitter.tap_chord(*chord),
            MenuAction::Shell(command) => self.processes.run_shell(command),
            MenuAction::Submenu(menu) => self.run_menu(menu).map(|_| ()),
            MenuAction::PickLabel { choices, resolve } => {
                let Some(answer) = self.prompt(choices, Layout::Horizontal)? else {
                    return Ok(());
                };
                let Some(index) = match_label(choices.iter().copied(), &answer) else {
                    debug!("no choice matches {:?}", answer);
                    return Ok(());
                };
                match resolve(choices[index]) {
                    Some(chord) => self.emitter.tap_chord(chord),
                    None => {
                        warn!("unmapped label: {}", choices[index]);
                        Ok(())
                    }
                }
            }
        }
    }
}

#[cfg(test)]
impl<S: EventSink, W: WindowSource, P: Processes> Engine<S, W, P> {
    pub fn keys(&self) -> &KeyState {
        &self.keys
    }

    pub fn mouse(&self) -> &MouseEmulation {
        &self.mouse
    }

    pub fn engine_pid(&self) -> i32 {
        self.engine_pid
    }

    pub fn sink(&self) -> &S {
        self.emitter.sink()
    }

    pub fn sink_mut(&mut self) -> &mut S {
        self.emitter.sink_mut()
    }

    pub fn windows_mut(&mut self) -> &mut W {
        &mut self.windows
    }

    pub fn processes(&self) -> &P {
        &self.processes
    }

    pub fn processes_mut(&mut self) -> &mut P {
        &mut self.processes
    }
}

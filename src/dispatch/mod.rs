//! Context dispatch table
//!
//! Maps (focused window class list, event, key state) to output actions.
//! Bindings are tried in order and the first whose class set matches wins.
//! Global bindings run before the table regardless of focus.
//!
//! Dispatch is pure: the same inputs always produce the same actions.
//! Side effects happen when the engine performs them.

mod apps;

use log::trace;

use crate::engine::keys::KeyState;
use crate::input::codes::*;
use crate::input::RawEvent;
use crate::output::{Chord, Modifiers};
use crate::window::WindowContext;

/// One thing the engine should do in response to an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Single key edge with modifiers
    Key {
        code: u16,
        pressed: bool,
        mods: Modifiers,
    },
    /// Press and release
    Tap(Chord),
    /// Start or continue pointer emulation (moves once immediately)
    EngagePointer,
    /// Stop pointer emulation
    ReleasePointer,
    /// Flash the focused window outline
    Outline,
    /// Open the top-level menu in the background
    Menu,
}

impl Action {
    /// Forward an edge of `code` without modifiers
    pub fn edge(code: u16, ev: &RawEvent) -> Self {
        Self::Key {
            code,
            pressed: ev.value == 1,
            mods: Modifiers::empty(),
        }
    }

    #[cfg(test)]
    pub fn tap(code: u16) -> Self {
        Self::Tap(Chord::key(code))
    }
}

pub type Handler = fn(&RawEvent, &KeyState) -> Vec<Action>;

/// Class-matched handler
pub struct Binding {
    pub name: &'static str,
    /// Matches if any focused class entry equals any of these
    pub classes: &'static [&'static str],
    pub handler: Handler,
}

impl Binding {
    pub fn matches(&self, ctx: &WindowContext) -> bool {
        self.classes.iter().any(|want| ctx.has_class(want))
    }
}

pub struct DispatchTable {
    globals: Vec<Handler>,
    bindings: Vec<Binding>,
}

impl DispatchTable {
    pub fn new(globals: Vec<Handler>, bindings: Vec<Binding>) -> Self {
        Self { globals, bindings }
    }

    /// Built-in table
    pub fn standard() -> Self {
        Self::new(vec![menu_key as Handler], apps::bindings())
    }

    pub fn dispatch(&self, ctx: &WindowContext, ev: &RawEvent, keys: &KeyState) -> Vec<Action> {
        let mut actions: Vec<Action> = self
            .globals
            .iter()
            .flat_map(|global| global(ev, keys))
            .collect();

        match self.bindings.iter().find(|b| b.matches(ctx)) {
            Some(binding) => {
                trace!("dispatch via {}", binding.name);
                actions.extend((binding.handler)(ev, keys));
            }
            None => trace!("no binding for {:?}", ctx.class),
        }
        actions
    }
}

/// Start opens the window manager's own menu regardless of focus
fn menu_key(ev: &RawEvent, _keys: &KeyState) -> Vec<Action> {
    if ev.code == BTN_BASE4 && ev.value == 1 {
        vec![Action::Tap(Chord::new(KEY_K, Modifiers::ALT))]
    } else {
        Vec::new()
    }
}

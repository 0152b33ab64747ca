//! Per-application bindings
//!
//! Each handler is independent. Most branch on the secondary modifier
//! (B held) to pick between two mapping sets. Handlers that turn the
//! directional pad into keys release pointer emulation; the two pointer
//! contexts engage it instead.

use super::{Action, Binding};
use crate::engine::keys::KeyState;
use crate::input::codes::*;
use crate::input::RawEvent;
use crate::output::{Chord, Modifiers};

pub fn bindings() -> Vec<Binding> {
    vec![
        Binding { name: "image viewer", classes: &["feh"], handler: feh },
        Binding { name: "video player", classes: &["mpv"], handler: mpv },
        Binding { name: "stream browser", classes: &["streamlink-twitch-gui"], handler: streamlink },
        Binding { name: "web browser", classes: &["chromium"], handler: chromium },
        Binding { name: "selector", classes: &["dmenu"], handler: dmenu },
        Binding { name: "music player", classes: &["spotify"], handler: spotify },
        Binding { name: "recorder", classes: &["obs"], handler: obs },
        Binding { name: "game", classes: &["Sausage.x86_64"], handler: sausage },
    ]
}

fn pressed(ev: &RawEvent, code: u16) -> bool {
    ev.code == code && ev.value == 1
}

/// Directional edge as the matching arrow key edge
fn arrow(ev: &RawEvent, mods: Modifiers) -> Option<Action> {
    if !ev.is_edge() {
        return None;
    }
    arrow_for(ev.code).map(|code| Action::Key {
        code,
        pressed: ev.value == 1,
        mods,
    })
}

/// Tap `chord` on the press edge of `code`
fn tap_on(ev: &RawEvent, code: u16, chord: Chord) -> Option<Action> {
    pressed(ev, code).then_some(Action::Tap(chord))
}

fn key(code: u16) -> Chord {
    Chord::key(code)
}

/// Primary action button edge as the pointer's left button
fn click(ev: &RawEvent) -> Option<Action> {
    (ev.code == BTN_THUMB && ev.is_edge()).then(|| Action::edge(BTN_LEFT, ev))
}

fn with_keys(actions: impl IntoIterator<Item = Option<Action>>) -> Vec<Action> {
    std::iter::once(Action::ReleasePointer)
        .chain(actions.into_iter().flatten())
        .collect()
}

fn feh(ev: &RawEvent, keys: &KeyState) -> Vec<Action> {
    if keys.b {
        with_keys([arrow(ev, Modifiers::CTRL), tap_on(ev, BTN_THUMB, key(KEY_Z))])
    } else {
        with_keys([arrow(ev, Modifiers::empty()), tap_on(ev, BTN_THUMB, key(KEY_H))])
    }
}

fn mpv(ev: &RawEvent, keys: &KeyState) -> Vec<Action> {
    if keys.b {
        with_keys([
            tap_on(ev, BTN_THUMB, key(KEY_M)),
            tap_on(ev, DPAD_UP, key(KEY_L)),
            tap_on(ev, DPAD_DOWN, Chord::new(KEY_L, Modifiers::SHIFT)),
            tap_on(ev, DPAD_RIGHT, key(KEY_ENTER)),
            tap_on(ev, DPAD_LEFT, key(KEY_102ND)),
        ])
    } else {
        with_keys([tap_on(ev, BTN_THUMB, key(KEY_SPACE)), arrow(ev, Modifiers::empty())])
    }
}

fn streamlink(ev: &RawEvent, keys: &KeyState) -> Vec<Action> {
    if keys.b {
        tap_on(ev, BTN_THUMB, key(KEY_F5)).into_iter().collect()
    } else {
        click(ev).into_iter().chain([Action::EngagePointer]).collect()
    }
}

fn chromium(ev: &RawEvent, keys: &KeyState) -> Vec<Action> {
    if keys.b {
        let side_arrow = match ev.code {
            DPAD_LEFT | DPAD_RIGHT => arrow(ev, Modifiers::empty()),
            _ => None,
        };
        with_keys([
            tap_on(ev, DPAD_UP, key(KEY_F)),
            side_arrow,
            tap_on(ev, DPAD_DOWN, key(KEY_F5)),
            tap_on(ev, BTN_THUMB, key(KEY_SPACE)),
        ])
    } else {
        click(ev).into_iter().chain([Action::EngagePointer]).collect()
    }
}

fn dmenu(ev: &RawEvent, _keys: &KeyState) -> Vec<Action> {
    with_keys([
        tap_on(ev, BTN_THUMB, key(KEY_ENTER)),
        tap_on(ev, BTN_THUMB2, key(KEY_ESC)),
        arrow(ev, Modifiers::empty()),
    ])
}

fn spotify(ev: &RawEvent, keys: &KeyState) -> Vec<Action> {
    if keys.b {
        let vertical_arrow = match ev.code {
            DPAD_UP | DPAD_DOWN => arrow(ev, Modifiers::empty()),
            _ => None,
        };
        with_keys([
            tap_on(ev, BTN_THUMB, key(KEY_SPACE)),
            vertical_arrow,
            tap_on(ev, DPAD_RIGHT, key(KEY_ENTER)),
        ])
    } else {
        tap_on(ev, BTN_THUMB, key(BTN_LEFT))
            .into_iter()
            .chain([Action::EngagePointer])
            .collect()
    }
}

fn obs(ev: &RawEvent, keys: &KeyState) -> Vec<Action> {
    if keys.b {
        with_keys([
            tap_on(ev, DPAD_UP, key(KEY_F9)),
            tap_on(ev, DPAD_DOWN, Chord::new(KEY_F9, Modifiers::SHIFT)),
            tap_on(ev, BTN_THUMB, key(KEY_F10)),
        ])
    } else {
        with_keys([
            tap_on(ev, DPAD_DOWN, key(KEY_F3)),
            tap_on(ev, DPAD_UP, key(KEY_F5)),
            tap_on(ev, DPAD_LEFT, key(KEY_F1)),
            tap_on(ev, DPAD_RIGHT, key(KEY_F2)),
            tap_on(ev, BTN_THUMB, key(KEY_F8)),
        ])
    }
}

fn sausage(ev: &RawEvent, _keys: &KeyState) -> Vec<Action> {
    with_keys([
        tap_on(ev, BTN_THUMB, key(KEY_Z)),
        tap_on(ev, BTN_THUMB2, key(KEY_R)),
        arrow(ev, Modifiers::empty()),
    ])
}

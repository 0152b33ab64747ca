//! Built-in menus

use log::debug;

use super::{Layout, Menu, MenuAction, MenuItem};
use crate::input::codes::*;
use crate::output::{Chord, Modifiers};

/// Workspace labels offered by the "goto"/"send to" prompts
pub const WORKSPACES: &[&str] = &["w", "v", "m", "c", "g", "1", "2", "3", "4", "5", "6"];

/// Key that selects a workspace (layout specific)
pub fn workspace_key(label: &str) -> Option<u16> {
    let code = match label {
        "w" => KEY_W,
        "v" => KEY_V,
        "m" => KEY_M,
        "c" => KEY_C,
        "g" => KEY_G,
        "1" => KEY_1,
        "2" => KEY_2,
        "3" => KEY_KPLEFTPAREN,
        "4" => KEY_4,
        "5" => KEY_LEFTBRACE,
        "6" => KEY_EQUAL,
        _ => return None,
    };
    Some(code)
}

pub fn goto_workspace(label: &str) -> Option<Chord> {
    workspace_key(label).map(|code| Chord::new(code, Modifiers::META))
}

pub fn send_to_workspace(label: &str) -> Option<Chord> {
    workspace_key(label).map(|code| Chord::new(code, Modifiers::SHIFT | Modifiers::META))
}

fn chord(label: &'static str, code: u16, mods: Modifiers) -> MenuItem {
    MenuItem::new(label, MenuAction::Chord(Chord::new(code, mods)))
}

pub fn mpv_menu() -> Menu {
    Menu::new(
        Layout::Vertical,
        vec![
            chord("toggle subtitles", KEY_V, Modifiers::empty()),
            chord("loop current file", KEY_L, Modifiers::SHIFT),
            chord("cycle aspect ratio", KEY_A, Modifiers::SHIFT),
            chord("show stats", KEY_I, Modifiers::empty()),
            chord("toggle stats", KEY_I, Modifiers::SHIFT),
        ],
    )
}

pub fn chromium_menu() -> Menu {
    Menu::new(
        Layout::Vertical,
        vec![
            chord("refresh", KEY_F5, Modifiers::empty()),
            MenuItem::new("spawn", MenuAction::Shell("chromium".to_string())),
            chord("new tab", KEY_T, Modifiers::CTRL),
        ],
    )
}

/// Top-level menu; "kill controller" terminates `engine_pid`
pub fn main_menu(engine_pid: i32) -> Menu {
    debug!("building main menu for engine pid {}", engine_pid);
    Menu::new(
        Layout::Vertical,
        vec![
            MenuItem::new(
                "goto workspace",
                MenuAction::PickLabel {
                    choices: WORKSPACES,
                    resolve: goto_workspace,
                },
            ),
            MenuItem::new(
                "send to workspace",
                MenuAction::PickLabel {
                    choices: WORKSPACES,
                    resolve: send_to_workspace,
                },
            ),
            chord("toggle status bar", KEY_B, Modifiers::META),
            chord("ESC", KEY_ESC, Modifiers::empty()),
            chord("ENTER", KEY_ENTER, Modifiers::empty()),
            MenuItem::new("mpv", MenuAction::Submenu(mpv_menu())),
            MenuItem::new("chromium", MenuAction::Submenu(chromium_menu())),
            MenuItem::new(
                "kill controller",
                MenuAction::Shell(format!("kill -TERM {}", engine_pid)),
            ),
        ],
    )
}

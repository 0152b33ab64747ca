//! Interactive menus
//!
//! A menu is a list of labelled actions. The labels are handed to an
//! external selector process; the line it answers with picks the item.
//! Anything that is not an exact label match means "no selection".

pub mod catalog;

use anyhow::{Context, Result};
use std::fmt;
use std::io::{BufRead, BufReader, Read};

use crate::output::Chord;

/// How the selector should lay out the candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One candidate per line
    Vertical,
    /// All candidates on one line
    Horizontal,
}

/// What picking an item does
#[derive(Clone)]
pub enum MenuAction {
    /// Tap a key chord on the virtual device
    Chord(Chord),
    /// Run a shell command and wait for it
    Shell(String),
    /// Open a nested menu
    Submenu(Menu),
    /// Offer `choices` in a second prompt and resolve the picked label
    PickLabel {
        choices: &'static [&'static str],
        resolve: fn(&str) -> Option<Chord>,
    },
}

impl fmt::Debug for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chord(chord) => f.debug_tuple("Chord").field(chord).finish(),
            Self::Shell(cmd) => f.debug_tuple("Shell").field(cmd).finish(),
            Self::Submenu(menu) => f.debug_tuple("Submenu").field(menu).finish(),
            Self::PickLabel { choices, .. } => {
                f.debug_struct("PickLabel").field("choices", choices).finish()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct MenuItem {
    pub label: &'static str,
    pub action: MenuAction,
}

impl MenuItem {
    pub fn new(label: &'static str, action: MenuAction) -> Self {
        Self { label, action }
    }
}

#[derive(Debug, Clone)]
pub struct Menu {
    pub items: Vec<MenuItem>,
    pub layout: Layout,
}

impl Menu {
    pub fn new(layout: Layout, items: Vec<MenuItem>) -> Self {
        Self { items, layout }
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.items.iter().map(|item| item.label).collect()
    }

    /// Index of the item whose label is exactly `answer`
    pub fn find(&self, answer: &str) -> Option<usize> {
        match_label(self.items.iter().map(|item| item.label), answer)
    }
}

/// Position of the first label equal to `answer`
pub fn match_label<'a>(labels: impl IntoIterator<Item = &'a str>, answer: &str) -> Option<usize> {
    labels.into_iter().position(|label| label == answer)
}

/// Read one newline-terminated answer from a selector's output
///
/// Output closed before a newline is no selection.
pub fn read_selection<R: Read>(reader: R) -> Result<Option<String>> {
    let mut buf = Vec::new();
    BufReader::new(reader)
        .read_until(b'\n', &mut buf)
        .context("Failed to read selector output")?;
    if buf.last() != Some(&b'\n') {
        return Ok(None);
    }
    buf.pop();
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

//! Test doubles for the engine's seams

use anyhow::{bail, Result};
use std::collections::{HashMap, VecDeque};

use crate::error::RemapError;
use crate::input::RawEvent;
use crate::menu::Layout;
use crate::output::EventSink;
use crate::process::{ForkSide, Processes};
use crate::window::{WindowContext, WindowId, WindowSource};

/// Sink that keeps every event, with each frame's terminator
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<RawEvent>,
    frames: usize,
    fail_after: Option<usize>,
}

impl RecordingSink {
    /// Accept `n` frames, then fail every write
    pub fn failing_after(n: usize) -> Self {
        Self {
            fail_after: Some(n),
            ..Self::default()
        }
    }
}

impl EventSink for RecordingSink {
    fn emit_frame(&mut self, events: &[RawEvent]) -> Result<()> {
        if let Some(n) = self.fail_after {
            if self.frames >= n {
                bail!("sink closed");
            }
        }
        self.frames += 1;
        self.events.extend_from_slice(events);
        self.events.push(RawEvent::syn());
        Ok(())
    }
}

/// Scripted window tree
#[derive(Debug, Default)]
pub struct FakeWindows {
    pub focus: Option<WindowId>,
    windows: HashMap<WindowId, (Option<WindowId>, Vec<String>)>,
    pub reconnects: usize,
    pub context_queries: usize,
}

impl FakeWindows {
    /// Single focused window with `class`
    pub fn focused(window: WindowId, class: &[&str]) -> Self {
        let mut fake = Self {
            focus: Some(window),
            ..Self::default()
        };
        fake.add_window(window, None, class);
        fake
    }

    pub fn add_window(&mut self, window: WindowId, parent: Option<WindowId>, class: &[&str]) {
        let class = class.iter().map(|c| c.to_string()).collect();
        self.windows.insert(window, (parent, class));
    }

    pub fn set_parent(&mut self, window: WindowId, parent: WindowId) {
        if let Some(entry) = self.windows.get_mut(&window) {
            entry.0 = Some(parent);
        }
    }

    /// Replace the focused window's class list
    pub fn set_focus_class(&mut self, class: &[&str]) {
        if let Some(w) = self.focus {
            let parent = self.windows.get(&w).and_then(|e| e.0);
            self.add_window(w, parent, class);
        }
    }
}

impl WindowSource for FakeWindows {
    fn focused_window(&mut self) -> Result<WindowId> {
        self.focus.ok_or_else(|| RemapError::NoFocus.into())
    }

    fn window_context(&mut self, window: WindowId) -> Result<WindowContext> {
        self.context_queries += 1;
        let class = self
            .windows
            .get(&window)
            .map(|(_, class)| class.clone())
            .unwrap_or_default();
        Ok(WindowContext {
            window,
            class,
            name: String::new(),
        })
    }

    fn parent(&mut self, window: WindowId) -> Result<Option<WindowId>> {
        Ok(self.windows.get(&window).and_then(|(parent, _)| *parent))
    }

    fn reconnect(&mut self) -> Result<()> {
        self.reconnects += 1;
        Ok(())
    }
}

/// One selector invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub labels: Vec<String>,
    pub window: WindowId,
    pub layout: Layout,
}

/// Scripted process host
#[derive(Debug)]
pub struct FakeProcesses {
    pub detached: Vec<String>,
    pub ran: Vec<String>,
    pub prompts: Vec<Prompt>,
    pub finished: Vec<i32>,
    /// Answers handed out in order; exhausted means no selection
    pub answers: VecDeque<Option<String>>,
    pub fork_side: ForkSide,
}

impl Default for FakeProcesses {
    fn default() -> Self {
        Self {
            detached: Vec::new(),
            ran: Vec::new(),
            prompts: Vec::new(),
            finished: Vec::new(),
            answers: VecDeque::new(),
            fork_side: ForkSide::Parent,
        }
    }
}

impl FakeProcesses {
    /// Host that answers each prompt with the next of `answers`
    pub fn answering(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| Some(a.to_string())).collect(),
            ..Self::default()
        }
    }
}

impl Processes for FakeProcesses {
    fn spawn_detached(&mut self, command: &str) -> Result<()> {
        self.detached.push(command.to_string());
        Ok(())
    }

    fn run_shell(&mut self, command: &str) -> Result<()> {
        self.ran.push(command.to_string());
        Ok(())
    }

    fn fork_detached(&mut self) -> Result<ForkSide> {
        Ok(self.fork_side)
    }

    fn finish_detached(&mut self, status: i32) {
        self.finished.push(status);
    }

    fn choose(
        &mut self,
        labels: &[&str],
        window: WindowId,
        layout: Layout,
    ) -> Result<Option<String>> {
        self.prompts.push(Prompt {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            window,
            layout,
        });
        Ok(self.answers.pop_front().flatten())
    }
}

//! Window context resolution
//!
//! Dispatch decisions key off the class list of the window that has
//! input focus. Context is resolved fresh for every decision; focus can
//! move between two events of the same burst.

mod x11;

pub use self::x11::XlibWindows;

use anyhow::Result;
use log::trace;

/// Native window handle
pub type WindowId = u64;

/// Focused window identity as seen by dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowContext {
    pub window: WindowId,
    /// `WM_CLASS` entries in property order (instance, then class)
    pub class: Vec<String>,
    /// `_NET_WM_NAME`, empty when the window does not set it
    pub name: String,
}

impl WindowContext {
    /// Exact match against any class entry
    pub fn has_class(&self, name: &str) -> bool {
        self.class.iter().any(|c| c == name)
    }
}

/// Split a NUL-separated `WM_CLASS` payload into its entries
///
/// A trailing NUL is optional; empty entries are dropped.
pub fn parse_class_list(bytes: &[u8]) -> Vec<String> {
    bytes
        .split(|b| *b == 0)
        .filter(|s| !s.is_empty())
        .map(|s| String::from_utf8_lossy(s).into_owned())
        .collect()
}

/// Query interface to the window system
///
/// Absent properties resolve to empty values. A broken query mechanism
/// (no focus, unexpected property encoding) is an error.
pub trait WindowSource {
    /// Window that currently has input focus
    fn focused_window(&mut self) -> Result<WindowId>;

    /// Class list and name of `window`
    fn window_context(&mut self, window: WindowId) -> Result<WindowContext>;

    /// Parent of `window`, None at the root
    #[allow(dead_code)]
    fn parent(&mut self, window: WindowId) -> Result<Option<WindowId>>;

    /// Drop the current connection and open a fresh one
    ///
    /// Required after fork: the child must not share the parent's socket.
    fn reconnect(&mut self) -> Result<()>;

    fn current_context(&mut self) -> Result<WindowContext> {
        let window = self.focused_window()?;
        trace!("focused window: {}", window);
        self.window_context(window)
    }

    /// Check `window` and each of its ancestors up to the root for `name`
    ///
    /// Query used by the keyboard layout switcher, which shares this
    /// interface; the remapping path itself only looks at the focused window.
    #[allow(dead_code)]
    fn has_class_recursive(&mut self, window: WindowId, name: &str) -> Result<bool> {
        let mut current = Some(window);
        while let Some(w) = current {
            if self.window_context(w)?.has_class(name) {
                return Ok(true);
            }
            current = self.parent(w)?;
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeWindows;

    #[test]
    fn test_parse_class_list() {
        assert_eq!(parse_class_list(b"Navigator\0firefox\0"), vec!["Navigator", "firefox"]);
        assert_eq!(parse_class_list(b"feh\0feh"), vec!["feh", "feh"]);
        assert!(parse_class_list(b"").is_empty());
    }

    #[test]
    fn test_has_class_is_exact() {
        let ctx = WindowContext {
            window: 1,
            class: vec!["mpv".into(), "mpv".into()],
            name: String::new(),
        };
        assert!(ctx.has_class("mpv"));
        assert!(!ctx.has_class("mp"));
        assert!(!ctx.has_class("MPV"));
    }

    #[test]
    fn test_current_context_reads_focus() {
        let mut windows = FakeWindows::focused(7, &["spotify", "Spotify"]);
        let ctx = windows.current_context().unwrap();
        assert_eq!(ctx.window, 7);
        assert!(ctx.has_class("Spotify"));
    }

    #[test]
    fn test_has_class_recursive_walks_to_root() {
        // 3 -> 2 -> 1 (root)
        let mut windows = FakeWindows::focused(3, &[]);
        windows.add_window(2, Some(1), &["chromium", "Chromium"]);
        windows.add_window(1, None, &[]);
        windows.set_parent(3, 2);

        assert!(windows.has_class_recursive(3, "chromium").unwrap());
        assert!(!windows.has_class_recursive(3, "feh").unwrap());
        assert!(!windows.has_class_recursive(1, "chromium").unwrap());
    }
}

//! Child processes
//!
//! Three ways of running something outside the engine:
//! - `spawn_detached`: double fork and exec, never waited on beyond the
//!   short-lived intermediate child (visual helpers)
//! - `run_shell`: run a command and wait for it (menu actions)
//! - `choose`: run the selector with labels on stdin and read its answer
//!
//! `fork_detached` detaches the calling code itself, so a whole menu
//! session can run without blocking the main loop.

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use nix::sys::signal::SigSet;
use nix::sys::wait::waitpid;
use nix::unistd::{fork, ForkResult};
use std::ffi::CString;
use std::io::{self, Write};
use std::process::{Command, Stdio};

use crate::config::{HelperConfig, MenuConfig};
use crate::menu::{read_selection, Layout};
use crate::window::WindowId;

/// Which side of `fork_detached` the caller is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForkSide {
    /// Calling process; the detached copy is already running
    Parent,
    /// Detached grandchild; must end with `finish_detached`
    Detached,
}

/// Process host used by the engine
pub trait Processes {
    /// Start `command` in the background with no return channel
    fn spawn_detached(&mut self, command: &str) -> Result<()>;

    /// Run `command` through the shell and wait for it
    fn run_shell(&mut self, command: &str) -> Result<()>;

    /// Continue the caller in a detached grandchild
    fn fork_detached(&mut self) -> Result<ForkSide>;

    /// Leave the detached grandchild
    fn finish_detached(&mut self, status: i32);

    /// Offer `labels` to the selector, positioned at `window`
    ///
    /// Returns the raw answer line, None if the selector gave none.
    fn choose(&mut self, labels: &[&str], window: WindowId, layout: Layout)
        -> Result<Option<String>>;
}

/// Real process host
pub struct SystemProcesses {
    shell: String,
    selector: String,
    vertical_args: String,
}

impl SystemProcesses {
    pub fn new(helpers: &HelperConfig, menu: &MenuConfig) -> Self {
        Self {
            shell: helpers.shell.clone(),
            selector: menu.selector.clone(),
            vertical_args: menu.vertical_args.clone(),
        }
    }

    /// Selector command line for `window`
    pub fn selector_command(&self, window: WindowId, layout: Layout) -> String {
        let mut cmd = self.selector.replace("{window}", &window.to_string());
        if layout == Layout::Vertical && !self.vertical_args.is_empty() {
            cmd.push(' ');
            cmd.push_str(&self.vertical_args);
        }
        cmd
    }

    fn shell_command(&self, command: &str) -> Command {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c").arg(command);
        cmd
    }
}

/// Fork twice; the intermediate child exits at once and is reaped here
///
/// Returns true in the grandchild.
fn double_fork() -> Result<bool> {
    // SAFETY: the intermediate child only forks again and _exits.
    match unsafe { fork() }.context("fork failed")? {
        ForkResult::Parent { child } => {
            waitpid(child, None).context("waitpid failed")?;
            Ok(false)
        }
        ForkResult::Child => match unsafe { fork() } {
            Ok(ForkResult::Parent { .. }) => unsafe { libc::_exit(0) },
            Ok(ForkResult::Child) => {
                // Shutdown signals are blocked for the signalfd; helpers and
                // the detached menu must stay killable
                let _ = SigSet::empty().thread_set_mask();
                Ok(true)
            }
            Err(_) => unsafe { libc::_exit(1) },
        },
    }
}

impl Processes for SystemProcesses {
    fn spawn_detached(&mut self, command: &str) -> Result<()> {
        // Arguments are built before forking; the grandchild only execs
        let shell = CString::new(self.shell.as_str())?;
        let argv = [shell.clone(), CString::new("-c")?, CString::new(command)?];

        debug!("spawning detached: {}", command);
        if double_fork()? {
            let _ = nix::unistd::execv(&shell, &argv);
            unsafe { libc::_exit(127) };
        }
        Ok(())
    }

    fn run_shell(&mut self, command: &str) -> Result<()> {
        debug!("running: {}", command);
        let status = self
            .shell_command(command)
            .status()
            .with_context(|| format!("Failed to run: {}", command))?;
        if !status.success() {
            warn!("command exited with {}: {}", status, command);
        }
        Ok(())
    }

    fn fork_detached(&mut self) -> Result<ForkSide> {
        if double_fork()? {
            info!("detached menu process: pid={}", std::process::id());
            Ok(ForkSide::Detached)
        } else {
            Ok(ForkSide::Parent)
        }
    }

    fn finish_detached(&mut self, status: i32) {
        // No destructors: the virtual device belongs to the engine process
        std::process::exit(status)
    }

    fn choose(
        &mut self,
        labels: &[&str],
        window: WindowId,
        layout: Layout,
    ) -> Result<Option<String>> {
        let command = self.selector_command(window, layout);
        debug!("selector: {}", command);

        let mut child = self
            .shell_command(&command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to start selector: {}", command))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("selector stdin not captured"))?;
        let written = write_labels(&mut stdin, labels);
        // Closing stdin ends the candidate list
        drop(stdin);

        let answer = match written {
            Ok(()) => match child.stdout.take() {
                Some(stdout) => read_selection(stdout),
                None => Err(anyhow!("selector stdout not captured")),
            },
            Err(e) => Err(e),
        };

        let status = child.wait().context("Failed to wait for selector")?;
        debug!("selector exited: {}", status);
        answer
    }
}

/// Write one label per line; a selector that quits early is not an error
fn write_labels<W: Write>(out: &mut W, labels: &[&str]) -> Result<()> {
    for label in labels {
        match writeln!(out, "{}", label) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!("selector closed its input early");
                return Ok(());
            }
            Err(e) => return Err(e).context("Failed to write selector input"),
        }
    }
    match out.flush() {
        Err(e) if e.kind() != io::ErrorKind::BrokenPipe => {
            Err(e).context("Failed to write selector input")
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processes(selector: &str) -> SystemProcesses {
        SystemProcesses {
            shell: "/bin/sh".to_string(),
            selector: selector.to_string(),
            vertical_args: "-l 20".to_string(),
        }
    }

    #[test]
    fn test_selector_command_substitutes_window() {
        let p = processes("dmenu -w {window}");
        assert_eq!(p.selector_command(42, Layout::Vertical), "dmenu -w 42 -l 20");
        assert_eq!(p.selector_command(42, Layout::Horizontal), "dmenu -w 42");
    }

    #[test]
    fn test_choose_reads_answer_line() {
        // Trailing comment swallows the appended vertical args
        let mut p = processes("sed -n 2p #");
        let answer = p.choose(&["a", "b", "c"], 1, Layout::Vertical).unwrap();
        assert_eq!(answer.as_deref(), Some("b"));
    }

    #[test]
    fn test_choose_without_output_is_none() {
        let mut p = processes("true");
        let answer = p.choose(&["a", "b", "c"], 1, Layout::Horizontal).unwrap();
        assert_eq!(answer, None);
    }

    #[test]
    fn test_choose_sees_window_hint() {
        let mut p = processes("cat >/dev/null; echo {window}");
        let answer = p.choose(&["x"], 77, Layout::Horizontal).unwrap();
        assert_eq!(answer.as_deref(), Some("77"));
    }

    #[test]
    fn test_run_shell_waits() {
        let path = std::env::temp_dir().join(format!("padmap-run-shell-{}", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let mut p = processes("true");
        p.run_shell(&format!("echo done > {}", path.display())).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "done\n");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_detached_helper_does_not_inherit_blocked_signals() {
        use nix::sys::signal::{SigmaskHow, Signal};
        use std::time::{Duration, Instant};

        let dir = std::env::temp_dir();
        let path = dir.join(format!("padmap-sigblk-{}", std::process::id()));
        let partial = dir.join(format!("padmap-sigblk-{}.tmp", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let mut blocked = SigSet::empty();
        blocked.add(Signal::SIGTERM);
        let old = blocked.thread_swap_mask(SigmaskHow::SIG_BLOCK).unwrap();

        let mut p = processes("true");
        let spawned = p.spawn_detached(&format!(
            "grep SigBlk /proc/self/status > {0} && mv {0} {1}",
            partial.display(),
            path.display()
        ));
        old.thread_set_mask().unwrap();
        spawned.unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let status = loop {
            if let Ok(text) = std::fs::read_to_string(&path) {
                break text;
            }
            assert!(Instant::now() < deadline, "helper never ran");
            std::thread::sleep(Duration::from_millis(10));
        };
        let _ = std::fs::remove_file(&path);

        let hex = status.trim().trim_start_matches("SigBlk:").trim();
        let mask = u64::from_str_radix(hex, 16).unwrap();
        assert_eq!(mask & (1 << (libc::SIGTERM - 1)), 0, "{}", status);
    }

    #[test]
    fn test_write_labels_tolerates_broken_pipe() {
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::ErrorKind::BrokenPipe.into())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        assert!(write_labels(&mut Closed, &["a"]).is_ok());
    }
}

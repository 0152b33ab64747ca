//! Shutdown signals
//!
//! SIGTERM (the menu's "kill controller", systemd stop), SIGINT (Ctrl+C)
//! and SIGHUP are blocked and delivered through a signalfd that the main
//! loop polls next to the controller, so a signal arriving between two
//! waits is still seen by the next one.

use anyhow::{Context, Result};
use log::{debug, warn};
use nix::sys::signal::{SigSet, SigmaskHow, Signal};
use nix::sys::signalfd::{SfdFlags, SignalFd};
use std::os::fd::{AsRawFd, RawFd};

const SHUTDOWN_SIGNALS: [Signal; 3] = [Signal::SIGTERM, Signal::SIGINT, Signal::SIGHUP];

/// Pending shutdown requests, readable through a signalfd
pub struct ShutdownSignals {
    signal_fd: SignalFd,
    /// Mask to restore on drop
    old_sigmask: SigSet,
}

impl ShutdownSignals {
    /// Block the shutdown signals on this thread and open the signalfd
    ///
    /// Call before spawning any thread so the mask is inherited.
    pub fn new() -> Result<Self> {
        let mut mask = SigSet::empty();
        for signal in SHUTDOWN_SIGNALS {
            mask.add(signal);
        }

        let old_sigmask = mask
            .thread_swap_mask(SigmaskHow::SIG_BLOCK)
            .context("Failed to block shutdown signals")?;
        let signal_fd = SignalFd::with_flags(&mask, SfdFlags::SFD_NONBLOCK | SfdFlags::SFD_CLOEXEC)
            .context("Failed to create signalfd")?;

        Ok(Self {
            signal_fd,
            old_sigmask,
        })
    }

    pub fn as_raw_fd(&self) -> RawFd {
        self.signal_fd.as_raw_fd()
    }

    /// Consume one pending signal, if any
    pub fn take(&mut self) -> Option<Signal> {
        match self.signal_fd.read_signal() {
            Ok(Some(siginfo)) => {
                let signal = Signal::try_from(siginfo.ssi_signo as i32).ok();
                debug!("signalfd delivered {:?}", signal);
                signal
            }
            Ok(None) => None,
            Err(e) => {
                warn!("signalfd read error: {}", e);
                None
            }
        }
    }
}

impl Drop for ShutdownSignals {
    fn drop(&mut self) {
        if let Err(e) = self.old_sigmask.thread_set_mask() {
            warn!("Failed to restore signal mask: {}", e);
        }
    }
}

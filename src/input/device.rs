//! Physical controller input
//!
//! Opens the controller's /dev/input/eventN node through evdev, switches it
//! to non-blocking and drains whatever the kernel has buffered. The main
//! loop waits with poll(2) on the controller and the shutdown signalfd.

use anyhow::{anyhow, Context, Result};
use evdev::Device;
use log::{debug, info, trace};
use std::io;
use std::os::fd::{AsRawFd, RawFd};
use std::path::Path;
use std::time::Duration;

use super::event::RawEvent;
use crate::error::RemapError;

/// Outcome of one readiness wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Timeout elapsed without activity
    Timeout,
    /// Records are buffered
    Readable,
    /// Device went away (unplugged)
    Disconnected,
    /// A shutdown signal is pending
    Shutdown,
    /// Wait interrupted by a signal
    Interrupted,
}

/// Controller device handle
pub struct Controller {
    device: Device,
}

impl Controller {
    /// Open the controller device non-blocking
    pub fn open(path: &Path) -> Result<Self> {
        let device = Device::open(path)
            .with_context(|| format!("Cannot open input device: {}", path.display()))?;
        set_nonblocking(device.as_raw_fd())?;

        info!(
            "Input device: {} ({})",
            path.display(),
            device.name().unwrap_or("unnamed")
        );
        Ok(Self { device })
    }

    /// Drain the events buffered right now
    ///
    /// An empty batch means no data is available.
    pub fn read_events(&mut self) -> Result<Vec<RawEvent>> {
        trace!("reading events");
        match self.device.fetch_events() {
            Ok(events) => Ok(events
                .map(RawEvent::from)
                .inspect(|ev| debug!("received event: {}", ev))
                .collect()),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(Vec::new()),
            Err(e) => Err(anyhow!("Controller read error: {}", e)),
        }
    }

    /// Wait until the device is readable, disconnects, a shutdown signal
    /// arrives on `shutdown_fd`, or `timeout` elapses
    pub fn wait(&self, shutdown_fd: RawFd, timeout: Duration) -> Result<Readiness> {
        wait_readiness(self.device.as_raw_fd(), shutdown_fd, timeout)
    }
}

fn set_nonblocking(fd: RawFd) -> Result<()> {
    let flags = nix::fcntl::fcntl(fd, nix::fcntl::FcntlArg::F_GETFL)
        .map_err(|e| anyhow!("F_GETFL failed: {}", e))?;
    let mut flags = nix::fcntl::OFlag::from_bits_truncate(flags);
    flags.insert(nix::fcntl::OFlag::O_NONBLOCK);
    nix::fcntl::fcntl(fd, nix::fcntl::FcntlArg::F_SETFL(flags))
        .map_err(|e| anyhow!("F_SETFL failed: {}", e))?;
    Ok(())
}

/// poll(2) the device and shutdown descriptors together
///
/// A pending shutdown wins over device activity.
fn wait_readiness(device_fd: RawFd, shutdown_fd: RawFd, timeout: Duration) -> Result<Readiness> {
    let mut fds = [
        libc::pollfd {
            fd: device_fd,
            events: libc::POLLIN,
            revents: 0,
        },
        libc::pollfd {
            fd: shutdown_fd,
            events: libc::POLLIN,
            revents: 0,
        },
    ];
    let timeout_ms = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;

    let ret = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, timeout_ms) };
    if ret < 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(Readiness::Interrupted);
        }
        return Err(anyhow!("poll failed on fd {}: {}", device_fd, err));
    }
    if ret == 0 {
        return Ok(Readiness::Timeout);
    }

    let [device, shutdown] = fds;
    trace!(
        "poll events: device={:#x} shutdown={:#x}",
        device.revents,
        shutdown.revents
    );
    if shutdown.revents & libc::POLLIN != 0 {
        return Ok(Readiness::Shutdown);
    }
    if shutdown.revents != 0 {
        return Err(RemapError::UnhandledReadiness {
            fd: shutdown.fd,
            revents: shutdown.revents,
        }
        .into());
    }
    classify_revents(device.fd, device.revents)
}

/// Map poll(2) revents to a readiness outcome
///
/// HUP is the disconnect signal (usually reported together with ERR).
/// Anything else besides IN is a broken precondition.
fn classify_revents(fd: RawFd, revents: libc::c_short) -> Result<Readiness> {
    if revents & libc::POLLHUP != 0 {
        return Ok(Readiness::Disconnected);
    }
    if revents & !libc::POLLIN != 0 || revents == 0 {
        return Err(RemapError::UnhandledReadiness { fd, revents }.into());
    }
    Ok(Readiness::Readable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::os::unix::net::UnixStream;

    const SHORT: Duration = Duration::from_millis(1);
    const LONG: Duration = Duration::from_millis(100);

    #[test]
    fn test_wait_reports_readable_and_timeout() {
        let (mut writer, device) = UnixStream::pair().unwrap();
        let (_signals, shutdown) = UnixStream::pair().unwrap();
        let wait = || wait_readiness(device.as_raw_fd(), shutdown.as_raw_fd(), LONG);

        assert_eq!(
            wait_readiness(device.as_raw_fd(), shutdown.as_raw_fd(), SHORT).unwrap(),
            Readiness::Timeout
        );
        writer.write_all(&[0u8; 24]).unwrap();
        assert_eq!(wait().unwrap(), Readiness::Readable);
    }

    #[test]
    fn test_wait_reports_disconnect() {
        let (writer, device) = UnixStream::pair().unwrap();
        let (_signals, shutdown) = UnixStream::pair().unwrap();
        drop(writer);
        assert_eq!(
            wait_readiness(device.as_raw_fd(), shutdown.as_raw_fd(), LONG).unwrap(),
            Readiness::Disconnected
        );
    }

    #[test]
    fn test_pending_shutdown_wins_over_input() {
        let (mut writer, device) = UnixStream::pair().unwrap();
        let (mut signals, shutdown) = UnixStream::pair().unwrap();
        writer.write_all(&[0u8; 24]).unwrap();
        signals.write_all(&[1]).unwrap();

        assert_eq!(
            wait_readiness(device.as_raw_fd(), shutdown.as_raw_fd(), LONG).unwrap(),
            Readiness::Shutdown
        );
    }

    #[test]
    fn test_classify_revents() {
        let hup_err = libc::POLLHUP | libc::POLLERR;
        assert_eq!(classify_revents(3, hup_err).unwrap(), Readiness::Disconnected);
        assert_eq!(classify_revents(3, libc::POLLIN).unwrap(), Readiness::Readable);
        assert!(classify_revents(3, libc::POLLERR).is_err());
        assert!(classify_revents(3, libc::POLLNVAL).is_err());
    }
}

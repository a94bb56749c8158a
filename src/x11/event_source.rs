//! X11 socket readiness
//!
//! Blocks the calling thread until the X11 file descriptor becomes readable,
//! with a mio `Poll` registered for readability on that descriptor.
//! Single-threaded: the caller drains `poll_for_event` before every wait.

use anyhow::{Context, Result};
use std::io;
use std::os::unix::io::RawFd;
use std::time::Duration;

const X11_TOKEN: mio::Token = mio::Token(0);

/// Upper bound on a single wait. mio is edge-triggered, so the caller
/// re-drains the connection on every wake-up, including spurious ones.
const POLL_TICK: Duration = Duration::from_millis(250);

pub struct EventSource {
    poll: mio::Poll,
    events: mio::Events,
}

impl EventSource {
    pub fn new(fd: RawFd) -> Result<Self> {
        let poll = mio::Poll::new().context("Failed to create mio Poll")?;
        poll.registry()
            .register(
                &mut mio::unix::SourceFd(&fd),
                X11_TOKEN,
                mio::Interest::READABLE,
            )
            .context("Failed to register X11 FD with mio")?;

        Ok(Self {
            poll,
            events: mio::Events::with_capacity(1),
        })
    }

    /// Wait until the socket is readable or the tick runs out
    pub fn wait_readable(&mut self) -> Result<()> {
        match self.poll.poll(&mut self.events, Some(POLL_TICK)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(()),
            Err(e) => Err(e).context("X11 socket poll failed"),
        }
    }
}

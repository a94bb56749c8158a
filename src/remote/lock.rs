//! Lock Protocol
//!
//! The lock property normally does not exist; you take the lock by setting
//! it. The test and the set happen with the server grabbed so that no other
//! client can do the same in between. Whoever deletes the property releases
//! the lock; there is no owner check.

use anyhow::Result;
use tracing::debug;

use super::server::{Property, ServerGrab, Watch, Window, WindowServer};
use super::waiter::{WaitOutcome, wait_for_change};
use crate::error::RemoteError;

/// Value written into the lock property. Nothing reads it back.
fn lock_value() -> String {
    format!("{} on pid {}", env!("CARGO_PKG_NAME"), std::process::id())
}

/// Make one attempt at the lock. `Ok(false)` means someone else holds it.
pub fn try_lock<S: WindowServer + ?Sized>(server: &S, window: Window) -> Result<bool> {
    let grab = ServerGrab::new(server)?;

    let held = server
        .get(window, Property::Lock)?
        .is_some_and(|value| !value.is_empty());
    if held {
        grab.finish()?;
        return Ok(false);
    }

    let written = server.set(window, Property::Lock, lock_value().as_bytes());
    grab.finish()?;
    written.map_err(|source| RemoteError::PropertyWrite {
        property: Property::Lock.to_string(),
        source,
    })?;
    Ok(true)
}

/// Take the lock, waiting as long as it takes.
///
/// Fails with [`RemoteError::TargetVanished`] if the window is destroyed
/// while we wait. There is no timeout.
pub fn acquire<S: WindowServer + ?Sized>(server: &S, watch: &Watch<'_, S>) -> Result<()> {
    let window = watch.window();
    loop {
        if try_lock(server, window)? {
            debug!("Locked window 0x{:x}", window);
            return Ok(());
        }

        debug!("Window 0x{:x} is locked by someone else, waiting", window);
        // A deletion or a new holder both just mean trying again
        if wait_for_change(server, watch, Property::Lock)? == WaitOutcome::Destroyed {
            return Err(RemoteError::TargetVanished.into());
        }
    }
}

/// Release the lock, assuming it is ours. Releasing a free lock is fine.
pub fn release<S: WindowServer + ?Sized>(server: &S, window: Window) -> Result<()> {
    server.delete(window, Property::Lock)?;
    server.sync()?;
    debug!("Unlocked window 0x{:x}", window);
    Ok(())
}

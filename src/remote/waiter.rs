//! Event Waiter
//!
//! Blocks on the server's event stream until one property of a watched
//! window changes or the window is destroyed. Events are handled one at a
//! time; anything else is discarded.

use anyhow::Result;
use tracing::trace;

use super::server::{Property, PropertyState, ServerEvent, Watch, WindowServer};

/// What ended a wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Changed(PropertyState),
    Destroyed,
}

/// Wait for `property` on the watched window to change.
///
/// Only changes that happen after `watch` was created are seen, so create
/// it before doing anything whose effect should be observed.
pub fn wait_for_change<S: WindowServer + ?Sized>(
    server: &S,
    watch: &Watch<'_, S>,
    property: Property,
) -> Result<WaitOutcome> {
    let window = watch.window();
    loop {
        match server.next_event()? {
            ServerEvent::PropertyChanged {
                window: w,
                property: Some(p),
                state,
            } if w == window && p == property => return Ok(WaitOutcome::Changed(state)),
            ServerEvent::Destroyed { window: w } if w == window => {
                return Ok(WaitOutcome::Destroyed);
            }
            event => trace!("Ignoring {:?}", event),
        }
    }
}

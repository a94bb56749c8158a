//! Session Orchestrator
//!
//! One remote command against one window: watch, lock, write the command
//! line, wait for the response, unlock.

use anyhow::Result;
use tracing::{debug, info, warn};

use super::command;
use super::lock;
use super::server::{Property, PropertyState, Watch, Window, WindowServer};
use super::waiter::{WaitOutcome, wait_for_change};
use crate::error::RemoteError;

pub struct Session<'a, S: WindowServer + ?Sized> {
    server: &'a S,
    window: Window,
}

impl<'a, S: WindowServer + ?Sized> Session<'a, S> {
    pub fn new(server: &'a S, window: Window) -> Self {
        Self { server, window }
    }

    /// Send `firefox <extra_args>` and return the response text, or an empty
    /// string when no usable response arrived.
    ///
    /// With `force` the lock is not taken but is still deleted afterwards,
    /// which clears a lock left behind by a dead client.
    pub fn submit(&self, working_dir: &str, extra_args: &[String], force: bool) -> Result<String> {
        // Before any write that could trigger the response
        let watch = Watch::new(self.server, self.window)?;

        if force {
            debug!("Forced: not locking window 0x{:x}", self.window);
        } else if let Err(e) = lock::acquire(self.server, &watch) {
            // Only our own failed lock write may have left a lock behind;
            // otherwise the lock belongs to someone else, or to nobody.
            if matches!(
                e.downcast_ref::<RemoteError>(),
                Some(RemoteError::PropertyWrite { .. })
            ) {
                self.release();
            }
            return Err(e);
        }

        let argv = command::command_argv(extra_args);
        debug!("Sending {:?} from {}", argv, working_dir);
        let payload = command::encode(working_dir, &argv);

        let response = self.exchange(&watch, &payload);
        self.release();
        response
    }

    fn exchange(&self, watch: &Watch<'_, S>, payload: &[u8]) -> Result<String> {
        self.server
            .set(self.window, Property::CommandLine, payload)
            .map_err(|source| RemoteError::PropertyWrite {
                property: Property::CommandLine.to_string(),
                source,
            })?;

        match wait_for_change(self.server, watch, Property::Response) {
            Ok(WaitOutcome::Changed(PropertyState::NewValue)) => {}
            Ok(WaitOutcome::Changed(PropertyState::Deleted)) => {
                debug!("Response property was deleted instead of set");
                return Ok(String::new());
            }
            Ok(WaitOutcome::Destroyed) => {
                warn!("Firefox window disappeared before responding");
                return Ok(String::new());
            }
            Err(e) => {
                warn!("Failed waiting for a response: {:#}", e);
                return Ok(String::new());
            }
        }

        let response = match self.server.get(self.window, Property::Response) {
            Ok(value) => value
                .map(|v| String::from_utf8_lossy(&v).into_owned())
                .unwrap_or_default(),
            Err(e) => {
                warn!("Failed to read response: {:#}", e);
                String::new()
            }
        };
        info!("Response from 0x{:x}: {}", self.window, response);
        Ok(response)
    }

    /// Best effort: the window may already be gone
    fn release(&self) {
        if let Err(e) = lock::release(self.server, self.window) {
            warn!("Failed to release lock on 0x{:x}: {:#}", self.window, e);
        }
    }
}

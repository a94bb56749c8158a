//! Remote Control Module
//!
//! Talks to a running Firefox through properties on its X window:
//! find the window, take the lock, write the command line, wait for the
//! response, drop the lock.

pub mod command;
pub mod lock;
pub mod matcher;
pub mod server;
pub mod session;
pub mod waiter;

#[cfg(test)]
pub mod testing;

pub use server::{Property, PropertyState, ServerEvent, Window, WindowServer};

/// Protocol version a target must advertise, exactly.
/// This is a *protocol* version, not a Firefox version.
pub const PROTOCOL_VERSION: &str = "5.1";

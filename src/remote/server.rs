//! Window server capability
//!
//! The protocol never touches the X connection directly. Everything it needs
//! from the server (window tree, properties, grabs, events) goes through
//! [`WindowServer`], so the same code runs against X11 and against the
//! in-memory server used by the tests.

use anyhow::Result;
use std::fmt;
use tracing::{debug, warn};

use crate::config::PropertyNames;

/// X window id
pub type Window = u32;

/// Every window property the protocol reads or writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Version,
    User,
    Profile,
    Program,
    Lock,
    CommandLine,
    Response,
    /// ICCCM marker set by the window manager on managed client windows
    WmState,
}

impl Property {
    /// Server-side name of this property under the given naming scheme
    pub fn name<'a>(&self, names: &'a PropertyNames) -> &'a str {
        match self {
            Property::Version => &names.version,
            Property::User => &names.user,
            Property::Profile => &names.profile,
            Property::Program => &names.program,
            Property::Lock => &names.lock,
            Property::CommandLine => &names.command_line,
            Property::Response => &names.response,
            Property::WmState => "WM_STATE",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Property::Version => "version",
            Property::User => "user",
            Property::Profile => "profile",
            Property::Program => "program",
            Property::Lock => "lock",
            Property::CommandLine => "command line",
            Property::Response => "response",
            Property::WmState => "WM_STATE",
        };
        write!(f, "{} property", label)
    }
}

/// Kind of property transition reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyState {
    NewValue,
    Deleted,
}

/// Server events, reduced to what the protocol cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// `property` is `None` for properties outside the protocol
    PropertyChanged {
        window: Window,
        property: Option<Property>,
        state: PropertyState,
    },
    Destroyed { window: Window },
    Other,
}

/// Typed property access plus the few server operations the protocol needs.
///
/// Writes are 8-bit `STRING` values and have completed on the server by the
/// time `set`/`delete` return.
pub trait WindowServer {
    fn root(&self) -> Window;

    /// Direct children of `window`
    fn children(&self, window: Window) -> Result<Vec<Window>>;

    /// `Ok(None)` when the property is not set
    fn get(&self, window: Window, property: Property) -> Result<Option<Vec<u8>>>;

    fn set(&self, window: Window, property: Property, value: &[u8]) -> Result<()>;

    /// Deleting an absent property is not an error
    fn delete(&self, window: Window, property: Property) -> Result<()>;

    /// Start an exclusive section: no other client is served until `ungrab`
    fn grab(&self) -> Result<()>;

    fn ungrab(&self) -> Result<()>;

    /// Round trip to the server so everything sent so far has been processed
    fn sync(&self) -> Result<()>;

    /// Turn property-change and destroy notifications for `window` on or off
    fn select_changes(&self, window: Window, enabled: bool) -> Result<()>;

    /// Block until the next event arrives
    fn next_event(&self) -> Result<ServerEvent>;
}

/// Subscription to property changes and destruction of one window.
///
/// Created before the operation whose effect it has to observe; dropping it
/// unsubscribes.
pub struct Watch<'a, S: WindowServer + ?Sized> {
    server: &'a S,
    window: Window,
}

impl<'a, S: WindowServer + ?Sized> Watch<'a, S> {
    pub fn new(server: &'a S, window: Window) -> Result<Self> {
        server.select_changes(window, true)?;
        debug!("Watching window 0x{:x}", window);
        Ok(Self { server, window })
    }

    pub fn window(&self) -> Window {
        self.window
    }
}

impl<S: WindowServer + ?Sized> Drop for Watch<'_, S> {
    fn drop(&mut self) {
        // Fails harmlessly when the window is already gone
        if let Err(e) = self.server.select_changes(self.window, false) {
            debug!("Failed to stop watching window 0x{:x}: {:#}", self.window, e);
        }
    }
}

/// Server grab held for the lifetime of the value.
///
/// Prefer [`ServerGrab::finish`], which reports ungrab errors; the drop
/// fallback only logs them.
pub struct ServerGrab<'a, S: WindowServer + ?Sized> {
    server: &'a S,
    active: bool,
}

impl<'a, S: WindowServer + ?Sized> ServerGrab<'a, S> {
    pub fn new(server: &'a S) -> Result<Self> {
        server.grab()?;
        Ok(Self { server, active: true })
    }

    /// Ungrab and wait until the server has caught up
    pub fn finish(mut self) -> Result<()> {
        self.active = false;
        self.server.ungrab()?;
        self.server.sync()
    }
}

impl<S: WindowServer + ?Sized> Drop for ServerGrab<'_, S> {
    fn drop(&mut self) {
        if !self.active {
            return;
        }
        if let Err(e) = self.server.ungrab().and_then(|_| self.server.sync()) {
            warn!("Failed to ungrab server: {:#}", e);
        }
    }
}

//! X11 Module
//!
//! [`WindowServer`] on top of an x11rb connection.

pub mod atoms;
pub mod event_source;

use anyhow::{Context, Result};
use std::cell::RefCell;
use std::os::unix::io::AsRawFd;
use tracing::{debug, info, warn};
use x11rb::connection::Connection;
use x11rb::protocol::Event;
use x11rb::protocol::xproto::{
    AtomEnum, ChangeWindowAttributesAux, ConnectionExt as _, EventMask, PropMode,
    Property as XProperty,
};
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

use crate::config::PropertyNames;
use crate::remote::{Property, PropertyState, ServerEvent, Window, WindowServer};
use atoms::Atoms;
use event_source::EventSource;

pub struct X11Server {
    conn: RustConnection,
    root: Window,
    atoms: Atoms,
    source: RefCell<EventSource>,
}

impl X11Server {
    /// Connect to the display named by `$DISPLAY`
    pub fn connect(names: &PropertyNames) -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None)
            .context("Failed to connect to X server")?;

        let root = conn.setup().roots[screen_num].root;
        info!("Connected to X server, screen {}, root window 0x{:x}", screen_num, root);

        let atoms = Atoms::new(&conn, names)?;
        debug!("Atoms: {:?}", atoms);

        let source = EventSource::new(conn.stream().as_raw_fd())?;

        Ok(Self {
            conn,
            root,
            atoms,
            source: RefCell::new(source),
        })
    }

    fn translate(&self, event: Event) -> ServerEvent {
        match event {
            Event::PropertyNotify(e) => ServerEvent::PropertyChanged {
                window: e.window,
                property: self.atoms.property(e.atom),
                state: if e.state == XProperty::DELETE {
                    PropertyState::Deleted
                } else {
                    PropertyState::NewValue
                },
            },
            Event::DestroyNotify(e) => ServerEvent::Destroyed { window: e.window },
            Event::Error(e) => {
                warn!("X11 error: {:?}", e);
                ServerEvent::Other
            }
            _ => ServerEvent::Other,
        }
    }
}

impl WindowServer for X11Server {
    fn root(&self) -> Window {
        self.root
    }

    fn children(&self, window: Window) -> Result<Vec<Window>> {
        Ok(self.conn.query_tree(window)?.reply()?.children)
    }

    fn get(&self, window: Window, property: Property) -> Result<Option<Vec<u8>>> {
        let reply = self
            .conn
            .get_property(
                false,
                window,
                self.atoms.atom(property),
                AtomEnum::ANY,
                0,
                u32::MAX,
            )?
            .reply()?;

        if reply.type_ == u32::from(AtomEnum::NONE) {
            return Ok(None);
        }
        Ok(Some(reply.value))
    }

    fn set(&self, window: Window, property: Property, value: &[u8]) -> Result<()> {
        // Checked, so the write has completed when this returns
        self.conn
            .change_property8(
                PropMode::REPLACE,
                window,
                self.atoms.atom(property),
                AtomEnum::STRING,
                value,
            )?
            .check()?;
        Ok(())
    }

    fn delete(&self, window: Window, property: Property) -> Result<()> {
        self.conn
            .delete_property(window, self.atoms.atom(property))?
            .check()?;
        Ok(())
    }

    fn grab(&self) -> Result<()> {
        self.conn.grab_server()?.check().context("failed to grab server")?;
        Ok(())
    }

    fn ungrab(&self) -> Result<()> {
        self.conn.ungrab_server().context("failed to ungrab server")?;
        self.conn.flush()?;
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        self.conn.get_input_focus()?.reply()?;
        Ok(())
    }

    fn select_changes(&self, window: Window, enabled: bool) -> Result<()> {
        let mask = if enabled {
            EventMask::PROPERTY_CHANGE | EventMask::STRUCTURE_NOTIFY
        } else {
            EventMask::NO_EVENT
        };
        self.conn
            .change_window_attributes(window, &ChangeWindowAttributesAux::new().event_mask(mask))?
            .check()?;
        Ok(())
    }

    fn next_event(&self) -> Result<ServerEvent> {
        loop {
            self.conn.flush()?;
            if let Some(event) = self.conn.poll_for_event()? {
                return Ok(self.translate(event));
            }
            self.source.borrow_mut().wait_readable()?;
        }
    }
}

//! Interned protocol atoms

use anyhow::{Context, Result};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{Atom, ConnectionExt as _};

use crate::config::PropertyNames;
use crate::remote::Property;

/// Holds the interned atom of every protocol property
#[derive(Debug)]
pub struct Atoms {
    pub version: Atom,
    pub user: Atom,
    pub profile: Atom,
    pub program: Atom,
    pub lock: Atom,
    pub command_line: Atom,
    pub response: Atom,
    pub wm_state: Atom,
}

impl Atoms {
    /// Intern all protocol atoms under the given naming scheme
    pub fn new<C: Connection>(conn: &C, names: &PropertyNames) -> Result<Self> {
        let intern = |property: Property| -> Result<Atom> {
            let name = property.name(names);
            Ok(conn
                .intern_atom(false, name.as_bytes())?
                .reply()
                .with_context(|| format!("Failed to intern {}", name))?
                .atom)
        };

        Ok(Self {
            version: intern(Property::Version)?,
            user: intern(Property::User)?,
            profile: intern(Property::Profile)?,
            program: intern(Property::Program)?,
            lock: intern(Property::Lock)?,
            command_line: intern(Property::CommandLine)?,
            response: intern(Property::Response)?,
            wm_state: intern(Property::WmState)?,
        })
    }

    pub fn atom(&self, property: Property) -> Atom {
        match property {
            Property::Version => self.version,
            Property::User => self.user,
            Property::Profile => self.profile,
            Property::Program => self.program,
            Property::Lock => self.lock,
            Property::CommandLine => self.command_line,
            Property::Response => self.response,
            Property::WmState => self.wm_state,
        }
    }

    /// Reverse lookup for incoming property events
    pub fn property(&self, atom: Atom) -> Option<Property> {
        [
            Property::Version,
            Property::User,
            Property::Profile,
            Property::Program,
            Property::Lock,
            Property::CommandLine,
            Property::Response,
            Property::WmState,
        ]
        .into_iter()
        .find(|&property| self.atom(property) == atom)
    }
}

//! Window Matcher
//!
//! Finds the Firefox window for a specific user, profile and program among
//! the top-level windows. The window must advertise exactly
//! [`PROTOCOL_VERSION`].

use anyhow::{Context, Result};
use tracing::debug;

use super::server::{Property, Window, WindowServer};
use super::PROTOCOL_VERSION;
use crate::config::ProfileSuffix;
use crate::error::RemoteError;

/// Identity filters; an empty field matches anything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchCriteria {
    pub user: String,
    pub profile: String,
    pub program: String,
}

/// Find the first top-level window that speaks the protocol and matches
/// `criteria`. Ties go to whichever window the server lists first.
pub fn find_target<S: WindowServer + ?Sized>(
    server: &S,
    criteria: &MatchCriteria,
    suffix: ProfileSuffix,
) -> Result<Window> {
    let mut wrong_version = None;

    let frames = server
        .children(server.root())
        .context("Failed to list top-level windows")?;
    debug!("Scanning {} top-level windows", frames.len());

    for frame in frames {
        // Windows can disappear while we look at them
        let window = match client_window(server, frame) {
            Ok(window) => window,
            Err(e) => {
                debug!("Skipping window 0x{:x}: {:#}", frame, e);
                continue;
            }
        };

        let version = match server.get(window, Property::Version) {
            Ok(Some(version)) => version,
            Ok(None) => continue,
            Err(e) => {
                debug!("Skipping window 0x{:x}: {:#}", window, e);
                continue;
            }
        };
        if version != PROTOCOL_VERSION.as_bytes() {
            let version = String::from_utf8_lossy(&version).into_owned();
            debug!("Window 0x{:x} speaks protocol {}", window, version);
            wrong_version = Some(version);
            continue;
        }

        if identity_matches(server, window, criteria, suffix) {
            debug!("Window 0x{:x} matches {:?}", window, criteria);
            return Ok(window);
        }
    }

    Err(RemoteError::NotFound { wrong_version }.into())
}

/// The real client window beneath a window manager frame: the first child
/// carrying `WM_STATE`, or the window itself when no child has it.
pub fn client_window<S: WindowServer + ?Sized>(server: &S, window: Window) -> Result<Window> {
    for child in server.children(window)? {
        if let Ok(Some(_)) = server.get(child, Property::WmState) {
            return Ok(child);
        }
    }
    Ok(window)
}

fn identity_matches<S: WindowServer + ?Sized>(
    server: &S,
    window: Window,
    criteria: &MatchCriteria,
    suffix: ProfileSuffix,
) -> bool {
    let read = |property: Property| match server.get(window, property) {
        Ok(value) => value.map(|v| String::from_utf8_lossy(&v).into_owned()),
        Err(e) => {
            debug!("Failed to read {} of 0x{:x}: {:#}", property, window, e);
            None
        }
    };

    let plain = |property: Property, filter: &str| {
        filter.is_empty() || read(property).is_some_and(|value| value == filter)
    };

    plain(Property::User, &criteria.user)
        && plain(Property::Program, &criteria.program)
        && (criteria.profile.is_empty()
            || read(Property::Profile)
                .is_some_and(|value| profile_matches(&value, &criteria.profile, suffix)))
}

/// Compare a profile property against a profile filter.
///
/// Besides exact equality, a bare profile name matches a profile property
/// holding an absolute path when the path ends in `.<name>` (older
/// Firefox, `<salt>.<name>` directories) or `/<name>`, as selected by
/// `suffix`.
pub fn profile_matches(value: &str, filter: &str, suffix: ProfileSuffix) -> bool {
    if filter.is_empty() || value == filter {
        return true;
    }
    if !value.starts_with('/') || filter.contains('/') {
        return false;
    }

    let dot = || value.ends_with(&format!(".{}", filter));
    let path = || value.ends_with(&format!("/{}", filter));
    match suffix {
        ProfileSuffix::Exact => false,
        ProfileSuffix::Dot => dot(),
        ProfileSuffix::Path => path(),
        ProfileSuffix::Both => dot() || path(),
    }
}

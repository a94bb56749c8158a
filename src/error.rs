//! Error taxonomy for the remote control protocol
//!
//! These are raised through `anyhow` and recovered with `downcast_ref`
//! wherever a caller needs to tell them apart.

/// Protocol-level failures
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// No window matched; `wrong_version` carries the version of a window
    /// that looked right but spoke another protocol.
    #[error("{}", not_found_message(.wrong_version))]
    NotFound { wrong_version: Option<String> },

    #[error("Firefox window disappeared")]
    TargetVanished,

    #[error("failed to write {property}")]
    PropertyWrite {
        property: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("usage: {0}")]
    MalformedUsage(String),
}

fn not_found_message(wrong_version: &Option<String>) -> String {
    match wrong_version {
        Some(version) => format!(
            "can't find a running Firefox window (found a protocol {} window but no {} one)",
            version,
            crate::remote::PROTOCOL_VERSION
        ),
        None => "can't find a running Firefox window".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_distinguishes_mismatch() {
        let plain = RemoteError::NotFound { wrong_version: None };
        assert_eq!(plain.to_string(), "can't find a running Firefox window");

        let mismatch = RemoteError::NotFound {
            wrong_version: Some("6.0".into()),
        };
        let msg = mismatch.to_string();
        assert!(msg.contains("protocol 6.0"));
        assert!(msg.contains("no 5.1 one"));
    }

    #[test]
    fn test_property_write_keeps_cause() {
        let err: anyhow::Error = RemoteError::PropertyWrite {
            property: "lock property".into(),
            source: anyhow::anyhow!("BadAlloc"),
        }
        .into();
        assert_eq!(err.to_string(), "failed to write lock property");
        assert_eq!(format!("{:#}", err), "failed to write lock property: BadAlloc");
    }
}

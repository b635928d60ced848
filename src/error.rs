//! Error types
//!
//! Errors returned synchronously by the source service. Pipe I/O failures are
//! never surfaced here: they only end the relay for the affected mount.

use std::io;

use thiserror::Error;

use crate::registry::{MountKey, RegistryError};

/// Result type for source service operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for source service operations
#[derive(Debug, Error)]
pub enum Error {
    /// Credentials did not match
    #[error("not authorized")]
    NotAuthorized,

    /// Mount is unknown, or has no active publisher
    #[error("mount not found: {0}")]
    NotFound(MountKey),

    /// Mount already has an active publisher
    #[error("mount in use: {0}")]
    Conflict(MountKey),

    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<RegistryError> for Error {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::MountNotFound(key) | RegistryError::NotPublishing(key) => {
                Error::NotFound(key)
            }
            RegistryError::MountInUse(key) => Error::Conflict(key),
        }
    }
}

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("failed to read config file '{path}': {source}")]
    Io {
        /// Path to the file
        path: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// No mounts configured
    #[error("no mounts configured - at least one mount is required")]
    NoMounts,

    /// Two mounts share an identifier
    #[error("mount '{0}' is configured more than once")]
    DuplicateMount(String),

    /// A request path would resolve to more than one mount
    #[error("mount path '{0}' is ambiguous")]
    DuplicatePath(String),

    /// Mount identifier is empty or contains a path separator
    #[error("invalid mount identifier '{0}'")]
    InvalidMount(String),

    /// A field has a value outside its valid range
    #[error("{section} has invalid {field}: {message}")]
    InvalidValue {
        /// Config section
        section: &'static str,
        /// Field name
        field: &'static str,
        /// Error message
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_mapping() {
        let key = MountKey::new("TEST00AUS0");

        assert!(matches!(
            Error::from(RegistryError::MountNotFound(key.clone())),
            Error::NotFound(_)
        ));
        assert!(matches!(
            Error::from(RegistryError::NotPublishing(key.clone())),
            Error::NotFound(_)
        ));
        assert!(matches!(
            Error::from(RegistryError::MountInUse(key)),
            Error::Conflict(_)
        ));
    }

    #[test]
    fn test_display() {
        let err = Error::Conflict(MountKey::new("TEST00AUS0"));
        assert_eq!(err.to_string(), "mount in use: TEST00AUS0");
        assert_eq!(Error::NotAuthorized.to_string(), "not authorized");
    }
}

//! Mount identity types
//!
//! A mount is the named logical stream a single publisher feeds and any number
//! of subscribers read.

use std::fmt;

/// Unique identifier for a mount (e.g. `TEST00AUS0`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MountKey(String);

impl MountKey {
    /// Create a new mount key
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MountKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A registered mount: identifier plus request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    /// Mount identifier
    pub key: MountKey,
    /// Request path, `/` followed by the identifier unless configured otherwise
    pub path: String,
}

impl Mount {
    /// Create a mount whose path is derived from its identifier
    pub fn new(name: impl Into<String>) -> Self {
        let key = MountKey::new(name);
        let path = format!("/{}", key);
        Self { key, path }
    }

    /// Create a mount with an explicit request path
    pub fn with_path(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            key: MountKey::new(name),
            path: path.into(),
        }
    }

    /// Whether a requested mount name refers to this mount
    ///
    /// Both the bare identifier and the request path are accepted.
    pub fn matches(&self, requested: &str) -> bool {
        self.key.as_str() == requested || self.path == requested
    }
}

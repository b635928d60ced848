//! Caster configuration
//!
//! Everything has a default, so an empty config describes the single test
//! mount `TEST00AUS0` with `username`/`password` credentials. Configs load from
//! TOML:
//!
//! ```toml
//! [[mounts]]
//! name = "TEST00AUS0"
//!
//! [credentials]
//! username = "username"
//! password = "password"
//!
//! [relay]
//! chunk_size = 1024
//! idle_timeout_ms = 1000
//!
//! [registry]
//! channel_capacity = 1
//!
//! [sourcetable]
//! host = "localhost"
//! port = 2101
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::auth::Credentials;
use crate::error::ConfigError;
use crate::registry::{Mount, RegistryConfig};
use crate::relay::RelayConfig;
use crate::sourcetable::SourcetableConfig;

/// Default mount identifier
pub const DEFAULT_MOUNT: &str = "TEST00AUS0";

/// Default username
pub const DEFAULT_USERNAME: &str = "username";

/// Default password
pub const DEFAULT_PASSWORD: &str = "password";

/// One configured mount
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MountConfig {
    /// Mount identifier
    pub name: String,
    /// Request path; defaults to `/<name>`
    #[serde(default)]
    pub path: Option<String>,
}

impl MountConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
        }
    }

    /// Serve the mount under a custom request path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Registry mount for this entry
    pub fn to_mount(&self) -> Mount {
        match self.path {
            Some(ref path) => Mount::with_path(self.name.clone(), path.clone()),
            None => Mount::new(self.name.clone()),
        }
    }
}

/// Credentials accepted on every mount
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub username: String,
    pub password: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            username: DEFAULT_USERNAME.into(),
            password: DEFAULT_PASSWORD.into(),
        }
    }
}

impl From<&CredentialsConfig> for Credentials {
    fn from(config: &CredentialsConfig) -> Self {
        Credentials::new(config.username.clone(), config.password.clone())
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CasterConfig {
    /// Mounts the caster accepts
    pub mounts: Vec<MountConfig>,

    /// Credentials for publishers and subscribers
    pub credentials: CredentialsConfig,

    /// Relay loop settings
    pub relay: RelayConfig,

    /// Registry settings
    pub registry: RegistryConfig,

    /// Caster record advertised in the sourcetable
    pub sourcetable: SourcetableConfig,
}

impl Default for CasterConfig {
    fn default() -> Self {
        Self {
            mounts: vec![MountConfig::new(DEFAULT_MOUNT)],
            credentials: CredentialsConfig::default(),
            relay: RelayConfig::default(),
            registry: RegistryConfig::default(),
            sourcetable: SourcetableConfig::default(),
        }
    }
}

impl CasterConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        contents.parse()
    }

    /// Replace the mount list
    pub fn mounts<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mounts = names.into_iter().map(MountConfig::new).collect();
        self
    }

    /// Add a mount
    pub fn mount(mut self, mount: MountConfig) -> Self {
        self.mounts.push(mount);
        self
    }

    /// Set the accepted credentials
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = CredentialsConfig {
            username: username.into(),
            password: password.into(),
        };
        self
    }

    /// Set relay settings
    pub fn relay(mut self, relay: RelayConfig) -> Self {
        self.relay = relay;
        self
    }

    /// Set registry settings
    pub fn registry(mut self, registry: RegistryConfig) -> Self {
        self.registry = registry;
        self
    }

    /// Set the sourcetable record
    pub fn sourcetable(mut self, sourcetable: SourcetableConfig) -> Self {
        self.sourcetable = sourcetable;
        self
    }

    /// Registry mounts for every configured entry
    pub fn registry_mounts(&self) -> Vec<Mount> {
        self.mounts.iter().map(MountConfig::to_mount).collect()
    }

    /// Validate the configuration
    ///
    /// Checks for:
    /// - At least one mount, with unique non-empty identifiers
    /// - Paths that resolve to exactly one mount
    /// - Non-zero chunk size, pipe capacity, channel capacity and idle timeout
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mounts.is_empty() {
            return Err(ConfigError::NoMounts);
        }

        let mut seen = HashSet::new();
        for mount in &self.mounts {
            if mount.name.is_empty() || mount.name.contains('/') {
                return Err(ConfigError::InvalidMount(mount.name.clone()));
            }
            if !seen.insert(mount.name.as_str()) {
                return Err(ConfigError::DuplicateMount(mount.name.clone()));
            }
        }

        let mut paths = HashSet::new();
        for mount in self.registry_mounts() {
            let shadows_other =
                mount.path != mount.key.as_str() && seen.contains(mount.path.as_str());
            if shadows_other || !paths.insert(mount.path.clone()) {
                return Err(ConfigError::DuplicatePath(mount.path));
            }
        }

        if self.relay.chunk_size == 0 {
            return Err(invalid("relay", "chunk_size", "must be at least 1"));
        }
        if self.relay.pipe_capacity == 0 {
            return Err(invalid("relay", "pipe_capacity", "must be at least 1"));
        }
        if self.relay.idle_timeout.is_zero() {
            return Err(invalid("relay", "idle_timeout_ms", "must be at least 1"));
        }
        if self.registry.channel_capacity == 0 {
            return Err(invalid("registry", "channel_capacity", "must be at least 1"));
        }

        Ok(())
    }
}

impl FromStr for CasterConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: CasterConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

fn invalid(section: &'static str, field: &'static str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        section,
        field,
        message: message.to_string(),
    }
}

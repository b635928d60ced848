//! Credential checks
//!
//! The caster asks an [`Authenticator`] whether a username/password pair may
//! use a mount. [`StaticAuthenticator`] accepts a single configured pair;
//! closures can be plugged in for anything else.

use std::fmt;

use subtle::ConstantTimeEq;

use crate::registry::MountKey;

/// Username/password pair
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Create a credential pair
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Whether `username` and `password` match this pair
    ///
    /// Both fields are always compared, in constant time.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        let user = self.username.as_bytes().ct_eq(username.as_bytes());
        let pass = self.password.as_bytes().ct_eq(password.as_bytes());
        (user & pass).into()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Decides whether a client may publish or subscribe to a mount
pub trait Authenticator: Send + Sync + 'static {
    /// Check credentials for `mount`; no side effects
    fn validate(&self, mount: &str, username: &str, password: &str) -> bool;
}

impl<F> Authenticator for F
where
    F: Fn(&str, &str, &str) -> bool + Send + Sync + 'static,
{
    fn validate(&self, mount: &str, username: &str, password: &str) -> bool {
        self(mount, username, password)
    }
}

/// Accepts one fixed credential pair for every mount
#[derive(Debug, Clone)]
pub struct StaticAuthenticator {
    expected: Credentials,
}

impl StaticAuthenticator {
    pub fn new(expected: Credentials) -> Self {
        Self { expected }
    }
}

impl Authenticator for StaticAuthenticator {
    fn validate(&self, _mount: &str, username: &str, password: &str) -> bool {
        self.expected.matches(username, password)
    }
}

/// Accepts per-mount credential pairs
#[derive(Debug, Clone, Default)]
pub struct MountAuthenticator {
    entries: Vec<(MountKey, Credentials)>,
}

impl MountAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `credentials` on `mount`
    pub fn allow(mut self, mount: impl Into<MountKey>, credentials: Credentials) -> Self {
        self.entries.push((mount.into(), credentials));
        self
    }
}

impl Authenticator for MountAuthenticator {
    fn validate(&self, mount: &str, username: &str, password: &str) -> bool {
        self.entries
            .iter()
            .filter(|(key, _)| key.as_str() == mount)
            .any(|(_, credentials)| credentials.matches(username, password))
    }
}

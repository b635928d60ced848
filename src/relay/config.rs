//! Relay configuration

use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Default maximum bytes per forwarded chunk
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Default idle poll interval
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(1);

/// Stream relay configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Maximum bytes read from the pipe and forwarded as one chunk
    pub chunk_size: usize,

    /// How long one read may stay pending before the relay re-polls
    ///
    /// Expiry never ends the session.
    #[serde(rename = "idle_timeout_ms", deserialize_with = "millis")]
    pub idle_timeout: Duration,

    /// Bytes the publisher may write ahead of the relay before its writes wait
    pub pipe_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            pipe_capacity: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl RelayConfig {
    /// Set the chunk size
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Set the idle timeout
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Set the pipe capacity
    pub fn pipe_capacity(mut self, capacity: usize) -> Self {
        self.pipe_capacity = capacity.max(1);
        self
    }
}

fn millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();

        assert_eq!(config.chunk_size, 1024);
        assert_eq!(config.idle_timeout, Duration::from_secs(1));
        assert_eq!(config.pipe_capacity, 1024);
    }

    #[test]
    fn test_builder_chaining() {
        let config = RelayConfig::default()
            .chunk_size(0)
            .pipe_capacity(4096)
            .idle_timeout(Duration::from_millis(50));

        assert_eq!(config.chunk_size, 1);
        assert_eq!(config.pipe_capacity, 4096);
        assert_eq!(config.idle_timeout, Duration::from_millis(50));
    }
}

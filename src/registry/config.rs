//! Registry configuration

use serde::Deserialize;

/// Default number of chunks buffered per session channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1;

/// Mount registry configuration
///
/// The channel is a hand-off point for back-pressure, not a queue. A larger
/// capacity trades memory and latency for publisher slack; delivery and
/// ordering are the same for any capacity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Chunks buffered in each session's broadcast channel (at least 1)
    pub channel_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl RegistryConfig {
    /// Set the broadcast channel capacity
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(RegistryConfig::default().channel_capacity, 1);
    }

    #[test]
    fn test_capacity_floor() {
        let config = RegistryConfig::default().channel_capacity(0);
        assert_eq!(config.channel_capacity, 1);

        let config = RegistryConfig::default().channel_capacity(16);
        assert_eq!(config.channel_capacity, 16);
    }
}

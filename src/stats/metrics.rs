//! Statistics for relay sessions

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::registry::MountKey;

/// Live counters updated by a relay while it pumps a session
#[derive(Debug, Default)]
pub struct RelayCounters {
    bytes_relayed: AtomicU64,
    chunks_relayed: AtomicU64,
    idle_timeouts: AtomicU64,
}

impl RelayCounters {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one chunk forwarded to subscribers
    pub fn record_chunk(&self, len: usize) {
        self.chunks_relayed.fetch_add(1, Ordering::Relaxed);
        self.bytes_relayed.fetch_add(len as u64, Ordering::Relaxed);
    }

    /// Record one idle timeout tick
    pub fn record_idle_timeout(&self) {
        self.idle_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_relayed(&self) -> u64 {
        self.bytes_relayed.load(Ordering::Relaxed)
    }

    pub fn chunks_relayed(&self) -> u64 {
        self.chunks_relayed.load(Ordering::Relaxed)
    }

    pub fn idle_timeouts(&self) -> u64 {
        self.idle_timeouts.load(Ordering::Relaxed)
    }
}

/// Point-in-time statistics for one publish session
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// Mount being published
    pub mount: MountKey,
    /// Session ID assigned at claim time
    pub session_id: u64,
    /// Attached subscribers
    pub subscribers: usize,
    /// Total bytes forwarded
    pub bytes_relayed: u64,
    /// Total chunks forwarded
    pub chunks_relayed: u64,
    /// Idle timeout ticks seen by the relay
    pub idle_timeouts: u64,
    /// Time since the mount was claimed
    pub duration: Duration,
}

impl SessionStats {
    /// Calculate bitrate in bits per second
    pub fn bitrate(&self) -> u64 {
        let secs = self.duration.as_secs();
        if secs > 0 {
            (self.bytes_relayed * 8) / secs
        } else {
            0
        }
    }

    /// Average chunk size in bytes
    pub fn average_chunk_size(&self) -> u64 {
        if self.chunks_relayed > 0 {
            self.bytes_relayed / self.chunks_relayed
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(bytes: u64, chunks: u64, secs: u64) -> SessionStats {
        SessionStats {
            mount: MountKey::new("TEST00AUS0"),
            session_id: 1,
            subscribers: 0,
            bytes_relayed: bytes,
            chunks_relayed: chunks,
            idle_timeouts: 0,
            duration: Duration::from_secs(secs),
        }
    }

    #[test]
    fn test_counters() {
        let counters = RelayCounters::new();
        counters.record_chunk(10);
        counters.record_chunk(1024);
        counters.record_idle_timeout();

        assert_eq!(counters.chunks_relayed(), 2);
        assert_eq!(counters.bytes_relayed(), 1034);
        assert_eq!(counters.idle_timeouts(), 1);
    }

    #[test]
    fn test_bitrate() {
        assert_eq!(stats(1000, 10, 0).bitrate(), 0);
        assert_eq!(stats(1000, 10, 2).bitrate(), 4000);
    }

    #[test]
    fn test_average_chunk_size() {
        assert_eq!(stats(0, 0, 1).average_chunk_size(), 0);
        assert_eq!(stats(3000, 3, 1).average_chunk_size(), 1000);
    }
}

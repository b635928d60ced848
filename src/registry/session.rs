//! Per-mount publish session
//!
//! A session exists from a successful claim until its relay terminates. It owns
//! the broadcast channel subscribers read from.

use std::sync::Arc;
use std::time::Instant;

use async_broadcast::{InactiveReceiver, Receiver, Sender};
use bytes::Bytes;

use crate::stats::{RelayCounters, SessionStats};

use super::mount::MountKey;
use super::store::MountRegistry;

/// Live state of a mount's active publication
pub struct MountSession {
    id: u64,
    key: MountKey,

    /// Broadcast sender, written only by the relay
    tx: Sender<Bytes>,

    /// Keeps the channel open while no subscriber is attached
    ///
    /// With no active receivers a send waits for one to attach, so chunks are
    /// never dropped for lack of readers.
    rx: InactiveReceiver<Bytes>,

    counters: RelayCounters,
    started_at: Instant,
}

impl MountSession {
    pub(super) fn new(id: u64, key: MountKey, capacity: usize) -> Self {
        let (tx, rx) = async_broadcast::broadcast(capacity.max(1));

        Self {
            id,
            key,
            tx,
            rx: rx.deactivate(),
            counters: RelayCounters::new(),
            started_at: Instant::now(),
        }
    }

    /// Session ID, unique within the registry
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Mount this session publishes
    pub fn key(&self) -> &MountKey {
        &self.key
    }

    /// When the mount was claimed
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Relay counters for this session
    pub fn counters(&self) -> &RelayCounters {
        &self.counters
    }

    /// Attach a new receiver
    ///
    /// The receiver sees every chunk sent after this call, and observes
    /// closure once the session ends.
    pub fn subscribe(&self) -> Receiver<Bytes> {
        self.rx.activate_cloned()
    }

    /// Number of attached subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Send a chunk to all subscribers
    ///
    /// Waits while the channel is full or no subscriber is attached. Returns
    /// `false` if the channel has been closed.
    pub async fn send(&self, chunk: Bytes) -> bool {
        self.tx.broadcast(chunk).await.is_ok()
    }

    /// Whether the channel has been closed
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Close the channel; returns `false` if it was already closed
    pub(super) fn close(&self) -> bool {
        self.tx.close()
    }

    /// Snapshot the session statistics
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            mount: self.key.clone(),
            session_id: self.id,
            subscribers: self.subscriber_count(),
            bytes_relayed: self.counters.bytes_relayed(),
            chunks_relayed: self.counters.chunks_relayed(),
            idle_timeouts: self.counters.idle_timeouts(),
            duration: self.started_at.elapsed(),
        }
    }
}

impl std::fmt::Debug for MountSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountSession")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Exclusive claim on a mount
///
/// Returned by [`MountRegistry::claim`]. Dropping the guard closes the
/// session's channel and frees the mount, exactly once.
pub struct SessionGuard {
    registry: Arc<MountRegistry>,
    session: Arc<MountSession>,
    released: bool,
}

impl SessionGuard {
    pub(super) fn new(registry: Arc<MountRegistry>, session: Arc<MountSession>) -> Self {
        Self {
            registry,
            session,
            released: false,
        }
    }

    /// The claimed session
    pub fn session(&self) -> &Arc<MountSession> {
        &self.session
    }

    /// Close the channel and free the mount now
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if !self.released {
            self.released = true;
            self.registry.release(self.session.key(), self.session.id());
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.release_inner();
    }
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("session", &self.session)
            .field("released", &self.released)
            .finish()
    }
}

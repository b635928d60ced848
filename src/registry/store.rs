//! Mount registry implementation
//!
//! Tracks which mounts exist and which of them currently have a publisher.
//! Claim and release are the only mutations and run under one lock, so a
//! reader never sees a half-claimed or half-released mount.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::stats::SessionStats;

use super::config::RegistryConfig;
use super::error::RegistryError;
use super::mount::{Mount, MountKey};
use super::session::{MountSession, SessionGuard};

/// Claim slot for one mount
struct MountSlot {
    mount: Mount,
    session: Option<Arc<MountSession>>,
}

/// Registry of mounts and their active sessions
///
/// Each registry is independent; build one per caster (or per test).
pub struct MountRegistry {
    /// Map of mount key to claim slot
    mounts: RwLock<HashMap<MountKey, MountSlot>>,

    /// Configuration
    config: RegistryConfig,

    next_session_id: AtomicU64,
}

impl MountRegistry {
    /// Create a registry with default configuration
    pub fn new(mounts: impl IntoIterator<Item = Mount>) -> Self {
        Self::with_config(RegistryConfig::default(), mounts)
    }

    /// Create a registry with custom configuration
    pub fn with_config(config: RegistryConfig, mounts: impl IntoIterator<Item = Mount>) -> Self {
        let mounts = mounts
            .into_iter()
            .map(|mount| {
                (
                    mount.key.clone(),
                    MountSlot {
                        mount,
                        session: None,
                    },
                )
            })
            .collect();

        Self {
            mounts: RwLock::new(mounts),
            config,
            next_session_id: AtomicU64::new(1),
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register an additional mount
    ///
    /// Returns `false` if a mount with the same key already exists.
    pub fn register_mount(&self, mount: Mount) -> bool {
        let mut mounts = self.mounts.write();

        if mounts.contains_key(&mount.key) {
            return false;
        }

        tracing::info!(mount = %mount.key, path = %mount.path, "Mount registered");
        mounts.insert(
            mount.key.clone(),
            MountSlot {
                mount,
                session: None,
            },
        );
        true
    }

    /// Resolve a requested mount name (identifier or path) to its key
    pub fn resolve(&self, requested: &str) -> Option<MountKey> {
        let mounts = self.mounts.read();

        if let Some(slot) = mounts.get(&MountKey::from(requested)) {
            return Some(slot.mount.key.clone());
        }

        // Lowest key wins if paths overlap
        mounts
            .values()
            .filter(|slot| slot.mount.matches(requested))
            .map(|slot| &slot.mount.key)
            .min()
            .cloned()
    }

    /// Get a registered mount
    pub fn mount(&self, key: &MountKey) -> Option<Mount> {
        self.mounts.read().get(key).map(|slot| slot.mount.clone())
    }

    /// All registered mounts, sorted by key
    pub fn mounts(&self) -> Vec<Mount> {
        let mut mounts: Vec<Mount> = self
            .mounts
            .read()
            .values()
            .map(|slot| slot.mount.clone())
            .collect();
        mounts.sort_by(|a, b| a.key.cmp(&b.key));
        mounts
    }

    /// Look up the active session for a mount
    pub fn lookup(&self, key: &MountKey) -> Result<Arc<MountSession>, RegistryError> {
        let mounts = self.mounts.read();

        let slot = mounts
            .get(key)
            .ok_or_else(|| RegistryError::MountNotFound(key.clone()))?;

        match slot.session {
            Some(ref session) if !session.is_closed() => Ok(Arc::clone(session)),
            _ => Err(RegistryError::NotPublishing(key.clone())),
        }
    }

    /// Claim a mount for a new publisher
    ///
    /// Creates a fresh session with its own channel. Fails with
    /// [`RegistryError::MountInUse`] if the mount is already claimed; the
    /// existing session is left untouched.
    pub fn claim(self: &Arc<Self>, key: &MountKey) -> Result<SessionGuard, RegistryError> {
        let mut mounts = self.mounts.write();

        let slot = mounts
            .get_mut(key)
            .ok_or_else(|| RegistryError::MountNotFound(key.clone()))?;

        if let Some(ref existing) = slot.session {
            tracing::debug!(
                mount = %key,
                session_id = existing.id(),
                "Claim rejected: mount in use"
            );
            return Err(RegistryError::MountInUse(key.clone()));
        }

        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        let session = Arc::new(MountSession::new(
            session_id,
            key.clone(),
            self.config.channel_capacity,
        ));
        slot.session = Some(Arc::clone(&session));

        tracing::info!(mount = %key, session_id = session_id, "Mount claimed");

        Ok(SessionGuard::new(Arc::clone(self), session))
    }

    /// Release a mount claimed by `session_id`
    ///
    /// Closes the session's channel and frees the mount in one step. A release
    /// for a session that no longer owns the mount is ignored.
    pub fn release(&self, key: &MountKey, session_id: u64) -> bool {
        let mut mounts = self.mounts.write();

        let Some(slot) = mounts.get_mut(key) else {
            return false;
        };

        let current = slot.session.as_ref().map(|session| session.id());
        if current != Some(session_id) {
            tracing::warn!(
                mount = %key,
                expected = ?current,
                actual = session_id,
                "Release mismatch"
            );
            return false;
        }

        if let Some(session) = slot.session.take() {
            session.close();
            let stats = session.stats();

            tracing::info!(
                mount = %key,
                session_id = session_id,
                bytes = stats.bytes_relayed,
                chunks = stats.chunks_relayed,
                duration_ms = stats.duration.as_millis() as u64,
                "Mount released"
            );
        }
        true
    }

    /// Check if a mount currently has a publisher
    pub fn is_claimed(&self, key: &MountKey) -> bool {
        self.mounts
            .read()
            .get(key)
            .is_some_and(|slot| slot.session.is_some())
    }

    /// Keys of all mounts with an active publisher, sorted
    pub fn active_mounts(&self) -> Vec<MountKey> {
        let mut keys: Vec<MountKey> = self
            .mounts
            .read()
            .values()
            .filter(|slot| slot.session.is_some())
            .map(|slot| slot.mount.key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Get statistics for a mount's active session
    pub fn stats(&self, key: &MountKey) -> Option<SessionStats> {
        self.mounts
            .read()
            .get(key)
            .and_then(|slot| slot.session.as_ref())
            .map(|session| session.stats())
    }

    /// Get total number of registered mounts
    pub fn mount_count(&self) -> usize {
        self.mounts.read().len()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn registry() -> Arc<MountRegistry> {
        Arc::new(MountRegistry::new([Mount::new("TEST00AUS0"), Mount::new("RTCM3")]))
    }

    #[test]
    fn test_claim_conflict() {
        let registry = registry();
        let key = MountKey::new("TEST00AUS0");

        let guard = registry.claim(&key).unwrap();
        assert!(registry.is_claimed(&key));

        let result = registry.claim(&key);
        assert!(matches!(result, Err(RegistryError::MountInUse(_))));

        // The failed claim left the original session in place
        let session = registry.lookup(&key).unwrap();
        assert_eq!(session.id(), guard.session().id());
    }

    #[test]
    fn test_claim_unknown_mount() {
        let registry = registry();
        let key = MountKey::new("NOPE");

        assert_eq!(
            registry.claim(&key).unwrap_err(),
            RegistryError::MountNotFound(key.clone())
        );
        assert_eq!(
            registry.lookup(&key).unwrap_err(),
            RegistryError::MountNotFound(key)
        );
    }

    #[test]
    fn test_lookup_unclaimed() {
        let registry = registry();
        let key = MountKey::new("RTCM3");

        assert_eq!(
            registry.lookup(&key).unwrap_err(),
            RegistryError::NotPublishing(key)
        );
    }

    #[test]
    fn test_guard_drop_releases() {
        let registry = registry();
        let key = MountKey::new("TEST00AUS0");

        let guard = registry.claim(&key).unwrap();
        let session = Arc::clone(guard.session());
        drop(guard);

        assert!(!registry.is_claimed(&key));
        assert!(session.is_closed());
        assert!(registry.claim(&key).is_ok());
    }

    #[test]
    fn test_stale_release_ignored() {
        let registry = registry();
        let key = MountKey::new("TEST00AUS0");

        let first = registry.claim(&key).unwrap();
        let stale_id = first.session().id();
        first.release();

        let second = registry.claim(&key).unwrap();
        assert_ne!(second.session().id(), stale_id);

        // Releasing with the old session id must not free the new session
        assert!(!registry.release(&key, stale_id));
        assert!(registry.is_claimed(&key));
        assert!(!second.session().is_closed());
    }

    #[test]
    fn test_mounts_are_independent() {
        let registry = registry();
        let a = MountKey::new("TEST00AUS0");
        let b = MountKey::new("RTCM3");

        let _guard_a = registry.claim(&a).unwrap();
        let _guard_b = registry.claim(&b).unwrap();

        assert_eq!(registry.active_mounts(), vec![b.clone(), a.clone()]);
    }

    #[test]
    fn test_resolve_by_path() {
        let registry = registry();

        assert_eq!(
            registry.resolve("/TEST00AUS0"),
            Some(MountKey::new("TEST00AUS0"))
        );
        assert_eq!(registry.resolve("RTCM3"), Some(MountKey::new("RTCM3")));
        assert_eq!(registry.resolve("/MISSING"), None);
    }

    #[test]
    fn test_resolve_overlapping_paths() {
        let registry = MountRegistry::new([
            Mount::with_path("B", "/shared"),
            Mount::with_path("A", "/shared"),
        ]);

        for _ in 0..8 {
            assert_eq!(registry.resolve("/shared"), Some(MountKey::new("A")));
        }
    }

    #[test]
    fn test_register_mount() {
        let registry = registry();

        assert!(registry.register_mount(Mount::new("NEW00AUS0")));
        assert!(!registry.register_mount(Mount::new("NEW00AUS0")));
        assert_eq!(registry.mount_count(), 3);
    }

    #[tokio::test]
    async fn test_subscribe_and_send() {
        let registry = registry();
        let key = MountKey::new("TEST00AUS0");

        let guard = registry.claim(&key).unwrap();
        let mut rx = registry.lookup(&key).unwrap().subscribe();

        assert!(guard.session().send(Bytes::from_static(b"RTCM")).await);
        assert_eq!(rx.recv().await.unwrap(), Bytes::from_static(b"RTCM"));

        drop(guard);
        assert!(rx.recv().await.is_err());
    }

    #[test]
    fn test_concurrent_claims() {
        let registry = registry();
        let key = MountKey::new("TEST00AUS0");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let key = key.clone();
                std::thread::spawn(move || registry.claim(&key).ok())
            })
            .collect();

        let guards: Vec<SessionGuard> = handles
            .into_iter()
            .filter_map(|h| h.join().unwrap())
            .collect();

        assert_eq!(guards.len(), 1);
    }
}

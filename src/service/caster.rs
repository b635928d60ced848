//! In-memory caster
//!
//! [`Caster`] implements [`SourceService`] on top of a [`MountRegistry`] and
//! one [`StreamRelay`] per published mount.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::auth::{Authenticator, Credentials, StaticAuthenticator};
use crate::config::CasterConfig;
use crate::error::{Error, Result};
use crate::registry::{MountKey, MountRegistry};
use crate::relay::{pipe, PublisherSink, RelayConfig, StreamRelay};
use crate::stats::SessionStats;

use super::subscription::Subscription;
use super::SourceService;

/// Source service relaying each mount from one publisher to many subscribers
///
/// Publishing spawns a relay task, so [`SourceService::publisher`] must be
/// called from within a tokio runtime.
pub struct Caster {
    registry: Arc<MountRegistry>,
    authenticator: Arc<dyn Authenticator>,
    relay_config: RelayConfig,
    sourcetable: String,
    shutdown: CancellationToken,
}

impl Caster {
    /// Create a caster from a validated configuration
    pub fn new(config: CasterConfig) -> Result<Self> {
        let authenticator = StaticAuthenticator::new(Credentials::from(&config.credentials));
        Self::with_authenticator(config, authenticator)
    }

    /// Create a caster that checks credentials with a custom authenticator
    pub fn with_authenticator<A: Authenticator>(
        config: CasterConfig,
        authenticator: A,
    ) -> Result<Self> {
        config.validate()?;

        let registry = MountRegistry::with_config(config.registry.clone(), config.registry_mounts());

        Ok(Self {
            registry: Arc::new(registry),
            authenticator: Arc::new(authenticator),
            relay_config: config.relay,
            sourcetable: config.sourcetable.to_string(),
            shutdown: CancellationToken::new(),
        })
    }

    /// Get a reference to the mount registry
    pub fn registry(&self) -> &Arc<MountRegistry> {
        &self.registry
    }

    /// A new context tied to this caster's lifetime
    ///
    /// Publishers started with it are also ended by [`Caster::shutdown`].
    pub fn context(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    /// Cancel every context handed out by [`Caster::context`]
    pub fn shutdown(&self) {
        tracing::info!(active = self.registry.active_mounts().len(), "Caster shutting down");
        self.shutdown.cancel();
    }

    /// Statistics for a mount's active session
    pub fn stats(&self, mount: &str) -> Option<SessionStats> {
        let key = self.registry.resolve(mount)?;
        self.registry.stats(&key)
    }

    /// Check credentials, then resolve the mount
    ///
    /// Bad credentials are reported before an unknown mount.
    fn authorize(&self, mount: &str, username: &str, password: &str) -> Result<MountKey> {
        let resolved = self.registry.resolve(mount);
        let name = resolved.as_ref().map_or(mount, MountKey::as_str);

        if !self.authenticator.validate(name, username, password) {
            tracing::warn!(mount = mount, username = username, "Rejected credentials");
            return Err(Error::NotAuthorized);
        }

        resolved.ok_or_else(|| Error::NotFound(MountKey::new(mount)))
    }
}

impl SourceService for Caster {
    fn sourcetable(&self) -> String {
        self.sourcetable.clone()
    }

    fn subscriber(
        &self,
        ctx: &CancellationToken,
        mount: &str,
        username: &str,
        password: &str,
    ) -> Result<Subscription> {
        let key = self.authorize(mount, username, password)?;
        let session = self.registry.lookup(&key)?;

        let subscription = Subscription::new(key, session.id(), session.subscribe(), ctx.clone());

        tracing::info!(
            mount = %subscription.mount(),
            session_id = session.id(),
            subscribers = session.subscriber_count(),
            "Subscriber added"
        );

        Ok(subscription)
    }

    fn publisher(
        &self,
        ctx: &CancellationToken,
        mount: &str,
        username: &str,
        password: &str,
    ) -> Result<PublisherSink> {
        let key = self.authorize(mount, username, password)?;
        let guard = self.registry.claim(&key)?;

        tracing::info!(
            mount = %key,
            session_id = guard.session().id(),
            "Publisher started"
        );

        let (sink, reader) = pipe(key, self.relay_config.pipe_capacity);
        StreamRelay::new(guard, reader, self.relay_config.clone(), ctx.clone()).spawn();

        Ok(sink)
    }
}

#[cfg(test)]
mod tests {
    use std::panic::AssertUnwindSafe;
    use std::time::Duration;

    use bytes::Bytes;
    use tokio::io::AsyncWriteExt;

    use crate::auth::MountAuthenticator;
    use crate::config::MountConfig;

    use super::*;

    fn caster() -> Caster {
        let config = CasterConfig::default()
            .relay(RelayConfig::default().idle_timeout(Duration::from_millis(20)));
        Caster::new(config).unwrap()
    }

    #[test]
    fn test_sourcetable() {
        assert_eq!(
            caster().sourcetable(),
            "CAS;localhost;2101;local;local;0;AUS;-1.0;1.0"
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CasterConfig::default().mounts(Vec::<String>::new());
        assert!(matches!(Caster::new(config), Err(Error::Config(_))));
    }

    #[test]
    fn test_publish_outside_runtime_releases_claim() {
        let caster = caster();
        let ctx = CancellationToken::new();

        let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
            caster.publisher(&ctx, "TEST00AUS0", "username", "password")
        }));

        assert!(result.is_err());
        assert!(!caster.registry().is_claimed(&MountKey::new("TEST00AUS0")));
    }

    #[tokio::test]
    async fn test_publish_by_path() {
        let caster = caster();
        let ctx = CancellationToken::new();

        let sink = caster
            .publisher(&ctx, "/TEST00AUS0", "username", "password")
            .unwrap();
        assert_eq!(sink.mount().as_str(), "TEST00AUS0");

        let sub = caster
            .subscriber(&ctx, "TEST00AUS0", "username", "password")
            .unwrap();
        assert_eq!(sub.mount().as_str(), "TEST00AUS0");
    }

    #[tokio::test]
    async fn test_stats() {
        let caster = caster();
        let ctx = CancellationToken::new();

        assert!(caster.stats("TEST00AUS0").is_none());

        let mut sink = caster
            .publisher(&ctx, "TEST00AUS0", "username", "password")
            .unwrap();
        let mut sub = caster
            .subscriber(&ctx, "TEST00AUS0", "username", "password")
            .unwrap();

        sink.write_all(b"RTCM").await.unwrap();
        assert_eq!(sub.recv().await, Some(Bytes::from_static(b"RTCM")));

        let stats = caster.stats("TEST00AUS0").unwrap();
        assert_eq!(stats.subscribers, 1);
        assert_eq!(stats.bytes_relayed, 4);
        assert_eq!(stats.chunks_relayed, 1);
    }

    #[tokio::test]
    async fn test_shutdown_ends_publishers() {
        let caster = caster();
        let ctx = caster.context();

        let _sink = caster
            .publisher(&ctx, "TEST00AUS0", "username", "password")
            .unwrap();
        let mut sub = caster
            .subscriber(&CancellationToken::new(), "TEST00AUS0", "username", "password")
            .unwrap();

        caster.shutdown();

        let end = tokio::time::timeout(Duration::from_secs(1), sub.recv()).await;
        assert_eq!(end.unwrap(), None);
    }

    #[tokio::test]
    async fn test_subscriber_context_cancel() {
        let caster = caster();
        let ctx = CancellationToken::new();

        let _sink = caster
            .publisher(&ctx, "TEST00AUS0", "username", "password")
            .unwrap();

        let sub_ctx = CancellationToken::new();
        let mut sub = caster
            .subscriber(&sub_ctx, "TEST00AUS0", "username", "password")
            .unwrap();

        sub_ctx.cancel();
        assert_eq!(sub.recv().await, None);

        // Only the subscriber stopped; the mount is still published
        assert!(caster.registry().is_claimed(&MountKey::new("TEST00AUS0")));
    }

    #[tokio::test]
    async fn test_custom_authenticator() {
        let config = CasterConfig::default().mount(MountConfig::new("RTCM3"));
        let auth = MountAuthenticator::new()
            .allow("TEST00AUS0", Credentials::new("alice", "a"))
            .allow("RTCM3", Credentials::new("bob", "b"));
        let caster = Caster::with_authenticator(config, auth).unwrap();
        let ctx = CancellationToken::new();

        assert!(matches!(
            caster.publisher(&ctx, "RTCM3", "alice", "a"),
            Err(Error::NotAuthorized)
        ));
        assert!(caster.publisher(&ctx, "RTCM3", "bob", "b").is_ok());
        assert!(caster.publisher(&ctx, "TEST00AUS0", "alice", "a").is_ok());
    }
}

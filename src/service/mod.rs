//! Source service facade
//!
//! The surface a transport layer drives: list the sourcetable, attach a
//! subscriber to a mount, or claim a mount for a publisher.

pub mod caster;
pub mod subscription;

use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::relay::PublisherSink;

pub use caster::Caster;
pub use subscription::Subscription;

/// Capability every source service provides to the transport layer
pub trait SourceService: Send + Sync {
    /// Pre-formatted sourcetable
    fn sourcetable(&self) -> String;

    /// Attach to a mount's active session
    ///
    /// Fails with `NotAuthorized` on bad credentials and `NotFound` if the
    /// mount is unknown or has no publisher.
    fn subscriber(
        &self,
        ctx: &CancellationToken,
        mount: &str,
        username: &str,
        password: &str,
    ) -> Result<Subscription>;

    /// Claim a mount and start relaying whatever is written to the sink
    ///
    /// Fails with `NotAuthorized`, `NotFound`, or `Conflict` if the mount
    /// already has a publisher. Cancelling `ctx` ends the session.
    ///
    /// # Panics
    ///
    /// Implementations that spawn the relay panic when called outside a tokio
    /// runtime. The claim is released while unwinding.
    fn publisher(
        &self,
        ctx: &CancellationToken,
        mount: &str,
        username: &str,
        password: &str,
    ) -> Result<PublisherSink>;
}

//! In-memory NTRIP caster relay core
//!
//! One publisher per mount, any number of subscribers. A publisher writes raw
//! bytes (typically RTCM) into a [`PublisherSink`]; a relay task drains them
//! in bounded chunks into the mount's broadcast channel, and every
//! [`Subscription`] receives the chunks in order until the publisher goes away.
//!
//! # Architecture
//!
//! ```text
//!                              Caster (SourceService)
//!                 ┌──────────────────────────────────────────┐
//!                 │ authenticator   registry: MountRegistry  │
//!                 │                 ┌──────────────────────┐ │
//!                 │                 │ TEST00AUS0 -> Session│ │
//!                 │                 │ RTCM3      -> (free) │ │
//!                 │                 └──────────────────────┘ │
//!                 └──────┬──────────────────────────┬────────┘
//!                        │ publisher()              │ subscriber()
//!                        ▼                          ▼
//!   PublisherSink ──► StreamRelay ──► broadcast ──► Subscription(s)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use ntrip_rs::{Caster, CasterConfig, SourceService};
//! use tokio::io::AsyncWriteExt;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> ntrip_rs::Result<()> {
//! let caster = Caster::new(CasterConfig::default())?;
//! let ctx = CancellationToken::new();
//!
//! let mut sink = caster.publisher(&ctx, "TEST00AUS0", "username", "password")?;
//! let mut sub = caster.subscriber(&ctx, "TEST00AUS0", "username", "password")?;
//!
//! sink.write_all(b"\xd3\x00\x13").await.ok();
//! drop(sink);
//!
//! while let Some(chunk) = sub.recv().await {
//!     println!("{} bytes", chunk.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod registry;
pub mod relay;
pub mod service;
pub mod sourcetable;
pub mod stats;

pub use auth::{Authenticator, Credentials, MountAuthenticator, StaticAuthenticator};
pub use config::{CasterConfig, CredentialsConfig, MountConfig};
pub use error::{ConfigError, Error, Result};
pub use registry::{Mount, MountKey, MountRegistry, RegistryConfig};
pub use relay::{PublisherSink, RelayConfig, RelayExit};
pub use service::{Caster, SourceService, Subscription};
pub use sourcetable::SourcetableConfig;
pub use stats::SessionStats;

//! Mount registry and session guard
//!
//! The registry knows which mounts exist and which of them have a live
//! publisher. A mount moves between two states:
//!
//! ```text
//!             claim() ──► SessionGuard
//!   ┌──────┐ ─────────────────────────► ┌─────────┐
//!   │ free │                            │ claimed │──► lookup() ──► subscribe()
//!   └──────┘ ◄───────────────────────── └─────────┘
//!             release() / guard dropped
//!             (channel closed first)
//! ```
//!
//! A claim creates a fresh [`MountSession`] holding an `async_broadcast`
//! channel. Every subscriber receives every chunk sent after it attached, and
//! a full channel makes the sender wait, so chunks are never dropped.

pub mod config;
pub mod error;
pub mod mount;
pub mod session;
pub mod store;

pub use config::RegistryConfig;
pub use error::RegistryError;
pub use mount::{Mount, MountKey};
pub use session::{MountSession, SessionGuard};
pub use store::MountRegistry;

//! Stream relay
//!
//! Moves bytes from a publisher's [`PublisherSink`] into its session channel:
//!
//! ```text
//!   PublisherSink ──► duplex pipe ──► read task ──► StreamRelay ──► broadcast ──► Subscription
//!     (write)          (bounded)      (one at a     (race: read /    (bounded,     (recv)
//!                                      time)         idle / cancel)   waits)
//! ```
//!
//! Each loop iteration races the outstanding read against the idle timeout
//! and the session's cancellation token. A timeout only re-polls. EOF, a read
//! error or cancellation ends the loop, after which the channel is closed and
//! the mount released, exactly once.

pub mod config;
pub mod pipe;
pub mod pump;
pub mod race;

pub use config::RelayConfig;
pub use pipe::{pipe, PublisherSink};
pub use pump::{RelayExit, StreamRelay};
pub use race::{race, Outcome};

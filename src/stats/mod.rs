//! Statistics and metrics for relay sessions

pub mod metrics;

pub use metrics::{RelayCounters, SessionStats};

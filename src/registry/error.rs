//! Registry error types

use thiserror::Error;

use super::mount::MountKey;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Mount is not registered
    #[error("mount not found: {0}")]
    MountNotFound(MountKey),

    /// Mount already has an active publisher
    #[error("mount already has a publisher: {0}")]
    MountInUse(MountKey),

    /// Mount is registered but nothing is being published
    #[error("mount has no active publisher: {0}")]
    NotPublishing(MountKey),
}

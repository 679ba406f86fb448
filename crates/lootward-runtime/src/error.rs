//! Lootward runtime — service error types.

use thiserror::Error;

/// Errors returned by [`crate::service::ServiceHandle`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The service task has shut down and no longer accepts requests.
    #[error("protection service has stopped")]
    Stopped,
}

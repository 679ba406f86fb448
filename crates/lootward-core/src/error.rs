//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
///
/// None of these are fatal: callers degrade to "allow the claim" or "skip
/// this render cycle" and log the error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A protection tag could not be parsed.
    #[error("malformed protection tag: {0}")]
    MalformedTag(String),

    /// A tracked object or marker handle no longer refers to a live entity.
    #[error("stale handle: {0}")]
    StaleHandle(String),

    /// The world or region named by a location is not currently available.
    #[error("world not available: {0}")]
    MissingWorld(String),

    /// The host refused to create an entity.
    #[error("spawn rejected: {0}")]
    SpawnRejected(String),

    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Configuration(String),
}

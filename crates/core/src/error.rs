//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid page policy: {0}")]
    InvalidPolicy(String),

    #[error("invalid user kind: {0}")]
    InvalidUserKind(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

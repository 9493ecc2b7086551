//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur while issuing tokens or resolving the current user.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Token failed verification (bad signature, expired, malformed).
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    /// Token could not be signed.
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    /// Repository/database error while loading the token's user.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

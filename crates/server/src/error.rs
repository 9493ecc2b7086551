//! Unified error handling with Sentry integration.
//!
//! Resolvers and the request context builder fail with [`ApiError`]. Each
//! variant maps to one machine-readable `extensions.code` in the GraphQL
//! response; server-side failures are captured to Sentry before the client
//! sees a generic message.

use async_graphql::ErrorExtensions;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;

/// Error surfaced by the GraphQL API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A guarded operation was called without an authenticated user.
    #[error("Not authenticated")]
    Unauthenticated,

    /// The record the operation targets does not exist.
    #[error("{message}")]
    NotFound {
        message: String,
        invalid_args: String,
    },

    /// The input was rejected, either by validation or by a store constraint.
    #[error("{message}")]
    ValidationFailed {
        message: String,
        invalid_args: String,
        cause: Option<String>,
    },

    /// Login failed. The message never says which part was wrong.
    #[error("Wrong credentials")]
    CredentialMismatch,

    /// The bearer token failed verification.
    #[error("Invalid token")]
    TokenInvalid,

    /// Store or signing failure. Details stay server-side.
    #[error("Internal server error")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
    /// Machine-readable code placed in `extensions.code`.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::ValidationFailed { .. } => "BAD_USER_INPUT",
            Self::CredentialMismatch => "INVALID_CREDENTIALS",
            Self::TokenInvalid => "INVALID_TOKEN",
            Self::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Build a `NotFound` error for the named argument.
    pub fn not_found(message: &str, invalid_args: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.to_owned(),
            invalid_args: invalid_args.into(),
        }
    }

    /// Build a `ValidationFailed` error for the named argument.
    pub fn validation(
        message: &str,
        invalid_args: impl Into<String>,
        cause: impl ToString,
    ) -> Self {
        Self::ValidationFailed {
            message: message.to_owned(),
            invalid_args: invalid_args.into(),
            cause: Some(cause.to_string()),
        }
    }

    /// Report server-side failures to the log and to Sentry.
    pub(crate) fn report(&self) {
        if let Self::Internal(source) = self {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %source,
                sentry_event_id = %event_id,
                "Request error"
            );
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        Self::Internal(Box::new(err))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken(_) => Self::TokenInvalid,
            other => Self::Internal(Box::new(other)),
        }
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        self.report();

        async_graphql::Error::new(self.to_string()).extend_with(|_, e| {
            e.set("code", self.code());
            match self {
                Self::NotFound { invalid_args, .. } => {
                    e.set("invalidArgs", invalid_args.as_str());
                }
                Self::ValidationFailed {
                    invalid_args,
                    cause,
                    ..
                } => {
                    e.set("invalidArgs", invalid_args.as_str());
                    if let Some(cause) = cause {
                        e.set("error", cause.as_str());
                    }
                }
                _ => {}
            }
        })
    }
}

/// Set the Sentry user context for the current request.
///
/// Call this after the bearer token resolves to a user.
pub fn set_sentry_user(user_id: &impl ToString, username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: Some(username.to_owned()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_graphql::Value;

    use super::*;

    fn extension(err: &async_graphql::Error, key: &str) -> Option<Value> {
        err.extensions.as_ref().and_then(|ext| ext.get(key).cloned())
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(ApiError::Unauthenticated.to_string(), "Not authenticated");
        assert_eq!(ApiError::CredentialMismatch.to_string(), "Wrong credentials");
        assert_eq!(
            ApiError::not_found("Saving number failed", "Nobody").to_string(),
            "Saving number failed"
        );
    }

    #[test]
    fn test_api_error_codes_are_distinct() {
        let errors = [
            ApiError::Unauthenticated,
            ApiError::not_found("x", "y"),
            ApiError::validation("x", "y", "z"),
            ApiError::CredentialMismatch,
            ApiError::TokenInvalid,
            ApiError::from(RepositoryError::NotFound),
        ];

        let mut codes: Vec<_> = errors.iter().map(ApiError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_extend_sets_code_and_invalid_args() {
        let err = ApiError::validation("Saving person failed", "Bob", "name must be unique").extend();

        assert_eq!(err.message, "Saving person failed");
        assert_eq!(
            extension(&err, "code"),
            Some(Value::from("BAD_USER_INPUT"))
        );
        assert_eq!(extension(&err, "invalidArgs"), Some(Value::from("Bob")));
        assert_eq!(
            extension(&err, "error"),
            Some(Value::from("name must be unique"))
        );
    }

    #[test]
    fn test_internal_error_hides_details() {
        let err = ApiError::from(RepositoryError::DataCorruption("bad row".to_string())).extend();

        assert_eq!(err.message, "Internal server error");
        assert_eq!(
            extension(&err, "code"),
            Some(Value::from("INTERNAL_SERVER_ERROR"))
        );
        assert_eq!(extension(&err, "error"), None);
    }

    #[test]
    fn test_invalid_token_maps_to_token_invalid() {
        let jwt_err = jsonwebtoken::errors::Error::from(
            jsonwebtoken::errors::ErrorKind::InvalidToken,
        );
        let err = ApiError::from(AuthError::InvalidToken(jwt_err));
        assert!(matches!(err, ApiError::TokenInvalid));
    }
}

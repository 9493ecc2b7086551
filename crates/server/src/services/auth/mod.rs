//! Token authentication service.
//!
//! Issues HS256-signed tokens carrying `{username, id}` and turns an
//! `Authorization` header back into the user it names.

mod error;

pub use error::AuthError;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use phonebook_core::UserId;

use crate::config::AuthConfig;
use crate::db::PhonebookStore;
use crate::models::User;

/// Authorization scheme prefix, matched case-insensitively.
pub const BEARER_PREFIX: &str = "bearer ";

/// Payload of an issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username at the time the token was issued.
    pub username: String,
    /// ID of the user the token was issued to.
    pub id: UserId,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Signs and verifies tokens with a shared secret.
///
/// Cheaply cloneable; the keys live behind an `Arc`.
#[derive(Clone)]
pub struct TokenService {
    inner: Arc<TokenKeys>,
}

struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenService {
    /// Create a token service from configuration.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);

        Self {
            inner: Arc::new(TokenKeys {
                encoding: EncodingKey::from_secret(secret),
                decoding: DecodingKey::from_secret(secret),
                validation,
                ttl_secs: i64::try_from(config.token_ttl.as_secs()).unwrap_or(i64::MAX),
            }),
        }
    }

    /// Issue a token for a user, valid from now.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Signing` if the token cannot be encoded.
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        self.issue_at(user, Utc::now())
    }

    /// Issue a token for a user as if it were `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Signing` if the token cannot be encoded.
    pub fn issue_at(&self, user: &User, issued_at: DateTime<Utc>) -> Result<String, AuthError> {
        let iat = issued_at.timestamp();
        let claims = Claims {
            username: user.username.as_str().to_owned(),
            id: user.id,
            iat,
            exp: iat.saturating_add(self.inner.ttl_secs),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.inner.encoding)
            .map_err(AuthError::Signing)
    }

    /// Verify a token's signature and expiry and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if verification fails.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(
            token.trim(),
            &self.inner.decoding,
            &self.inner.validation,
        )?;
        Ok(data.claims)
    }
}

/// Extract the token from an `Authorization` header value.
///
/// Returns `None` unless the value starts with `bearer ` in any letter case.
#[must_use]
pub fn bearer_token(authorization: &str) -> Option<&str> {
    let scheme = authorization.get(..BEARER_PREFIX.len())?;
    if scheme.eq_ignore_ascii_case(BEARER_PREFIX) {
        authorization.get(BEARER_PREFIX.len()..)
    } else {
        None
    }
}

/// Resolve the user a request acts as.
///
/// - No header, or a header without the bearer scheme: no user, no error.
/// - A bearer token that fails verification: `AuthError::InvalidToken`.
/// - A valid token whose user no longer exists: no user.
///
/// # Errors
///
/// Returns `AuthError::InvalidToken` for tokens that fail verification and
/// `AuthError::Repository` if the user lookup fails.
pub async fn resolve_current_user(
    store: &dyn PhonebookStore,
    tokens: &TokenService,
    authorization: Option<&str>,
) -> Result<Option<User>, AuthError> {
    let Some(token) = authorization.and_then(bearer_token) else {
        return Ok(None);
    };

    let claims = tokens.verify(token)?;
    let user = store.find_user_by_id(claims.id).await?;
    if user.is_none() {
        tracing::debug!(user_id = %claims.id, "token names a user that no longer exists");
    }

    Ok(user)
}

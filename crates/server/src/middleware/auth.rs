//! Bearer token authentication extractor.
//!
//! Resolves the `Authorization` header into the user the request acts as,
//! once per request and before the GraphQL executor runs.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::{ApiError, set_sentry_user};
use crate::models::User;
use crate::services::auth::resolve_current_user;
use crate::state::AppState;

/// Extractor for the authenticated user, if any.
///
/// A missing header, a non-bearer scheme, or a token for a deleted user all
/// yield `CurrentUser(None)`. Only a bearer token that fails verification
/// rejects the request.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentUser(user): CurrentUser) -> impl IntoResponse {
///     match user {
///         Some(u) => format!("Hello, {}!", u.username),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<User>);

/// Rejection for requests whose context could not be built.
///
/// Rendered as a GraphQL-shaped error body so clients parse it like any
/// other failure.
#[derive(Debug)]
pub struct AuthRejection(pub ApiError);

impl AuthRejection {
    const fn status(&self) -> StatusCode {
        match self.0 {
            ApiError::TokenInvalid => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        self.0.report();

        let body = json!({
            "data": null,
            "errors": [{
                "message": self.0.to_string(),
                "extensions": { "code": self.0.code() },
            }],
        });

        (self.status(), Json(body)).into_response()
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let authorization = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let user = resolve_current_user(state.store().as_ref(), state.tokens(), authorization)
            .await
            .map_err(|e| AuthRejection(e.into()))?;

        if let Some(user) = &user {
            set_sentry_user(&user.id, user.username.as_str());
        }

        Ok(Self(user))
    }
}

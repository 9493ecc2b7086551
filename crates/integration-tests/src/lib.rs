//! Integration tests for the phonebook API.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests against the in-memory store
//! cargo test -p phonebook-integration-tests
//!
//! # Include the PostgreSQL tests
//! TEST_DATABASE_URL=postgres://localhost/phonebook_test \
//!     cargo test -p phonebook-integration-tests -- --include-ignored
//! ```
//!
//! Requests are driven through the full router with `tower::ServiceExt::oneshot`,
//! so no port is bound.

#![allow(clippy::missing_panics_doc)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use phonebook_server::config::{AuthConfig, LogFormat, PhonebookConfig, StoreKind};
use phonebook_server::db::{MemoryStore, SharedStore};
use phonebook_server::routes;
use phonebook_server::services::phonebook::LOGIN_PASSWORD;
use phonebook_server::state::AppState;

/// High-entropy signing secret used by every test app.
pub const TEST_JWT_SECRET: &str = "kQ8#vN2$wE5@tR9!yU3%iO7^pA1&sD6*";

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Configuration for an in-process test server.
#[must_use]
pub fn test_config(store: StoreKind) -> PhonebookConfig {
    PhonebookConfig {
        database_url: None,
        host: std::net::IpAddr::from([127, 0, 0, 1]),
        port: 0,
        auth: AuthConfig {
            jwt_secret: SecretString::from(TEST_JWT_SECRET),
            token_ttl: Duration::from_secs(3600),
        },
        store,
        log_format: LogFormat::Pretty,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// A response as the tests see it.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Parse the body as JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("response body is not JSON")
    }

    /// `extensions.code` of the first GraphQL error, if any.
    #[must_use]
    pub fn error_code(&self) -> Option<String> {
        self.json()["errors"][0]["extensions"]["code"]
            .as_str()
            .map(String::from)
    }

    /// `message` of the first GraphQL error, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.json()["errors"][0]["message"]
            .as_str()
            .map(String::from)
    }
}

/// The full application router over a chosen store.
#[derive(Clone)]
pub struct TestApp {
    router: Router,
    state: AppState,
}

impl TestApp {
    /// App backed by a fresh in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), StoreKind::Memory)
    }

    /// App backed by the given store.
    #[must_use]
    pub fn with_store(store: SharedStore, kind: StoreKind) -> Self {
        let state = AppState::new(test_config(kind), store);
        Self {
            router: routes::router(state.clone()),
            state,
        }
    }

    /// Shared application state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Send a raw request through the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), MAX_BODY_BYTES)
            .await
            .expect("failed to read body");

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// `GET` a path.
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(
            Request::get(uri)
                .body(Body::empty())
                .expect("valid request"),
        )
        .await
    }

    /// `POST` a GraphQL document with an optional raw `Authorization` header.
    pub async fn graphql_with_header(
        &self,
        query: &str,
        variables: Value,
        authorization: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::post("/graphql").header(header::CONTENT_TYPE, "application/json");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }

        let body = json!({ "query": query, "variables": variables }).to_string();
        self.send(builder.body(Body::from(body)).expect("valid request"))
            .await
    }

    /// `POST` a GraphQL document, authenticated with `token` if given.
    pub async fn graphql(&self, query: &str, variables: Value, token: Option<&str>) -> TestResponse {
        let authorization = token.map(|t| format!("Bearer {t}"));
        self.graphql_with_header(query, variables, authorization.as_deref())
            .await
    }

    /// Create a user and log in as it, returning the token.
    pub async fn sign_up(&self, username: &str) -> String {
        let created = self
            .graphql(
                "mutation($u: String!) { createUser(username: $u) { id } }",
                json!({ "u": username }),
                None,
            )
            .await;
        assert!(created.json()["errors"].is_null(), "{}", created.body);

        let login = self
            .graphql(
                "mutation($u: String!, $p: String!) { login(username: $u, password: $p) { value } }",
                json!({ "u": username, "p": LOGIN_PASSWORD }),
                None,
            )
            .await;

        login.json()["data"]["login"]["value"]
            .as_str()
            .expect("login returned no token")
            .to_owned()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /               - GraphiQL playground
//! POST /               - GraphQL endpoint
//! GET  /graphql        - GraphiQL playground
//! POST /graphql        - GraphQL endpoint
//! GET  /health         - Liveness check
//! GET  /health/ready   - Readiness check (store reachable)
//! ```

pub mod graphql;
pub mod health;

use std::time::Duration;

use axum::{Router, middleware::from_fn, routing::get};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the GraphQL routes.
pub fn graphql_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(graphql::graphiql).post(graphql::graphql_handler))
        .route(
            "/graphql",
            get(graphql::graphiql).post(graphql::graphql_handler),
        )
}

/// Create the health check routes.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

/// Build the full application router with tracing and request IDs.
///
/// Sentry layers are added by the binary so tests can run without a client.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(graphql_routes())
        .merge(health_routes())
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

//! HTTP middleware and extractors.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, outermost)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//!
//! The bearer token is resolved per request by the [`CurrentUser`] extractor.

pub mod auth;
pub mod request_id;

pub use auth::{AuthRejection, CurrentUser};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};

//! Business logic services.
//!
//! Services sit between the GraphQL resolvers and the store. They validate
//! input, enforce authorization, and translate store failures into
//! [`crate::error::ApiError`].

pub mod auth;
pub mod phonebook;

pub use auth::{AuthError, TokenService};
pub use phonebook::PhonebookService;

//! GraphQL schema for the phonebook API.
//!
//! The schema carries the process-wide [`SharedStore`] and [`TokenService`]
//! as schema data. Each request adds a [`RequestContext`] holding the user
//! its bearer token resolved to.

mod mutation;
mod query;
pub mod types;

use async_graphql::{Context, EmptySubscription, Schema};

pub use mutation::MutationRoot;
pub use query::QueryRoot;

use crate::db::SharedStore;
use crate::models::User;
use crate::services::{PhonebookService, TokenService};

/// The phonebook schema type.
pub type PhonebookSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Per-request context, built once before any resolver runs.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// The authenticated user, if the request carried a valid bearer token
    /// for a user that still exists.
    pub current_user: Option<User>,
}

/// Build the schema with its shared dependencies.
#[must_use]
pub fn build_schema(store: SharedStore, tokens: TokenService) -> PhonebookSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(store)
        .data(tokens)
        .finish()
}

/// Construct the service for a resolver from schema data.
fn service<'a>(ctx: &Context<'a>) -> async_graphql::Result<PhonebookService<'a>> {
    let store = ctx.data::<SharedStore>()?;
    let tokens = ctx.data::<TokenService>()?;
    Ok(PhonebookService::new(store.as_ref(), tokens))
}

/// The user the request acts as, if any.
fn current_user<'a>(ctx: &Context<'a>) -> Option<&'a User> {
    ctx.data_opt::<RequestContext>()
        .and_then(|request| request.current_user.as_ref())
}

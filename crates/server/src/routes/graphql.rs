//! GraphQL endpoint and playground.

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    response::{Html, IntoResponse},
};

use crate::graphql::RequestContext;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Execute a GraphQL request as the user its bearer token names.
pub async fn graphql_handler(
    State(state): State<AppState>,
    CurrentUser(current_user): CurrentUser,
    req: GraphQLRequest,
) -> GraphQLResponse {
    state
        .schema()
        .execute(req.into_inner().data(RequestContext { current_user }))
        .await
        .into()
}

/// Serve the GraphiQL playground.
pub async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

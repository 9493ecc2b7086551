//! Query resolvers.

use async_graphql::{Context, ErrorExtensions, Object, Result};

use super::types::{PersonObject, UserObject, YesNo};
use super::{current_user, service};

/// Root of all read operations.
#[derive(Debug, Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Total number of persons.
    async fn person_count(&self, ctx: &Context<'_>) -> Result<i32> {
        service(ctx)?.person_count().await.map_err(|e| e.extend())
    }

    /// Persons, optionally filtered on whether a phone number is recorded.
    async fn all_persons(
        &self,
        ctx: &Context<'_>,
        phone: Option<YesNo>,
    ) -> Result<Vec<PersonObject>> {
        let persons = service(ctx)?
            .all_persons(phone.into())
            .await
            .map_err(|e| e.extend())?;
        Ok(persons.into_iter().map(PersonObject).collect())
    }

    /// Exact-match lookup by name.
    async fn find_person(&self, ctx: &Context<'_>, name: String) -> Result<Option<PersonObject>> {
        let person = service(ctx)?
            .find_person(&name)
            .await
            .map_err(|e| e.extend())?;
        Ok(person.map(PersonObject))
    }

    /// The authenticated user, or null.
    async fn me(&self, ctx: &Context<'_>) -> Option<UserObject> {
        current_user(ctx).cloned().map(UserObject)
    }
}

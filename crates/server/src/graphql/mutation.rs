//! Mutation resolvers.

use async_graphql::{Context, ErrorExtensions, Object, Result};

use super::types::{PersonObject, Token, UserObject};
use super::{current_user, service};

/// Root of all write operations.
#[derive(Debug, Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Create a person and add it to the caller's friends. Requires a token.
    async fn add_person(
        &self,
        ctx: &Context<'_>,
        name: String,
        phone: Option<String>,
        street: String,
        city: String,
    ) -> Result<Option<PersonObject>> {
        let person = service(ctx)?
            .add_person(current_user(ctx), &name, phone, street, city)
            .await
            .map_err(|e| e.extend())?;
        Ok(Some(PersonObject(person)))
    }

    /// Set the phone number of an existing person.
    async fn edit_number(
        &self,
        ctx: &Context<'_>,
        name: String,
        phone: String,
    ) -> Result<Option<PersonObject>> {
        let person = service(ctx)?
            .edit_number(&name, &phone)
            .await
            .map_err(|e| e.extend())?;
        Ok(Some(PersonObject(person)))
    }

    /// Create a user with no friends.
    async fn create_user(&self, ctx: &Context<'_>, username: String) -> Result<Option<UserObject>> {
        let user = service(ctx)?
            .create_user(&username)
            .await
            .map_err(|e| e.extend())?;
        Ok(Some(UserObject(user)))
    }

    /// Exchange credentials for a bearer token.
    async fn login(
        &self,
        ctx: &Context<'_>,
        username: String,
        password: String,
    ) -> Result<Option<Token>> {
        let value = service(ctx)?
            .login(&username, &password)
            .await
            .map_err(|e| e.extend())?;
        Ok(Some(Token { value }))
    }

    /// Add an existing person to the caller's friends. Requires a token.
    async fn add_as_friend(&self, ctx: &Context<'_>, name: String) -> Result<Option<UserObject>> {
        let user = service(ctx)?
            .add_as_friend(current_user(ctx), &name)
            .await
            .map_err(|e| e.extend())?;
        Ok(Some(UserObject(user)))
    }
}

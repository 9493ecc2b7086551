//! User repository for database operations.
//!
//! Users are always returned with their friends expanded into full persons,
//! ordered by when they were befriended.

use sqlx::{PgExecutor, PgPool};

use phonebook_core::{PersonId, UserId, Username};

use super::RepositoryError;
use super::persons::PersonRow;
use crate::models::{Person, User};

/// Internal row type for database queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username
            FROM phonebook.app_user
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(self.expand(r).await?)),
            None => Ok(None),
        }
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username
            FROM phonebook.app_user
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(self.expand(r).await?)),
            None => Ok(None),
        }
    }

    /// Create a new user with no friends.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, username: &Username) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO phonebook.app_user (username)
            VALUES ($1)
            RETURNING id, username
            ",
        )
        .bind(username)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "username must be unique"))?;

        Ok(User {
            id: UserId::new(row.id),
            username: parse_username(&row.username)?,
            friends: Vec::new(),
        })
    }

    /// Append a person to a user's friends.
    ///
    /// # Returns
    ///
    /// Returns `true` if the person was appended, `false` if already a friend.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user or person doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add_friend(
        &self,
        user_id: UserId,
        person_id: PersonId,
    ) -> Result<bool, RepositoryError> {
        add_friend(self.pool, user_id, person_id).await
    }

    async fn expand(&self, row: UserRow) -> Result<User, RepositoryError> {
        let friends = sqlx::query_as::<_, PersonRow>(
            r"
            SELECT p.id, p.name, p.phone, p.street, p.city
            FROM phonebook.user_friend f
            JOIN phonebook.person p ON p.id = f.person_id
            WHERE f.user_id = $1
            ORDER BY f.position ASC
            ",
        )
        .bind(row.id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(TryInto::try_into)
        .collect::<Result<Vec<Person>, _>>()?;

        Ok(User {
            id: UserId::new(row.id),
            username: parse_username(&row.username)?,
            friends,
        })
    }
}

/// Append a friend using any executor, so callers can run it inside a transaction.
///
/// The primary key on `(user_id, person_id)` makes this idempotent.
pub(crate) async fn add_friend<'e>(
    executor: impl PgExecutor<'e>,
    user_id: UserId,
    person_id: PersonId,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        r"
        INSERT INTO phonebook.user_friend (user_id, person_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, person_id) DO NOTHING
        ",
    )
    .bind(user_id)
    .bind(person_id)
    .execute(executor)
    .await
    .map_err(|e| RepositoryError::from_write(e, "friend already added"))?;

    Ok(result.rows_affected() > 0)
}

fn parse_username(raw: &str) -> Result<Username, RepositoryError> {
    Username::parse(raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid username in database: {e}")))
}

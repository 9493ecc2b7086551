//! Store access for the phonebook.
//!
//! # Store contract
//!
//! Two logical collections plus the ordered friend relation between them:
//!
//! - `persons` - phonebook entries, `name` unique
//! - `users` - API users, `username` unique
//! - `user_friends` - ordered references from a user to persons (shared, not owned)
//!
//! [`PhonebookStore`] is the seam the resolvers talk to. [`PgStore`] is the
//! production implementation; [`MemoryStore`] keeps everything in process and
//! backs tests and `PHONEBOOK_STORE=memory` development runs.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p phonebook-cli -- migrate
//! ```

pub mod memory;
pub mod persons;
pub mod postgres;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use phonebook_core::{PersonId, PersonName, UserId, Username};

use crate::models::{NewPerson, Person, PhoneFilter, User};

pub use memory::MemoryStore;
pub use persons::PersonRepository;
pub use postgres::PgStore;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate name).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a sqlx error from a write, turning constraint violations into
    /// `Conflict`/`NotFound` so callers can tell them apart from outages.
    pub(crate) fn from_write(err: sqlx::Error, conflict: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return Self::Conflict(conflict.to_owned());
            }
            if db_err.is_foreign_key_violation() {
                return Self::NotFound;
            }
        }
        Self::Database(err)
    }
}

/// Persistence operations the resolver layer depends on.
#[async_trait]
pub trait PhonebookStore: Send + Sync {
    /// Total number of persons.
    async fn count_persons(&self) -> Result<i64, RepositoryError>;

    /// All persons passing `filter`, in insertion order.
    async fn list_persons(&self, filter: PhoneFilter) -> Result<Vec<Person>, RepositoryError>;

    /// Exact-match lookup by name.
    async fn find_person_by_name(
        &self,
        name: &PersonName,
    ) -> Result<Option<Person>, RepositoryError>;

    /// Insert a person that nobody has befriended yet.
    ///
    /// Returns `Conflict` if the name is taken.
    async fn insert_person(&self, person: &NewPerson) -> Result<Person, RepositoryError>;

    /// Insert a person and append it to the user's friends as one atomic write.
    ///
    /// Returns `Conflict` if the name is taken and `NotFound` if the user is gone;
    /// in both cases nothing is stored.
    async fn insert_person_for_user(
        &self,
        user_id: UserId,
        person: &NewPerson,
    ) -> Result<Person, RepositoryError>;

    /// Set the phone number of the person with this name.
    ///
    /// Returns `NotFound` if no such person exists.
    async fn update_phone(
        &self,
        name: &PersonName,
        phone: &str,
    ) -> Result<Person, RepositoryError>;

    /// Create a user with no friends.
    ///
    /// Returns `Conflict` if the username is taken.
    async fn create_user(&self, username: &Username) -> Result<User, RepositoryError>;

    /// Look up a user by username, friends expanded.
    async fn find_user_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, RepositoryError>;

    /// Look up a user by ID, friends expanded.
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Append a person to a user's friends unless already present.
    ///
    /// Returns whether the person was appended. Returns `NotFound` if either
    /// side does not exist.
    async fn add_friend(&self, user_id: UserId, person_id: PersonId)
    -> Result<bool, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Process-wide store handle shared by every request.
pub type SharedStore = Arc<dyn PhonebookStore>;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// The pool connects lazily, so a database that is down at startup does not
/// prevent the server from starting; the first query reports the failure.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection string cannot be parsed.
pub fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect_lazy(database_url.expose_secret())
}

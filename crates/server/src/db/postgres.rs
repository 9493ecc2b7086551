//! `PostgreSQL`-backed [`PhonebookStore`].

use async_trait::async_trait;
use sqlx::PgPool;

use phonebook_core::{PersonId, PersonName, UserId, Username};

use super::{PersonRepository, PhonebookStore, RepositoryError, UserRepository, persons, users};
use crate::models::{NewPerson, Person, PhoneFilter, User};

/// Store backed by a `PostgreSQL` connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    const fn persons(&self) -> PersonRepository<'_> {
        PersonRepository::new(&self.pool)
    }

    const fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.pool)
    }
}

#[async_trait]
impl PhonebookStore for PgStore {
    async fn count_persons(&self) -> Result<i64, RepositoryError> {
        self.persons().count().await
    }

    async fn list_persons(&self, filter: PhoneFilter) -> Result<Vec<Person>, RepositoryError> {
        self.persons().list(filter).await
    }

    async fn find_person_by_name(
        &self,
        name: &PersonName,
    ) -> Result<Option<Person>, RepositoryError> {
        self.persons().get_by_name(name).await
    }

    async fn insert_person(&self, person: &NewPerson) -> Result<Person, RepositoryError> {
        self.persons().create(person).await
    }

    async fn insert_person_for_user(
        &self,
        user_id: UserId,
        person: &NewPerson,
    ) -> Result<Person, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let created = persons::insert(&mut *tx, person).await?;
        users::add_friend(&mut *tx, user_id, created.id).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn update_phone(
        &self,
        name: &PersonName,
        phone: &str,
    ) -> Result<Person, RepositoryError> {
        self.persons().update_phone(name, phone).await
    }

    async fn create_user(&self, username: &Username) -> Result<User, RepositoryError> {
        self.users().create(username).await
    }

    async fn find_user_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, RepositoryError> {
        self.users().get_by_username(username).await
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.users().get_by_id(id).await
    }

    async fn add_friend(
        &self,
        user_id: UserId,
        person_id: PersonId,
    ) -> Result<bool, RepositoryError> {
        self.users().add_friend(user_id, person_id).await
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

//! Person repository for database operations.
//!
//! Queries are checked at runtime and decoded through [`PersonRow`], which is
//! converted into the validated [`Person`] domain type.

use sqlx::{PgExecutor, PgPool};

use phonebook_core::{PersonId, PersonName};

use super::RepositoryError;
use crate::models::{NewPerson, Person, PhoneFilter};

/// Internal row type for database queries.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PersonRow {
    id: i32,
    name: String,
    phone: Option<String>,
    street: String,
    city: String,
}

impl TryFrom<PersonRow> for Person {
    type Error = RepositoryError;

    fn try_from(row: PersonRow) -> Result<Self, Self::Error> {
        let name = PersonName::parse(&row.name).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid person name in database: {e}"))
        })?;

        Ok(Self {
            id: PersonId::new(row.id),
            name,
            phone: row.phone,
            street: row.street,
            city: row.city,
        })
    }
}

/// Repository for person database operations.
pub struct PersonRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PersonRepository<'a> {
    /// Create a new person repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Count all persons.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM phonebook.person")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// List persons matching the phone filter, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored name is invalid.
    pub async fn list(&self, filter: PhoneFilter) -> Result<Vec<Person>, RepositoryError> {
        let has_phone = match filter {
            PhoneFilter::Any => None,
            PhoneFilter::WithPhone => Some(true),
            PhoneFilter::WithoutPhone => Some(false),
        };

        let rows = sqlx::query_as::<_, PersonRow>(
            r"
            SELECT id, name, phone, street, city
            FROM phonebook.person
            WHERE $1::BOOLEAN IS NULL OR (phone IS NOT NULL) = $1
            ORDER BY id ASC
            ",
        )
        .bind(has_phone)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a person by exact name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_name(&self, name: &PersonName) -> Result<Option<Person>, RepositoryError> {
        let row = sqlx::query_as::<_, PersonRow>(
            r"
            SELECT id, name, phone, street, city
            FROM phonebook.person
            WHERE name = $1
            ",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Insert a new person.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, person: &NewPerson) -> Result<Person, RepositoryError> {
        insert(self.pool, person).await
    }

    /// Set the phone number of a person.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the person doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_phone(
        &self,
        name: &PersonName,
        phone: &str,
    ) -> Result<Person, RepositoryError> {
        let row = sqlx::query_as::<_, PersonRow>(
            r"
            UPDATE phonebook.person
            SET phone = $1, updated_at = NOW()
            WHERE name = $2
            RETURNING id, name, phone, street, city
            ",
        )
        .bind(phone)
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }
}

/// Insert a person using any executor, so callers can run it inside a transaction.
pub(crate) async fn insert<'e>(
    executor: impl PgExecutor<'e>,
    person: &NewPerson,
) -> Result<Person, RepositoryError> {
    let row = sqlx::query_as::<_, PersonRow>(
        r"
        INSERT INTO phonebook.person (name, phone, street, city)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, phone, street, city
        ",
    )
    .bind(&person.name)
    .bind(person.phone.as_deref())
    .bind(&person.street)
    .bind(&person.city)
    .fetch_one(executor)
    .await
    .map_err(|e| RepositoryError::from_write(e, "name must be unique"))?;

    row.try_into()
}

//! Seed the phonebook with sample persons.
//!
//! Persons are inserted without any user befriending them. Names that
//! already exist are skipped, so the command can be run repeatedly.

use phonebook_core::PersonName;
use phonebook_server::db::{self, PgStore, PhonebookStore, RepositoryError};
use phonebook_server::models::NewPerson;
use tracing::info;

use super::database_url;

/// A sample person: name, phone, street, city.
type SamplePerson = (&'static str, Option<&'static str>, &'static str, &'static str);

const SAMPLE_PERSONS: &[SamplePerson] = &[
    ("Arto Hellas", Some("040-123543"), "Tapiolankatu 5 A", "Espoo"),
    ("Matti Luukkainen", Some("040-432342"), "Malminkaari 10 A", "Helsinki"),
    ("Venla Ruuska", None, "Nallemäentie 22 C", "Helsinki"),
];

/// Outcome of a seed run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub inserted: usize,
    pub skipped: usize,
}

/// Build the sample persons.
///
/// # Errors
///
/// Returns an error if a sample name fails validation.
pub fn sample_persons() -> Result<Vec<NewPerson>, phonebook_core::NameError> {
    SAMPLE_PERSONS
        .iter()
        .map(|(name, phone, street, city)| {
            Ok(NewPerson {
                name: PersonName::parse(name)?,
                phone: phone.map(String::from),
                street: (*street).to_string(),
                city: (*city).to_string(),
            })
        })
        .collect()
}

/// Insert the sample persons into any store.
///
/// # Errors
///
/// Returns `RepositoryError` for failures other than a duplicate name.
pub async fn seed_store(
    store: &dyn PhonebookStore,
    persons: &[NewPerson],
) -> Result<SeedSummary, RepositoryError> {
    let mut summary = SeedSummary::default();

    for person in persons {
        match store.insert_person(person).await {
            Ok(created) => {
                info!(id = %created.id, name = %created.name, "Inserted person");
                summary.inserted += 1;
            }
            Err(RepositoryError::Conflict(_)) => {
                info!(name = %person.name, "Person already exists, skipping");
                summary.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(summary)
}

/// Seed the configured database.
///
/// # Errors
///
/// Returns an error if the URL is missing or the database rejects a write.
pub async fn run() -> Result<SeedSummary, Box<dyn std::error::Error>> {
    let database_url = database_url()?;
    let pool = db::create_pool(&database_url)?;
    let store = PgStore::new(pool);

    let persons = sample_persons()?;
    Ok(seed_store(&store, &persons).await?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use phonebook_server::db::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_seed_is_repeatable() {
        let store = MemoryStore::new();
        let persons = sample_persons().unwrap();

        let first = seed_store(&store, &persons).await.unwrap();
        assert_eq!(first, SeedSummary { inserted: 3, skipped: 0 });

        let second = seed_store(&store, &persons).await.unwrap();
        assert_eq!(second, SeedSummary { inserted: 0, skipped: 3 });

        assert_eq!(store.count_persons().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_seed_keeps_missing_phone_absent() {
        let store = MemoryStore::new();
        seed_store(&store, &sample_persons().unwrap()).await.unwrap();

        let venla = store
            .find_person_by_name(&PersonName::parse("Venla Ruuska").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(venla.phone, None);
    }
}

//! Phonebook operations behind the GraphQL API.

use phonebook_core::{PersonName, Username};
use tracing::instrument;

use crate::db::{PhonebookStore, RepositoryError};
use crate::error::ApiError;
use crate::models::{NewPerson, Person, PhoneFilter, User};
use crate::services::auth::TokenService;

/// The one password `login` accepts. Users have no stored credentials.
pub const LOGIN_PASSWORD: &str = "secret";

const SAVE_PERSON_FAILED: &str = "Saving person failed";
const SAVE_NUMBER_FAILED: &str = "Saving number failed";
const CREATE_USER_FAILED: &str = "Creating user failed";

/// Service for phonebook queries and mutations.
///
/// Borrows the shared store and token service for the duration of a request.
pub struct PhonebookService<'a> {
    store: &'a dyn PhonebookStore,
    tokens: &'a TokenService,
}

impl<'a> PhonebookService<'a> {
    /// Create a new phonebook service.
    #[must_use]
    pub const fn new(store: &'a dyn PhonebookStore, tokens: &'a TokenService) -> Self {
        Self { store, tokens }
    }

    /// Number of persons in the phonebook.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if the store fails.
    pub async fn person_count(&self) -> Result<i32, ApiError> {
        let count = self.store.count_persons().await?;
        Ok(i32::try_from(count).unwrap_or(i32::MAX))
    }

    /// All persons passing the phone filter.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if the store fails.
    pub async fn all_persons(&self, filter: PhoneFilter) -> Result<Vec<Person>, ApiError> {
        Ok(self.store.list_persons(filter).await?)
    }

    /// Exact-match lookup. A name no person could have finds nothing.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if the store fails.
    pub async fn find_person(&self, name: &str) -> Result<Option<Person>, ApiError> {
        let Some(name) = lookup_name(name) else {
            return Ok(None);
        };
        Ok(self.store.find_person_by_name(&name).await?)
    }

    /// Create a person and befriend it on behalf of the current user.
    ///
    /// # Errors
    ///
    /// - `ApiError::Unauthenticated` if there is no current user, or it no
    ///   longer exists.
    /// - `ApiError::ValidationFailed` if the name is invalid or taken.
    /// - `ApiError::Internal` if the store fails.
    #[instrument(skip(self, current, phone, street, city))]
    pub async fn add_person(
        &self,
        current: Option<&User>,
        name: &str,
        phone: Option<String>,
        street: String,
        city: String,
    ) -> Result<Person, ApiError> {
        let user = current.ok_or(ApiError::Unauthenticated)?;

        let new_person = NewPerson {
            name: PersonName::parse(name)
                .map_err(|e| ApiError::validation(SAVE_PERSON_FAILED, name, e))?,
            phone,
            street,
            city,
        };

        let person = match self.store.insert_person_for_user(user.id, &new_person).await {
            Ok(person) => person,
            Err(RepositoryError::Conflict(cause)) => {
                return Err(ApiError::validation(SAVE_PERSON_FAILED, name, cause));
            }
            Err(RepositoryError::NotFound) => return Err(ApiError::Unauthenticated),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            person_id = %person.id,
            user_id = %user.id,
            "person added"
        );

        Ok(person)
    }

    /// Set a person's phone number.
    ///
    /// # Errors
    ///
    /// - `ApiError::NotFound` if no person has this name.
    /// - `ApiError::Internal` if the store fails.
    pub async fn edit_number(&self, name: &str, phone: &str) -> Result<Person, ApiError> {
        let parsed =
            lookup_name(name).ok_or_else(|| ApiError::not_found(SAVE_NUMBER_FAILED, name))?;

        match self.store.update_phone(&parsed, phone).await {
            Ok(person) => Ok(person),
            Err(RepositoryError::NotFound) => Err(ApiError::not_found(SAVE_NUMBER_FAILED, name)),
            Err(e) => Err(e.into()),
        }
    }

    /// Create a user with no friends.
    ///
    /// # Errors
    ///
    /// - `ApiError::ValidationFailed` if the username is invalid or taken.
    /// - `ApiError::Internal` if the store fails.
    pub async fn create_user(&self, username: &str) -> Result<User, ApiError> {
        let parsed = Username::parse(username)
            .map_err(|e| ApiError::validation(CREATE_USER_FAILED, username, e))?;

        let user = match self.store.create_user(&parsed).await {
            Ok(user) => user,
            Err(RepositoryError::Conflict(cause)) => {
                return Err(ApiError::validation(CREATE_USER_FAILED, username, cause));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(user_id = %user.id, "user created");
        Ok(user)
    }

    /// Check credentials and issue a signed token.
    ///
    /// Unknown user and wrong password fail with the same error.
    ///
    /// # Errors
    ///
    /// - `ApiError::CredentialMismatch` if the credentials are wrong.
    /// - `ApiError::Internal` if the store or signing fails.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let user = match Username::parse(username) {
            Ok(parsed) => self.store.find_user_by_username(&parsed).await?,
            Err(_) => None,
        };

        let Some(user) = user.filter(|_| password == LOGIN_PASSWORD) else {
            tracing::warn!("login failed");
            return Err(ApiError::CredentialMismatch);
        };

        let token = self.tokens.issue(&user)?;
        tracing::info!(user_id = %user.id, "login succeeded");
        Ok(token)
    }

    /// Befriend an existing person on behalf of the current user.
    ///
    /// Befriending someone twice leaves a single entry.
    ///
    /// # Errors
    ///
    /// - `ApiError::Unauthenticated` if there is no current user, or it no
    ///   longer exists.
    /// - `ApiError::NotFound` if no person has this name.
    /// - `ApiError::Internal` if the store fails.
    pub async fn add_as_friend(&self, current: Option<&User>, name: &str) -> Result<User, ApiError> {
        let user = current.ok_or(ApiError::Unauthenticated)?;

        let person = match lookup_name(name) {
            Some(parsed) => self.store.find_person_by_name(&parsed).await?,
            None => None,
        }
        .ok_or_else(|| ApiError::not_found("Person not found", name))?;

        if !user.has_friend(person.id) {
            match self.store.add_friend(user.id, person.id).await {
                Ok(added) => {
                    if added {
                        tracing::info!(person_id = %person.id, user_id = %user.id, "friend added");
                    }
                }
                Err(RepositoryError::NotFound) => return Err(ApiError::Unauthenticated),
                Err(e) => return Err(e.into()),
            }
        }

        self.store
            .find_user_by_id(user.id)
            .await?
            .ok_or(ApiError::Unauthenticated)
    }
}

/// Parse a name for an exact-match lookup.
///
/// Stored names are trimmed, so a name with surrounding whitespace can never
/// match one and is not normalized here.
fn lookup_name(name: &str) -> Option<PersonName> {
    PersonName::parse(name).ok().filter(|parsed| parsed.as_str() == name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;

    use super::*;
    use crate::config::AuthConfig;
    use crate::db::MemoryStore;

    fn tokens() -> TokenService {
        TokenService::new(&AuthConfig {
            jwt_secret: SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6"),
            token_ttl: Duration::from_secs(3600),
        })
    }

    async fn add(service: &PhonebookService<'_>, user: &User, name: &str, phone: Option<&str>) {
        service
            .add_person(
                Some(user),
                name,
                phone.map(String::from),
                "Main St".to_string(),
                "Metropolis".to_string(),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_add_person_requires_user() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let service = PhonebookService::new(&store, &tokens);

        let err = service
            .add_person(None, "Bob", None, "Main St".to_string(), "Metropolis".to_string())
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Unauthenticated));
        assert_eq!(service.person_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_add_person_befriends_creator() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let service = PhonebookService::new(&store, &tokens);
        let alice = service.create_user("alice").await.unwrap();

        add(&service, &alice, "Bob", None).await;

        let alice = store.find_user_by_id(alice.id).await.unwrap().unwrap();
        assert_eq!(alice.friends.len(), 1);
        assert_eq!(alice.friends[0].name.as_str(), "Bob");
        assert!(service.find_person("Bob").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_add_person_duplicate_name() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let service = PhonebookService::new(&store, &tokens);
        let alice = service.create_user("alice").await.unwrap();
        add(&service, &alice, "Bob", None).await;

        let err = service
            .add_person(Some(&alice), "Bob", None, "x".to_string(), "y".to_string())
            .await
            .unwrap_err();

        match err {
            ApiError::ValidationFailed {
                message,
                invalid_args,
                ..
            } => {
                assert_eq!(message, "Saving person failed");
                assert_eq!(invalid_args, "Bob");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(service.person_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_all_persons_filters_on_phone() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let service = PhonebookService::new(&store, &tokens);
        let alice = service.create_user("alice").await.unwrap();
        add(&service, &alice, "Arto Hellas", Some("040-123543")).await;
        add(&service, &alice, "Venla Ruuska", None).await;

        let with = service.all_persons(PhoneFilter::WithPhone).await.unwrap();
        assert!(with.iter().all(Person::has_phone));
        assert_eq!(with.len(), 1);

        let without = service.all_persons(PhoneFilter::WithoutPhone).await.unwrap();
        assert!(without.iter().all(|p| !p.has_phone()));
        assert_eq!(without.len(), 1);

        assert_eq!(service.all_persons(PhoneFilter::Any).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_find_person_missing_is_none() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let service = PhonebookService::new(&store, &tokens);

        assert!(service.find_person("Nobody").await.unwrap().is_none());
        assert!(service.find_person("   ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_person_is_read_only() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let service = PhonebookService::new(&store, &tokens);
        let alice = service.create_user("alice").await.unwrap();
        add(&service, &alice, "Bob", Some("555-0100")).await;

        let first = service.find_person("Bob").await.unwrap().unwrap();
        let second = service.find_person("Bob").await.unwrap().unwrap();

        assert_eq!(first, second);
        assert_eq!(service.person_count().await.unwrap(), 1);
        let alice = store.find_user_by_id(alice.id).await.unwrap().unwrap();
        assert_eq!(alice.friends.len(), 1);
    }

    #[tokio::test]
    async fn test_lookups_do_not_trim_names() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let service = PhonebookService::new(&store, &tokens);
        let alice = service.create_user("alice").await.unwrap();
        let bob = service.create_user("bob").await.unwrap();
        add(&service, &alice, "Carol", None).await;

        assert!(service.find_person(" Carol ").await.unwrap().is_none());
        assert!(service.find_person("Carol").await.unwrap().is_some());
        assert!(matches!(
            service.edit_number("Carol ", "123").await.unwrap_err(),
            ApiError::NotFound { .. }
        ));
        assert!(matches!(
            service.add_as_friend(Some(&bob), " Carol").await.unwrap_err(),
            ApiError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_edit_number_accepts_empty_phone() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let service = PhonebookService::new(&store, &tokens);
        let alice = service.create_user("alice").await.unwrap();
        add(&service, &alice, "Bob", None).await;

        let updated = service.edit_number("Bob", "").await.unwrap();
        assert_eq!(updated.phone.as_deref(), Some(""));

        let with = service.all_persons(PhoneFilter::WithPhone).await.unwrap();
        assert_eq!(with.len(), 1);
        assert_eq!(with[0].name.as_str(), "Bob");
    }

    #[tokio::test]
    async fn test_edit_number_round_trip() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let service = PhonebookService::new(&store, &tokens);
        let alice = service.create_user("alice").await.unwrap();
        add(&service, &alice, "Bob", None).await;

        let updated = service.edit_number("Bob", "555-0100").await.unwrap();
        assert_eq!(updated.phone.as_deref(), Some("555-0100"));

        let found = service.find_person("Bob").await.unwrap().unwrap();
        assert_eq!(found.phone.as_deref(), Some("555-0100"));
    }

    #[tokio::test]
    async fn test_edit_number_missing_person_fails() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let service = PhonebookService::new(&store, &tokens);

        let err = service.edit_number("NoSuchPerson", "123").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
        assert_eq!(err.to_string(), "Saving number failed");
    }

    #[tokio::test]
    async fn test_create_user_duplicate() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let service = PhonebookService::new(&store, &tokens);
        service.create_user("alice").await.unwrap();

        let err = service.create_user("alice").await.unwrap_err();
        assert!(matches!(err, ApiError::ValidationFailed { .. }));
        assert_eq!(err.to_string(), "Creating user failed");
    }

    #[tokio::test]
    async fn test_login_errors_are_uniform() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let service = PhonebookService::new(&store, &tokens);
        service.create_user("alice").await.unwrap();

        let wrong_password = service.login("alice", "hunter2").await.unwrap_err();
        let unknown_user = service.login("mallory", LOGIN_PASSWORD).await.unwrap_err();

        assert!(matches!(wrong_password, ApiError::CredentialMismatch));
        assert!(matches!(unknown_user, ApiError::CredentialMismatch));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn test_login_issues_token_for_user() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let service = PhonebookService::new(&store, &tokens);
        let alice = service.create_user("alice").await.unwrap();

        let token = service.login("alice", LOGIN_PASSWORD).await.unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.id, alice.id);
        assert_eq!(claims.username, "alice");
    }

    #[tokio::test]
    async fn test_add_as_friend_is_idempotent() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let service = PhonebookService::new(&store, &tokens);
        let alice = service.create_user("alice").await.unwrap();
        let bob = service.create_user("bob").await.unwrap();
        add(&service, &alice, "Carol", None).await;

        let once = service.add_as_friend(Some(&bob), "Carol").await.unwrap();
        let twice = service.add_as_friend(Some(&once), "Carol").await.unwrap();

        assert_eq!(twice.friends.len(), 1);
        assert_eq!(twice.friends[0].name.as_str(), "Carol");
    }

    #[tokio::test]
    async fn test_add_as_friend_with_stale_user_view() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let service = PhonebookService::new(&store, &tokens);
        let alice = service.create_user("alice").await.unwrap();
        add(&service, &alice, "Carol", None).await;

        // `alice` was loaded before Carol was added, so the store decides.
        let updated = service.add_as_friend(Some(&alice), "Carol").await.unwrap();
        assert_eq!(updated.friends.len(), 1);
    }

    #[tokio::test]
    async fn test_add_as_friend_errors() {
        let store = MemoryStore::new();
        let tokens = tokens();
        let service = PhonebookService::new(&store, &tokens);
        let alice = service.create_user("alice").await.unwrap();

        assert!(matches!(
            service.add_as_friend(None, "Carol").await.unwrap_err(),
            ApiError::Unauthenticated
        ));
        assert!(matches!(
            service.add_as_friend(Some(&alice), "Carol").await.unwrap_err(),
            ApiError::NotFound { .. }
        ));
    }
}

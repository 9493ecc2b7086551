//! In-process [`PhonebookStore`].
//!
//! Holds everything behind one lock, so each operation is atomic on its own
//! and multi-record writes are never observed half done. Enforces the same
//! uniqueness rules as the database schema.

use async_trait::async_trait;
use tokio::sync::RwLock;

use phonebook_core::{PersonId, PersonName, UserId, Username};

use super::{PhonebookStore, RepositoryError};
use crate::models::{NewPerson, Person, PhoneFilter, User};

#[derive(Debug)]
struct StoredUser {
    id: UserId,
    username: Username,
    friend_ids: Vec<PersonId>,
}

#[derive(Debug, Default)]
struct MemoryData {
    persons: Vec<Person>,
    users: Vec<StoredUser>,
    next_person_id: i32,
    next_user_id: i32,
}

impl MemoryData {
    fn person(&self, id: PersonId) -> Option<&Person> {
        self.persons.iter().find(|p| p.id == id)
    }

    fn user_mut(&mut self, id: UserId) -> Option<&mut StoredUser> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    fn expand(&self, user: &StoredUser) -> User {
        User {
            id: user.id,
            username: user.username.clone(),
            friends: user
                .friend_ids
                .iter()
                .filter_map(|id| self.person(*id).cloned())
                .collect(),
        }
    }

    fn insert_person(&mut self, person: &NewPerson) -> Result<Person, RepositoryError> {
        if self.persons.iter().any(|p| p.name == person.name) {
            return Err(RepositoryError::Conflict("name must be unique".to_owned()));
        }

        self.next_person_id += 1;
        let created = Person {
            id: PersonId::new(self.next_person_id),
            name: person.name.clone(),
            phone: person.phone.clone(),
            street: person.street.clone(),
            city: person.city.clone(),
        };
        self.persons.push(created.clone());
        Ok(created)
    }
}

/// Store that keeps all records in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<MemoryData>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PhonebookStore for MemoryStore {
    async fn count_persons(&self) -> Result<i64, RepositoryError> {
        let data = self.data.read().await;
        i64::try_from(data.persons.len())
            .map_err(|e| RepositoryError::DataCorruption(format!("person count overflow: {e}")))
    }

    async fn list_persons(&self, filter: PhoneFilter) -> Result<Vec<Person>, RepositoryError> {
        let data = self.data.read().await;
        Ok(data
            .persons
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn find_person_by_name(
        &self,
        name: &PersonName,
    ) -> Result<Option<Person>, RepositoryError> {
        let data = self.data.read().await;
        Ok(data.persons.iter().find(|p| &p.name == name).cloned())
    }

    async fn insert_person(&self, person: &NewPerson) -> Result<Person, RepositoryError> {
        self.data.write().await.insert_person(person)
    }

    async fn insert_person_for_user(
        &self,
        user_id: UserId,
        person: &NewPerson,
    ) -> Result<Person, RepositoryError> {
        let mut data = self.data.write().await;
        if !data.users.iter().any(|u| u.id == user_id) {
            return Err(RepositoryError::NotFound);
        }

        let created = data.insert_person(person)?;
        if let Some(user) = data.user_mut(user_id) {
            user.friend_ids.push(created.id);
        }
        Ok(created)
    }

    async fn update_phone(
        &self,
        name: &PersonName,
        phone: &str,
    ) -> Result<Person, RepositoryError> {
        let mut data = self.data.write().await;
        let person = data
            .persons
            .iter_mut()
            .find(|p| &p.name == name)
            .ok_or(RepositoryError::NotFound)?;

        person.phone = Some(phone.to_owned());
        Ok(person.clone())
    }

    async fn create_user(&self, username: &Username) -> Result<User, RepositoryError> {
        let mut data = self.data.write().await;
        if data.users.iter().any(|u| &u.username == username) {
            return Err(RepositoryError::Conflict(
                "username must be unique".to_owned(),
            ));
        }

        data.next_user_id += 1;
        let id = UserId::new(data.next_user_id);
        data.users.push(StoredUser {
            id,
            username: username.clone(),
            friend_ids: Vec::new(),
        });

        Ok(User {
            id,
            username: username.clone(),
            friends: Vec::new(),
        })
    }

    async fn find_user_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, RepositoryError> {
        let data = self.data.read().await;
        Ok(data
            .users
            .iter()
            .find(|u| &u.username == username)
            .map(|u| data.expand(u)))
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let data = self.data.read().await;
        Ok(data
            .users
            .iter()
            .find(|u| u.id == id)
            .map(|u| data.expand(u)))
    }

    async fn add_friend(
        &self,
        user_id: UserId,
        person_id: PersonId,
    ) -> Result<bool, RepositoryError> {
        let mut data = self.data.write().await;
        if data.person(person_id).is_none() {
            return Err(RepositoryError::NotFound);
        }

        let user = data.user_mut(user_id).ok_or(RepositoryError::NotFound)?;
        if user.friend_ids.contains(&person_id) {
            return Ok(false);
        }
        user.friend_ids.push(person_id);
        Ok(true)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_person(name: &str, phone: Option<&str>) -> NewPerson {
        NewPerson {
            name: PersonName::parse(name).unwrap(),
            phone: phone.map(String::from),
            street: "Main St".to_string(),
            city: "Metropolis".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_person_rejects_duplicate_name() {
        let store = MemoryStore::new();
        store.insert_person(&new_person("Bob", None)).await.unwrap();

        let err = store
            .insert_person(&new_person("Bob", Some("123")))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(store.count_persons().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_person_for_missing_user_stores_nothing() {
        let store = MemoryStore::new();

        let err = store
            .insert_person_for_user(UserId::new(99), &new_person("Bob", None))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
        assert_eq!(store.count_persons().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_person_for_user_appends_friend() {
        let store = MemoryStore::new();
        let user = store
            .create_user(&Username::parse("alice").unwrap())
            .await
            .unwrap();

        let bob = store
            .insert_person_for_user(user.id, &new_person("Bob", None))
            .await
            .unwrap();

        let user = store.find_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(user.friends, vec![bob]);
    }

    #[tokio::test]
    async fn test_add_friend_is_idempotent() {
        let store = MemoryStore::new();
        let user = store
            .create_user(&Username::parse("alice").unwrap())
            .await
            .unwrap();
        let bob = store.insert_person(&new_person("Bob", None)).await.unwrap();

        assert!(store.add_friend(user.id, bob.id).await.unwrap());
        assert!(!store.add_friend(user.id, bob.id).await.unwrap());

        let user = store.find_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(user.friends.len(), 1);
    }

    #[tokio::test]
    async fn test_friends_keep_insertion_order() {
        let store = MemoryStore::new();
        let user = store
            .create_user(&Username::parse("alice").unwrap())
            .await
            .unwrap();
        let first = store.insert_person(&new_person("Zed", None)).await.unwrap();
        let second = store.insert_person(&new_person("Amy", None)).await.unwrap();

        store.add_friend(user.id, first.id).await.unwrap();
        store.add_friend(user.id, second.id).await.unwrap();

        let user = store.find_user_by_id(user.id).await.unwrap().unwrap();
        let names: Vec<_> = user.friends.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Zed", "Amy"]);
    }

    #[tokio::test]
    async fn test_update_phone_missing_person() {
        let store = MemoryStore::new();
        let err = store
            .update_phone(&PersonName::parse("NoSuchPerson").unwrap(), "123")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_update_phone_is_visible_through_friends() {
        let store = MemoryStore::new();
        let user = store
            .create_user(&Username::parse("alice").unwrap())
            .await
            .unwrap();
        store
            .insert_person_for_user(user.id, &new_person("Bob", None))
            .await
            .unwrap();

        store
            .update_phone(&PersonName::parse("Bob").unwrap(), "555-0100")
            .await
            .unwrap();

        let user = store.find_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(user.friends[0].phone.as_deref(), Some("555-0100"));
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicate_username() {
        let store = MemoryStore::new();
        let username = Username::parse("alice").unwrap();
        store.create_user(&username).await.unwrap();

        let err = store.create_user(&username).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }
}

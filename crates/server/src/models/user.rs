//! User domain types.

use phonebook_core::{PersonId, UserId, Username};

use super::Person;

/// A phonebook user with their friends expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Store-assigned ID.
    pub id: UserId,
    /// Unique login name.
    pub username: Username,
    /// Persons this user has befriended, in the order they were added.
    pub friends: Vec<Person>,
}

impl User {
    /// Returns true if the person is already among this user's friends.
    ///
    /// Compares by ID, never by name.
    #[must_use]
    pub fn has_friend(&self, person_id: PersonId) -> bool {
        self.friends.iter().any(|f| f.id == person_id)
    }
}

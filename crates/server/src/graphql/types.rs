//! GraphQL output types.
//!
//! Thin wrappers over the domain models, so the schema shape stays separate
//! from how records are stored.

use async_graphql::{Enum, ID, Object, SimpleObject};

use crate::models::{Address, Person, PhoneFilter, User};

/// Filter selector on phone presence.
#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum YesNo {
    Yes,
    No,
}

impl From<Option<YesNo>> for PhoneFilter {
    fn from(value: Option<YesNo>) -> Self {
        match value {
            None => Self::Any,
            Some(YesNo::Yes) => Self::WithPhone,
            Some(YesNo::No) => Self::WithoutPhone,
        }
    }
}

/// A phonebook entry.
pub struct PersonObject(pub Person);

#[Object(name = "Person")]
impl PersonObject {
    async fn name(&self) -> &str {
        self.0.name.as_str()
    }

    async fn phone(&self) -> Option<&str> {
        self.0.phone.as_deref()
    }

    /// Street and city, projected at read time.
    async fn address(&self) -> AddressObject {
        AddressObject::from(self.0.address())
    }

    async fn city(&self) -> &str {
        &self.0.city
    }

    async fn id(&self) -> ID {
        ID(self.0.id.to_string())
    }
}

impl From<Person> for PersonObject {
    fn from(person: Person) -> Self {
        Self(person)
    }
}

#[derive(SimpleObject)]
#[graphql(name = "Address")]
pub struct AddressObject {
    pub street: String,
    pub city: String,
}

impl From<Address> for AddressObject {
    fn from(address: Address) -> Self {
        Self {
            street: address.street,
            city: address.city,
        }
    }
}

/// An API user and the persons they have befriended.
pub struct UserObject(pub User);

#[Object(name = "User")]
impl UserObject {
    async fn username(&self) -> &str {
        self.0.username.as_str()
    }

    async fn friends(&self) -> Vec<PersonObject> {
        self.0.friends.iter().cloned().map(PersonObject).collect()
    }

    async fn id(&self) -> ID {
        ID(self.0.id.to_string())
    }
}

impl From<User> for UserObject {
    fn from(user: User) -> Self {
        Self(user)
    }
}

/// Signed credential returned by `login`.
#[derive(SimpleObject)]
pub struct Token {
    pub value: String,
}

//! Person domain types.

use phonebook_core::{PersonId, PersonName};

/// A person stored in the phonebook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    /// Store-assigned ID, never changes.
    pub id: PersonId,
    /// Unique name.
    pub name: PersonName,
    /// Phone number, absent when unknown.
    pub phone: Option<String>,
    /// Street part of the address.
    pub street: String,
    /// City part of the address.
    pub city: String,
}

impl Person {
    /// Project the stored street and city into an address view.
    #[must_use]
    pub fn address(&self) -> Address {
        Address {
            street: self.street.clone(),
            city: self.city.clone(),
        }
    }

    /// Whether a phone number is recorded for this person.
    #[must_use]
    pub const fn has_phone(&self) -> bool {
        self.phone.is_some()
    }
}

/// Street address of a person. Not stored on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub city: String,
}

/// A person that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewPerson {
    pub name: PersonName,
    pub phone: Option<String>,
    pub street: String,
    pub city: String,
}

/// Filter on the presence of a phone number.
///
/// Presence is what counts: an empty string is still a phone number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhoneFilter {
    /// No filtering.
    #[default]
    Any,
    /// Only persons with a phone number.
    WithPhone,
    /// Only persons without a phone number.
    WithoutPhone,
}

impl PhoneFilter {
    /// Returns true if `person` passes the filter.
    #[must_use]
    pub const fn matches(self, person: &Person) -> bool {
        match self {
            Self::Any => true,
            Self::WithPhone => person.has_phone(),
            Self::WithoutPhone => !person.has_phone(),
        }
    }
}

//! Domain models for the phonebook.
//!
//! These types represent validated domain objects separate from database row
//! types and from the GraphQL output objects that wrap them.

pub mod person;
pub mod user;

pub use person::{Address, NewPerson, PhoneFilter, Person};
pub use user::User;

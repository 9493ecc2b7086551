//! Validated name types for persons and users.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PersonName`] or [`Username`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// The input is empty or only whitespace.
    #[error("{field} cannot be empty")]
    Empty {
        /// Which field was being parsed.
        field: &'static str,
    },
    /// The input is shorter than allowed.
    #[error("{field} must be at least {min} characters")]
    TooShort {
        /// Which field was being parsed.
        field: &'static str,
        /// Minimum allowed length.
        min: usize,
    },
    /// The input is longer than allowed.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Which field was being parsed.
        field: &'static str,
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains whitespace where none is allowed.
    #[error("{field} cannot contain whitespace")]
    Whitespace {
        /// Which field was being parsed.
        field: &'static str,
    },
}

fn check_length(s: &str, field: &'static str, min: usize, max: usize) -> Result<(), NameError> {
    if s.trim().is_empty() {
        return Err(NameError::Empty { field });
    }

    let len = s.chars().count();
    if len < min {
        return Err(NameError::TooShort { field, min });
    }
    if len > max {
        return Err(NameError::TooLong { field, max });
    }

    Ok(())
}

/// The unique display name of a person in the phonebook.
///
/// Names are matched exactly, so surrounding whitespace is trimmed on parse
/// and the stored value is what every lookup compares against.
///
/// ## Constraints
///
/// - 1-100 characters after trimming
///
/// ## Examples
///
/// ```
/// use phonebook_core::PersonName;
///
/// assert_eq!(PersonName::parse("  Arto Hellas ").unwrap().as_str(), "Arto Hellas");
/// assert!(PersonName::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PersonName(String);

impl PersonName {
    /// Maximum length of a person name.
    pub const MAX_LENGTH: usize = 100;

    /// Parse a `PersonName` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or longer than
    /// [`Self::MAX_LENGTH`] characters.
    pub fn parse(s: &str) -> Result<Self, NameError> {
        let trimmed = s.trim();
        check_length(trimmed, "name", 1, Self::MAX_LENGTH)?;
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `PersonName` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// A login name for a phonebook user.
///
/// ## Constraints
///
/// - 3-50 characters
/// - No whitespace
///
/// ## Examples
///
/// ```
/// use phonebook_core::Username;
///
/// assert!(Username::parse("alice").is_ok());
/// assert!(Username::parse("al").is_err());
/// assert!(Username::parse("alice smith").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Minimum length of a username.
    pub const MIN_LENGTH: usize = 3;
    /// Maximum length of a username.
    pub const MAX_LENGTH: usize = 50;

    /// Parse a `Username` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, outside the allowed length,
    /// or contains whitespace.
    pub fn parse(s: &str) -> Result<Self, NameError> {
        check_length(s, "username", Self::MIN_LENGTH, Self::MAX_LENGTH)?;
        if s.chars().any(char::is_whitespace) {
            return Err(NameError::Whitespace { field: "username" });
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Username` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PersonName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::str::FromStr for Username {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
mod postgres {
    use super::{PersonName, Username};

    macro_rules! impl_text_type {
        ($name:ident) => {
            impl sqlx::Type<sqlx::Postgres> for $name {
                fn type_info() -> sqlx::postgres::PgTypeInfo {
                    <String as sqlx::Type<sqlx::Postgres>>::type_info()
                }

                fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                    <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
                }
            }

            impl sqlx::Encode<'_, sqlx::Postgres> for $name {
                fn encode_by_ref(
                    &self,
                    buf: &mut sqlx::postgres::PgArgumentBuffer,
                ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                    <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
                }
            }
        };
    }

    impl_text_type!(PersonName);
    impl_text_type!(Username);
}

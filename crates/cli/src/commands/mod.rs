//! CLI subcommands.

pub mod migrate;
pub mod seed;

use secrecy::SecretString;

/// Read the database URL the server would use.
///
/// # Errors
///
/// Returns `MissingDatabaseUrl` if neither `PHONEBOOK_DATABASE_URL` nor
/// `DATABASE_URL` is set.
pub fn database_url() -> Result<SecretString, MissingDatabaseUrl> {
    dotenvy::dotenv().ok();

    std::env::var("PHONEBOOK_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MissingDatabaseUrl)
}

/// Neither database URL variable is set.
#[derive(Debug, thiserror::Error)]
#[error("Missing environment variable: PHONEBOOK_DATABASE_URL (or DATABASE_URL)")]
pub struct MissingDatabaseUrl;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,                   // assigned by storage
    pub name: String,               // display name
    pub email: String,              // unique, stored lower-cased
    #[serde(skip_serializing)]
    pub password_hash: String,      // Argon2 hash, not exposed in JSON
    pub online: bool,               // presence flag
    pub created_at: OffsetDateTime, // creation timestamp
}

/// Registration candidate. Carries the plaintext password and has no id yet.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub online: bool,
}

/// Row handed to `save_and_flush`; the password is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub online: bool,
}

/// Listing collation key: accents stripped, case folded. Both repositories
/// order by this key, then by the raw name.
pub fn name_sort_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("email '{0}' is already stored")]
    DuplicateEmail(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

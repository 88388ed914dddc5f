use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::auth::error::AuthError;
use crate::users::repo::UserRepository;
use crate::users::repo_types::User;
use crate::users::services::normalize_email;

const ROLE_USER: &str = "ROLE_USER";

/// Credential view of a user, as the login flow needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDetails {
    pub user_id: Uuid,
    pub username: String,
    pub password: String, // stored hash
    pub authorities: Vec<String>,
    pub enabled: bool,
    pub account_non_expired: bool,
    pub account_non_locked: bool,
    pub credentials_non_expired: bool,
}

impl From<User> for UserDetails {
    fn from(u: User) -> Self {
        Self {
            user_id: u.id,
            username: u.email,
            password: u.password_hash,
            authorities: vec![ROLE_USER.to_string()],
            enabled: true,
            account_non_expired: true,
            account_non_locked: true,
            credentials_non_expired: true,
        }
    }
}

/// Loads credentials by login identifier.
#[async_trait]
pub trait UserDetailsService: Send + Sync {
    /// Fails with `AuthError::UsernameNotFound` when nobody has that identifier.
    async fn load_user_by_username(&self, username: &str) -> Result<UserDetails, AuthError>;
}

#[derive(Clone)]
pub struct UserDetailsAdapter {
    repo: Arc<dyn UserRepository>,
}

impl UserDetailsAdapter {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UserDetailsService for UserDetailsAdapter {
    #[instrument(skip(self))]
    async fn load_user_by_username(&self, username: &str) -> Result<UserDetails, AuthError> {
        let user = self
            .repo
            .find_by_email(&normalize_email(username))
            .await?
            .ok_or_else(|| AuthError::UsernameNotFound(username.to_string()))?;
        debug!(user_id = %user.id, "credentials loaded");
        Ok(user.into())
    }
}

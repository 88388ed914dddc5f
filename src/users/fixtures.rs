use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::users::memory::InMemoryUserRepository;
use crate::users::repo::UserRepository;
use crate::users::repo_types::{InsertUser, NewUser, RepoError, RepoResult, User};

pub const DEFAULT_NAME: &str = "Usuario Teste Unitário";
pub const DEFAULT_EMAIL: &str = "unitteste@email.com.br";
pub const DEFAULT_PASSWORD: &str = "123456";

/// Test user with overridable fields; unset fields take the defaults above.
#[derive(Debug, Clone, Default)]
pub struct UserFixture {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub online: Option<bool>,
}

impl UserFixture {
    pub fn with_email(email: &str) -> Self {
        Self {
            email: Some(email.into()),
            ..Default::default()
        }
    }

    pub fn new_user(&self) -> NewUser {
        NewUser {
            name: self.name.clone().unwrap_or_else(|| DEFAULT_NAME.into()),
            email: self.email.clone().unwrap_or_else(|| DEFAULT_EMAIL.into()),
            password: self.password.clone().unwrap_or_else(|| DEFAULT_PASSWORD.into()),
            online: self.online.unwrap_or(false),
        }
    }

    /// A record as storage would return it, password already hashed.
    pub fn stored(&self) -> User {
        let candidate = self.new_user();
        User {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            name: candidate.name,
            email: candidate.email,
            password_hash: hash_password(&candidate.password).expect("fixture hash"),
            online: candidate.online,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// In-memory store that also captures every row passed to `save_and_flush`.
#[derive(Debug, Default, Clone)]
pub struct RecordingRepository {
    pub inner: InMemoryUserRepository,
    saved: Arc<Mutex<Vec<InsertUser>>>,
    lookups: Arc<AtomicUsize>,
}

impl RecordingRepository {
    pub fn saved(&self) -> Vec<InsertUser> {
        self.saved.lock().unwrap().clone()
    }

    /// Number of `find_by_email` calls so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserRepository for RecordingRepository {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_email(email).await
    }

    async fn save_and_flush(&self, user: InsertUser) -> RepoResult<User> {
        self.saved.lock().unwrap().push(user.clone());
        self.inner.save_and_flush(user).await
    }

    async fn find_all_by_order_by_online_desc_name_asc(&self) -> RepoResult<Vec<User>> {
        self.inner.find_all_by_order_by_online_desc_name_asc().await
    }

    async fn update_online(&self, email: &str, online: bool) -> RepoResult<bool> {
        self.inner.update_online(email, online).await
    }
}

/// Canned answers: every lookup returns `found`, listing returns `listing`,
/// writes hit the unique index.
#[derive(Debug, Default, Clone)]
pub struct StubRepository {
    pub found: Option<User>,
    pub listing: Vec<User>,
}

#[async_trait]
impl UserRepository for StubRepository {
    async fn find_by_email(&self, _email: &str) -> RepoResult<Option<User>> {
        Ok(self.found.clone())
    }

    async fn save_and_flush(&self, user: InsertUser) -> RepoResult<User> {
        Err(RepoError::DuplicateEmail(user.email))
    }

    async fn find_all_by_order_by_online_desc_name_asc(&self) -> RepoResult<Vec<User>> {
        Ok(self.listing.clone())
    }

    async fn update_online(&self, _email: &str, _online: bool) -> RepoResult<bool> {
        Ok(self.found.is_some())
    }
}

/// Storage that is down.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrokenRepository;

#[async_trait]
impl UserRepository for BrokenRepository {
    async fn find_by_email(&self, _email: &str) -> RepoResult<Option<User>> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn save_and_flush(&self, _user: InsertUser) -> RepoResult<User> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn find_all_by_order_by_online_desc_name_asc(&self) -> RepoResult<Vec<User>> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn update_online(&self, _email: &str, _online: bool) -> RepoResult<bool> {
        Err(sqlx::Error::PoolTimedOut.into())
    }
}

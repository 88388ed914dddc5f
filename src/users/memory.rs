use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::users::repo::UserRepository;
use crate::users::repo_types::{name_sort_key, InsertUser, RepoError, RepoResult, User};

/// Map-backed repository for tests and local runs. Keyed by email, so the
/// uniqueness check and the insert happen under one write lock.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(email).cloned())
    }

    async fn save_and_flush(&self, user: InsertUser) -> RepoResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(RepoError::DuplicateEmail(user.email));
        }

        let stored = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            online: user.online,
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(stored.email.clone(), stored.clone());
        Ok(stored)
    }

    async fn find_all_by_order_by_online_desc_name_asc(&self) -> RepoResult<Vec<User>> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by_cached_key(|u| (Reverse(u.online), name_sort_key(&u.name), u.name.clone()));
        Ok(all)
    }

    async fn update_online(&self, email: &str, online: bool) -> RepoResult<bool> {
        let mut users = self.users.write().await;
        match users.get_mut(email) {
            Some(user) => {
                user.online = online;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

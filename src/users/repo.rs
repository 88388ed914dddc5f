use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::users::repo_types::{name_sort_key, InsertUser, RepoError, RepoResult, User};

/// Persistence contract consumed by the user service and the credential loader.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by (normalised) email.
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Insert and return the stored row with its assigned id.
    /// An email that is already stored yields `RepoError::DuplicateEmail`.
    async fn save_and_flush(&self, user: InsertUser) -> RepoResult<User>;

    /// All users, online first, then by `name_sort_key`, then by raw name.
    async fn find_all_by_order_by_online_desc_name_asc(&self) -> RepoResult<Vec<User>>;

    /// Returns false when no user has that email.
    async fn update_online(&self, email: &str, online: bool) -> RepoResult<bool>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, online, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn save_and_flush(&self, user: InsertUser) -> RepoResult<User> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, name_key, email, password_hash, online)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, password_hash, online, created_at
            "#,
        )
        .bind(&user.name)
        .bind(name_sort_key(&user.name))
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.online)
        .fetch_one(&self.db)
        .await;

        match result {
            Ok(stored) => Ok(stored),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                debug!(email = %user.email, "unique index rejected insert");
                Err(RepoError::DuplicateEmail(user.email))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_all_by_order_by_online_desc_name_asc(&self) -> RepoResult<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, online, created_at
            FROM users
            ORDER BY online DESC, name_key COLLATE "C" ASC, name COLLATE "C" ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn update_online(&self, email: &str, online: bool) -> RepoResult<bool> {
        let done = sqlx::query(r#"UPDATE users SET online = $2 WHERE email = $1"#)
            .bind(email)
            .bind(online)
            .execute(&self.db)
            .await?;
        Ok(done.rows_affected() > 0)
    }
}

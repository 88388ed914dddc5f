use std::sync::Arc;

use tracing::warn;

use crate::auth::details::{UserDetailsAdapter, UserDetailsService};
use crate::auth::password::{Argon2PasswordEncoder, PasswordEncoder};
use crate::config::AppConfig;
use crate::db;
use crate::messages::Messages;
use crate::users::memory::InMemoryUserRepository;
use crate::users::repo::{PgUserRepository, UserRepository};
use crate::users::services::UserService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: UserService,
    pub details: Arc<dyn UserDetailsService>,
    pub encoder: Arc<dyn PasswordEncoder>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        let messages = match &config.messages_path {
            Some(path) => Messages::load(path)?,
            None => Messages::default(),
        };
        let repo: Arc<dyn UserRepository> = match &config.database_url {
            Some(url) => Arc::new(PgUserRepository::new(db::connect(url).await?)),
            None => {
                warn!("DATABASE_URL not set; users are kept in memory");
                Arc::new(InMemoryUserRepository::new())
            }
        };
        Ok(Self::from_parts(config, repo, messages))
    }

    pub fn from_parts(
        config: AppConfig,
        repo: Arc<dyn UserRepository>,
        messages: Messages,
    ) -> Self {
        let encoder = Arc::new(Argon2PasswordEncoder) as Arc<dyn PasswordEncoder>;
        let users = UserService::new(repo.clone(), encoder.clone(), Arc::new(messages));
        let details = Arc::new(UserDetailsAdapter::new(repo)) as Arc<dyn UserDetailsService>;
        Self {
            config: Arc::new(config),
            users,
            details,
            encoder,
        }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::with_repository(Arc::new(InMemoryUserRepository::new()))
    }

    #[cfg(test)]
    pub fn with_repository(repo: Arc<dyn UserRepository>) -> Self {
        use crate::config::JwtConfig;

        let config = AppConfig {
            database_url: None,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test".into(),
                audience: "test".into(),
                ttl_minutes: 5,
            },
            messages_path: None,
        };
        Self::from_parts(config, repo, Messages::default())
    }
}

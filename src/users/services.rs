use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::auth::password::PasswordEncoder;
use crate::messages::{self, Messages};
use crate::users::dto::{CreateUserRequest, UserDto};
use crate::users::error::{UserError, UserResult};
use crate::users::repo::UserRepository;
use crate::users::repo_types::{InsertUser, NewUser, RepoError, User};

const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles");
    }
    EMAIL_RE.is_match(email)
}

/// Emails are compared and stored trimmed and lower-cased.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Registration and listing of chat users.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    encoder: Arc<dyn PasswordEncoder>,
    messages: Arc<Messages>,
}

impl UserService {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        encoder: Arc<dyn PasswordEncoder>,
        messages: Arc<Messages>,
    ) -> Self {
        Self {
            repo,
            encoder,
            messages,
        }
    }

    /// Name present, email well formed, password long enough.
    pub fn validate_registration(&self, req: &CreateUserRequest) -> UserResult<()> {
        if req.name.trim().is_empty() {
            return Err(UserError::Validation(self.messages.get(messages::NAME_REQUIRED)));
        }
        if !is_valid_email(&normalize_email(&req.email)) {
            return Err(UserError::Validation(self.messages.get(messages::INVALID_EMAIL)));
        }
        if req.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(UserError::Validation(
                self.messages.get(messages::PASSWORD_TOO_SHORT),
            ));
        }
        Ok(())
    }

    /// Registers a new user. The email must not be taken; new users always
    /// start offline and only the password hash is written.
    #[instrument(skip(self, candidate), fields(email = %candidate.email))]
    pub async fn save(&self, candidate: NewUser) -> UserResult<User> {
        let email = normalize_email(&candidate.email);

        if self.repo.find_by_email(&email).await?.is_some() {
            warn!("email already registered");
            return Err(UserError::EmailRegistered(self.messages.email_registered()));
        }

        if candidate.online {
            debug!("new users start offline; ignoring requested online flag");
        }

        let password_hash = self.encoder.encode(&candidate.password)?;
        let row = InsertUser {
            name: candidate.name.trim().to_string(),
            email,
            password_hash,
            online: false,
        };

        let user = match self.repo.save_and_flush(row).await {
            Ok(u) => u,
            Err(RepoError::DuplicateEmail(_)) => {
                warn!("email registered concurrently");
                return Err(UserError::EmailRegistered(self.messages.email_registered()));
            }
            Err(e) => return Err(e.into()),
        };

        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// All users as list views, online first, then by name.
    #[instrument(skip(self))]
    pub async fn find_all_users_convert_dto(&self) -> UserResult<Vec<UserDto>> {
        let users = self.repo.find_all_by_order_by_online_desc_name_asc().await?;
        Ok(users.into_iter().map(UserDto::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> UserResult<UserDto> {
        self.repo
            .find_by_email(&normalize_email(email))
            .await?
            .map(UserDto::from)
            .ok_or_else(|| UserError::NotFound(self.messages.get(messages::USER_NOT_FOUND)))
    }

    #[instrument(skip(self))]
    pub async fn set_online(&self, email: &str, online: bool) -> UserResult<()> {
        if !self.repo.update_online(&normalize_email(email), online).await? {
            return Err(UserError::NotFound(self.messages.get(messages::USER_NOT_FOUND)));
        }
        info!(online, "presence updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::Argon2PasswordEncoder;
    use crate::users::fixtures::{
        BrokenRepository, RecordingRepository, StubRepository, UserFixture, DEFAULT_EMAIL,
        DEFAULT_NAME, DEFAULT_PASSWORD,
    };
    use crate::users::memory::InMemoryUserRepository;

    fn service(repo: Arc<dyn UserRepository>) -> UserService {
        UserService::new(
            repo,
            Arc::new(Argon2PasswordEncoder),
            Arc::new(Messages::default()),
        )
    }

    #[tokio::test]
    async fn save_new_user_success() {
        let repo = RecordingRepository::default();
        let svc = service(Arc::new(repo.clone()));

        let user = svc.save(UserFixture::default().new_user()).await.expect("save");
        assert!(!user.id.is_nil());

        let saved = repo.saved();
        assert_eq!(saved.len(), 1);
        let row = &saved[0];
        assert_eq!(row.name, DEFAULT_NAME);
        assert_eq!(row.email, DEFAULT_EMAIL);
        assert_ne!(row.password_hash, DEFAULT_PASSWORD);
        assert!(Argon2PasswordEncoder.matches(DEFAULT_PASSWORD, &row.password_hash).unwrap());
        assert!(!row.online);
    }

    #[tokio::test]
    async fn save_forces_new_users_offline() {
        let repo = RecordingRepository::default();
        let svc = service(Arc::new(repo.clone()));
        let candidate = UserFixture {
            online: Some(true),
            ..Default::default()
        }
        .new_user();

        let user = svc.save(candidate).await.expect("save");
        assert!(!user.online);
        assert!(!repo.saved()[0].online);
    }

    #[tokio::test]
    async fn save_new_user_error_email_registered() {
        let repo = RecordingRepository::default();
        let svc = service(Arc::new(repo.clone()));
        svc.save(UserFixture::default().new_user()).await.expect("first save");

        let err = svc.save(UserFixture::default().new_user()).await.unwrap_err();
        match err {
            UserError::EmailRegistered(msg) => {
                assert_eq!(msg, Messages::default().email_registered())
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(repo.saved().len(), 1);
    }

    #[tokio::test]
    async fn save_treats_email_case_insensitively() {
        let repo = RecordingRepository::default();
        let svc = service(Arc::new(repo.clone()));
        svc.save(UserFixture::with_email("a@x.com").new_user()).await.unwrap();

        let err = svc
            .save(UserFixture::with_email("  A@X.com ").new_user())
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::EmailRegistered(_)));
        assert_eq!(repo.saved().len(), 1);
    }

    #[tokio::test]
    async fn storage_conflict_becomes_email_registered() {
        // Lookup misses, insert hits the unique index: a lost race.
        let svc = service(Arc::new(StubRepository::default()));

        let err = svc.save(UserFixture::default().new_user()).await.unwrap_err();
        assert!(matches!(err, UserError::EmailRegistered(_)));
    }

    #[tokio::test]
    async fn storage_failure_propagates_as_repository_error() {
        let svc = service(Arc::new(BrokenRepository));

        let err = svc.save(UserFixture::default().new_user()).await.unwrap_err();
        assert!(matches!(err, UserError::Repository(RepoError::Database(_))));
    }

    #[tokio::test]
    async fn find_all_users_convert_dto_success() {
        let listing = vec![
            UserFixture::default().stored(),
            UserFixture::with_email("unitteste1@email.com.br").stored(),
            UserFixture::with_email("unitteste2@email.com.br").stored(),
        ];
        let svc = service(Arc::new(StubRepository {
            found: None,
            listing,
        }));

        let dtos = svc.find_all_users_convert_dto().await.unwrap();
        assert_eq!(dtos.len(), 3);

        let json = serde_json::to_string(&dtos).unwrap();
        assert!(!json.contains("password"));
    }

    #[tokio::test]
    async fn register_then_list_by_presence() {
        let svc = service(Arc::new(InMemoryUserRepository::new()));

        let a = svc
            .save(UserFixture {
                name: Some("Ana".into()),
                email: Some("a@x.com".into()),
                ..Default::default()
            }
            .new_user())
            .await
            .unwrap();
        assert!(!a.online);

        let again = svc.save(UserFixture::with_email("a@x.com").new_user()).await;
        assert!(matches!(again, Err(UserError::EmailRegistered(_))));

        svc.save(UserFixture {
            name: Some("Bia".into()),
            email: Some("b@x.com".into()),
            ..Default::default()
        }
        .new_user())
        .await
        .unwrap();
        svc.set_online("b@x.com", true).await.unwrap();

        let listed: Vec<(String, bool)> = svc
            .find_all_users_convert_dto()
            .await
            .unwrap()
            .into_iter()
            .map(|u| (u.email, u.online))
            .collect();
        assert_eq!(
            listed,
            vec![("b@x.com".to_string(), true), ("a@x.com".to_string(), false)]
        );
    }

    #[tokio::test]
    async fn set_online_on_unknown_email_is_not_found() {
        let svc = service(Arc::new(InMemoryUserRepository::new()));
        let err = svc.set_online("ghost@x.com", true).await.unwrap_err();
        assert!(matches!(err, UserError::NotFound(_)));
    }

    #[tokio::test]
    async fn find_by_email_returns_dto() {
        let svc = service(Arc::new(InMemoryUserRepository::new()));
        svc.save(UserFixture::default().new_user()).await.unwrap();

        let dto = svc.find_by_email(DEFAULT_EMAIL).await.unwrap();
        assert_eq!(dto.name, DEFAULT_NAME);
        assert!(matches!(
            svc.find_by_email("other@x.com").await,
            Err(UserError::NotFound(_))
        ));
    }

    #[test]
    fn validate_registration_checks_fields() {
        let svc = service(Arc::new(InMemoryUserRepository::new()));
        let req = |name: &str, email: &str, password: &str| CreateUserRequest {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        };

        assert!(svc.validate_registration(&req("Ana", "a@x.com", "123456")).is_ok());
        assert!(matches!(
            svc.validate_registration(&req("  ", "a@x.com", "123456")),
            Err(UserError::Validation(m)) if m == "Name is required"
        ));
        assert!(matches!(
            svc.validate_registration(&req("Ana", "not-an-email", "123456")),
            Err(UserError::Validation(m)) if m == "Invalid email"
        ));
        assert!(matches!(
            svc.validate_registration(&req("Ana", "a@x.com", "12345")),
            Err(UserError::Validation(_))
        ));
    }
}

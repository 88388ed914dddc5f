use axum::http::StatusCode;
use tracing::{error, warn};

use crate::users::repo_types::RepoError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No user is registered under the identifier.
    #[error("user '{0}' not found")]
    UsernameNotFound(String),

    #[error("bad credentials")]
    BadCredentials,

    #[error(transparent)]
    Repository(#[from] RepoError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<AuthError> for (StatusCode, String) {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::UsernameNotFound(email) => {
                warn!(%email, "login unknown email");
                (StatusCode::UNAUTHORIZED, "Invalid credentials".into())
            }
            AuthError::BadCredentials => {
                warn!("login invalid password");
                (StatusCode::UNAUTHORIZED, "Invalid credentials".into())
            }
            other => {
                error!(error = %other, "authentication failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into())
            }
        }
    }
}

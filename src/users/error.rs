use axum::http::StatusCode;
use tracing::{error, warn};

use crate::users::repo_types::RepoError;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("{0}")]
    EmailRegistered(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Repository(#[from] RepoError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<UserError> for (StatusCode, String) {
    fn from(e: UserError) -> Self {
        match e {
            UserError::EmailRegistered(msg) => {
                warn!(%msg, "registration rejected");
                (StatusCode::CONFLICT, msg)
            }
            UserError::Validation(msg) => {
                warn!(%msg, "invalid input");
                (StatusCode::BAD_REQUEST, msg)
            }
            UserError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            other => {
                error!(error = %other, "user operation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into())
            }
        }
    }
}

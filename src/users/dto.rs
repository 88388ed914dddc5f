use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::repo_types::{NewUser, User};

/// List-view projection of a user. Has no password field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub online: bool,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            online: u.online,
        }
    }
}

/// Registration form posted by the sign-up page.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl From<CreateUserRequest> for NewUser {
    fn from(r: CreateUserRequest) -> Self {
        Self {
            name: r.name,
            email: r.email,
            password: r.password,
            online: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PresenceRequest {
    pub online: bool,
}

use tracing::instrument;

use crate::auth::details::{UserDetails, UserDetailsService};
use crate::auth::error::AuthError;
use crate::auth::password::PasswordEncoder;

/// Checks a login attempt against the stored credentials.
#[instrument(skip(details, encoder, password))]
pub async fn authenticate(
    details: &dyn UserDetailsService,
    encoder: &dyn PasswordEncoder,
    email: &str,
    password: &str,
) -> Result<UserDetails, AuthError> {
    let user = details.load_user_by_username(email).await?;
    let usable = user.enabled
        && user.account_non_locked
        && user.account_non_expired
        && user.credentials_non_expired;
    if !usable {
        return Err(AuthError::BadCredentials);
    }
    if !encoder.matches(password, &user.password)? {
        return Err(AuthError::BadCredentials);
    }
    Ok(user)
}

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{error, info, instrument};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser},
        jwt::JwtKeys,
        services::authenticate,
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let details = authenticate(
        state.details.as_ref(),
        state.encoder.as_ref(),
        &payload.email,
        &payload.password,
    )
    .await?;

    let user = PublicUser {
        id: details.user_id,
        email: details.username,
    };

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign(user.id, &user.email).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse { access_token, user }))
}

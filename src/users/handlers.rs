use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::jwt::AuthUser,
    state::AppState,
    users::dto::{CreateUserRequest, PresenceRequest, UserDto},
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/create", post(create_user))
        .route("/user/user/load", post(load_logged_user))
        .route("/user/presence", post(update_presence))
        .route("/users", get(list_users))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Form(payload): Form<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserDto>), (StatusCode, String)> {
    state.users.validate_registration(&payload)?;
    let user = state.users.save(payload.into()).await?;
    info!(user_id = %user.id, "user created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserDto>>, (StatusCode, String)> {
    Ok(Json(state.users.find_all_users_convert_dto().await?))
}

#[instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn load_logged_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserDto>, (StatusCode, String)> {
    Ok(Json(state.users.find_by_email(&auth.email).await?))
}

#[instrument(skip(state, auth, payload), fields(user_id = %auth.id))]
pub async fn update_presence(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<PresenceRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    state.users.set_online(&auth.email, payload.online).await?;
    info!(user_id = %auth.id, online = payload.online, "presence set");
    Ok(StatusCode::NO_CONTENT)
}

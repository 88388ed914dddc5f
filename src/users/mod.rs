use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod error;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod handlers;
pub mod memory;
pub mod repo;
pub mod repo_types;
pub mod services;

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}

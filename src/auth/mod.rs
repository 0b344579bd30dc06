use crate::state::AppState;
use axum::Router;

mod claims;
mod dto;
pub mod handlers;
pub(crate) mod jwt;
mod password;
pub mod repo;
pub mod repo_types;
pub(crate) mod extractors;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::me_routes())
}

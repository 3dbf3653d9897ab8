use crate::state::AppState;
use axum::Router;

mod dto;
pub mod credential;
pub(crate) mod extractors;
pub mod handlers;
pub mod provider;
pub mod referral;
pub mod repo;
pub mod repo_types;
pub mod services;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::profile_routes())
}

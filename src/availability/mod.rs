use crate::state::AppState;
use axum::Router;

mod dto;
mod handlers;
pub mod repo;
mod services;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::host_routes())
        .merge(handlers::public_routes())
}

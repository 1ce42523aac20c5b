use crate::state::AppState;
use axum::Router;

mod dto;
mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::public_routes())
        .merge(handlers::host_routes())
}

use crate::state::AppState;
use axum::Router;

mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    handlers::review_routes()
}

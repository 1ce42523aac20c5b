use crate::state::AppState;
use axum::Router;

mod dto;
mod handlers;
pub mod repo;
mod services;

pub use services::accessible_booking;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::customer_routes())
        .merge(handlers::host_routes())
}

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};
use axum::Router;

mod dto;
mod handlers;
pub mod repo;

use repo::HostProfile;

pub fn router() -> Router<AppState> {
    handlers::profile_routes()
}

/// Resolves the business profile behind a host caller.
pub async fn current_host(state: &AppState, user: &AuthUser) -> ApiResult<HostProfile> {
    user.require_host()?;
    state
        .store
        .host_by_user(user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Host profile not found"))
}

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    current_host,
    dto::{CreateHostProfileRequest, UpdateHostProfileRequest},
    repo::{HostProfile, HostProfileChanges, NewHostProfile},
};
use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
    wire::clean_optional,
};

const MAX_NAME_LEN: usize = 200;

pub fn profile_routes() -> Router<AppState> {
    Router::new().route(
        "/business/profile",
        get(get_profile).post(create_profile).put(update_profile),
    )
}

fn clean_business_name(name: &str) -> ApiResult<String> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::bad_request(
            "business_name must be 1-200 characters",
        ));
    }
    Ok(name.to_string())
}

#[instrument(skip(state, payload))]
pub async fn create_profile(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CreateHostProfileRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<HostProfile>)> {
    let Json(payload) = payload?;
    user.require_host()?;

    if state.store.host_by_user(user.user_id).await?.is_some() {
        warn!(user_id = %user.user_id, "host profile already exists");
        return Err(ApiError::Conflict("Host profile already exists".into()));
    }

    let host = state
        .store
        .create_host(NewHostProfile {
            user_id: user.user_id,
            business_name: clean_business_name(&payload.business_name)?,
            description: clean_optional(payload.description),
            location: clean_optional(payload.location),
            phone: clean_optional(payload.phone),
            website: clean_optional(payload.website),
        })
        .await?;

    info!(host_id = %host.id, user_id = %user.user_id, "host profile created");
    Ok((StatusCode::CREATED, Json(host)))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<HostProfile>> {
    Ok(Json(current_host(&state, &user).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<UpdateHostProfileRequest>, JsonRejection>,
) -> ApiResult<Json<HostProfile>> {
    let Json(payload) = payload?;
    let host = current_host(&state, &user).await?;

    let business_name = match payload.business_name.as_deref() {
        Some(name) => Some(clean_business_name(name)?),
        None => None,
    };
    let changes = HostProfileChanges {
        business_name,
        description: clean_optional(payload.description),
        location: clean_optional(payload.location),
        phone: clean_optional(payload.phone),
        website: clean_optional(payload.website),
    };

    let updated = state
        .store
        .update_host(host.id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("Host profile not found"))?;
    info!(host_id = %updated.id, "host profile updated");
    Ok(Json(updated))
}

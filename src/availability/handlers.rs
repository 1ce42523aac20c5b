use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{AvailabilityQuery, CreateAvailabilityRequest},
    repo::{Availability, AvailabilityFilter},
    services::add_slots,
};
use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult, Envelope},
    hosts::current_host,
    state::AppState,
};

pub fn host_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/business/availability",
            get(list_host_availability).post(create_availability),
        )
        .route("/business/availability/:id", delete(delete_availability))
}

pub fn public_routes() -> Router<AppState> {
    Router::new().route(
        "/experiences/:id/availability",
        get(list_experience_availability),
    )
}

#[instrument(skip(state, payload))]
pub async fn create_availability(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CreateAvailabilityRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Envelope<Vec<Availability>>>)> {
    let Json(payload) = payload?;
    let host = current_host(&state, &user).await?;
    let rows = add_slots(&state, host.id, payload.slots).await?;
    Ok((StatusCode::CREATED, Envelope::ok(rows)))
}

#[instrument(skip(state))]
pub async fn list_host_availability(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<AvailabilityQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Availability>>> {
    let Query(q) = query?;
    let host = current_host(&state, &user).await?;
    let rows = state
        .store
        .list_availability(AvailabilityFilter {
            host_id: Some(host.id),
            experience_id: q.experience_id,
            from: q.from,
            to: q.to,
        })
        .await?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn delete_availability(
    State(state): State<AppState>,
    user: AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    let host = current_host(&state, &user).await?;
    if !state.store.delete_availability(host.id, id).await? {
        return Err(ApiError::not_found("Availability slot not found"));
    }
    info!(availability_id = %id, host_id = %host.id, "availability slot deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn list_experience_availability(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<AvailabilityQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Availability>>> {
    let Path(id) = id?;
    let Query(q) = query?;
    let exp = state
        .store
        .experience_by_id(id)
        .await?
        .filter(|e| e.is_active)
        .ok_or_else(|| ApiError::not_found("Experience not found"))?;
    let rows = state
        .store
        .list_availability(AvailabilityFilter {
            host_id: Some(exp.host_id),
            experience_id: Some(exp.id),
            from: q.from,
            to: q.to,
        })
        .await?;
    Ok(Json(rows))
}

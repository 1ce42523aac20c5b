use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{CreateExperienceRequest, ListExperiencesQuery, UpdateExperienceRequest},
    repo::{Experience, ExperienceChanges, ExperienceFilter},
};
use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    hosts::current_host,
    state::AppState,
    wire::clean_optional,
};

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/experiences", get(list_experiences))
        .route("/experiences/:id", get(get_experience))
}

pub fn host_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/business/experiences",
            get(list_host_experiences).post(create_experience),
        )
        .route(
            "/business/experiences/:id",
            put(update_experience).delete(deactivate_experience),
        )
}

#[instrument(skip(state))]
pub async fn list_experiences(
    State(state): State<AppState>,
    query: Result<Query<ListExperiencesQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Experience>>> {
    let Query(q) = query?;
    let (limit, offset) = q.clamped();
    let rows = state
        .store
        .list_experiences(ExperienceFilter {
            activity_type: q.activity_type,
            location: clean_optional(q.location),
            max_price: q.max_price,
            limit,
            offset,
        })
        .await?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn get_experience(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Experience>> {
    let Path(id) = id?;
    state
        .store
        .experience_by_id(id)
        .await?
        .filter(|e| e.is_active)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Experience not found"))
}

#[instrument(skip(state))]
pub async fn list_host_experiences(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<Experience>>> {
    let host = current_host(&state, &user).await?;
    Ok(Json(state.store.list_host_experiences(host.id).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_experience(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CreateExperienceRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Experience>)> {
    let Json(payload) = payload?;
    let host = current_host(&state, &user).await?;
    let exp = state
        .store
        .create_experience(payload.into_new(host.id)?)
        .await?;
    state.dashboards.invalidate(host.id).await;
    info!(experience_id = %exp.id, host_id = %host.id, "experience created");
    Ok((StatusCode::CREATED, Json(exp)))
}

/// Loads an experience only if the caller's business owns it.
async fn owned_experience(state: &AppState, host_id: Uuid, id: Uuid) -> ApiResult<Experience> {
    state
        .store
        .experience_by_id(id)
        .await?
        .filter(|e| e.host_id == host_id)
        .ok_or_else(|| ApiError::not_found("Experience not found"))
}

#[instrument(skip(state, payload))]
pub async fn update_experience(
    State(state): State<AppState>,
    user: AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateExperienceRequest>, JsonRejection>,
) -> ApiResult<Json<Experience>> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let host = current_host(&state, &user).await?;
    let current = owned_experience(&state, host.id, id).await?;
    let changes = payload.into_changes(&current)?;

    let exp = state
        .store
        .update_experience(host.id, id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("Experience not found"))?;
    state.dashboards.invalidate(host.id).await;
    info!(experience_id = %exp.id, "experience updated");
    Ok(Json(exp))
}

#[instrument(skip(state))]
pub async fn deactivate_experience(
    State(state): State<AppState>,
    user: AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    let host = current_host(&state, &user).await?;
    let changes = ExperienceChanges {
        is_active: Some(false),
        ..Default::default()
    };
    state
        .store
        .update_experience(host.id, id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("Experience not found"))?;
    state.dashboards.invalidate(host.id).await;
    info!(experience_id = %id, "experience deactivated");
    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{CreateBookingRequest, HostBookingsQuery, UpdateStatusRequest},
    repo::Booking,
    services,
};
use crate::{
    auth::AuthUser,
    error::{ApiResult, Envelope},
    hosts::current_host,
    state::AppState,
};

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_my_bookings).post(create_booking))
        .route("/bookings/:id", get(get_booking))
        .route("/bookings/:id/status", patch(update_booking_status))
}

pub fn host_routes() -> Router<AppState> {
    Router::new().route("/business/bookings", get(list_host_bookings))
}

#[instrument(skip(state, payload))]
pub async fn create_booking(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Envelope<Booking>>)> {
    let Json(payload) = payload?;
    state.throttle(&format!("bookings:{}", user.user_id)).await?;
    let booking = services::create_booking(&state, user.user_id, payload).await?;
    Ok((StatusCode::CREATED, Envelope::ok(booking)))
}

#[instrument(skip(state))]
pub async fn list_my_bookings(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<Booking>>> {
    Ok(Json(state.store.list_user_bookings(user.user_id).await?))
}

#[instrument(skip(state))]
pub async fn get_booking(
    State(state): State<AppState>,
    user: AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Booking>> {
    let Path(id) = id?;
    Ok(Json(services::accessible_booking(&state, &user, id).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_booking_status(
    State(state): State<AppState>,
    user: AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> ApiResult<Json<Envelope<Booking>>> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let booking = services::update_status(&state, &user, id, payload).await?;
    Ok(Envelope::ok(booking))
}

#[instrument(skip(state))]
pub async fn list_host_bookings(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<HostBookingsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Booking>>> {
    let Query(q) = query?;
    let host = current_host(&state, &user).await?;
    Ok(Json(state.store.list_host_bookings(host.id, q.status).await?))
}

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::repo::{NewReview, Review};
use crate::{
    auth::AuthUser,
    bookings::{accessible_booking, repo::BookingStatus},
    error::{ApiError, ApiResult, Envelope},
    state::AppState,
    wire::clean_optional,
};

const MAX_COMMENT_LEN: usize = 2000;

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: i16,
    pub comment: Option<String>,
}

pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/bookings/:id/review", post(create_review))
        .route("/experiences/:id/reviews", get(list_experience_reviews))
}

#[instrument(skip(state, payload))]
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CreateReviewRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Envelope<Review>>)> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    if !(1..=5).contains(&payload.rating) {
        return Err(ApiError::bad_request("rating must be between 1 and 5"));
    }
    let comment = clean_optional(payload.comment);
    if comment
        .as_deref()
        .is_some_and(|c| c.chars().count() > MAX_COMMENT_LEN)
    {
        return Err(ApiError::bad_request("comment is too long"));
    }

    let booking = accessible_booking(&state, &user, id).await?;
    if booking.user_id != user.user_id {
        return Err(ApiError::Forbidden("Only the guest can review a booking".into()));
    }
    if booking.booking_status != BookingStatus::Completed {
        return Err(ApiError::bad_request("Only completed bookings can be reviewed"));
    }
    if state.store.review_for_booking(booking.id).await?.is_some() {
        warn!(booking_id = %booking.id, "booking already reviewed");
        return Err(ApiError::Conflict("Booking already reviewed".into()));
    }

    let review = state
        .store
        .insert_review(NewReview {
            booking_id: booking.id,
            user_id: user.user_id,
            experience_id: booking.experience_id,
            host_id: booking.host_id,
            rating: payload.rating,
            comment,
        })
        .await?;
    state.dashboards.invalidate(booking.host_id).await;
    info!(review_id = %review.id, booking_id = %booking.id, rating = review.rating, "review created");
    Ok((StatusCode::CREATED, Envelope::ok(review)))
}

#[instrument(skip(state))]
pub async fn list_experience_reviews(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Vec<Review>>> {
    let Path(id) = id?;
    let exp = state
        .store
        .experience_by_id(id)
        .await?
        .filter(|e| e.is_active)
        .ok_or_else(|| ApiError::not_found("Experience not found"))?;
    Ok(Json(state.store.list_experience_reviews(exp.id).await?))
}

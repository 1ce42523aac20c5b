use time::{Date, OffsetDateTime};
use tracing::info;
use uuid::Uuid;

use super::{
    dto::{CreateBookingRequest, UpdateStatusRequest},
    repo::{Booking, NewBooking},
};
use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
    wire::clean_optional,
};

const MAX_SPECIAL_REQUESTS_LEN: usize = 1000;

/// Validates a booking request against `today` and the experience it names.
///
/// Guest count is not compared with the experience's `max_guests` or with any
/// availability slot.
pub async fn prepare_booking(
    state: &AppState,
    user_id: Uuid,
    req: CreateBookingRequest,
    today: Date,
) -> ApiResult<NewBooking> {
    if req.number_of_guests < 1 {
        return Err(ApiError::bad_request("number_of_guests must be at least 1"));
    }
    if !req.total_price.is_finite() || req.total_price < 0.0 {
        return Err(ApiError::bad_request("total_price must be >= 0"));
    }
    if req.booking_date < today {
        return Err(ApiError::bad_request("booking_date is in the past"));
    }
    let special_requests = clean_optional(req.special_requests);
    if special_requests
        .as_deref()
        .is_some_and(|s| s.chars().count() > MAX_SPECIAL_REQUESTS_LEN)
    {
        return Err(ApiError::bad_request("special_requests is too long"));
    }

    let exp = state
        .store
        .experience_by_id(req.experience_id)
        .await?
        .filter(|e| e.is_active)
        .ok_or_else(|| ApiError::not_found("Experience not found"))?;

    Ok(NewBooking {
        user_id,
        experience_id: exp.id,
        host_id: exp.host_id,
        booking_date: req.booking_date,
        booking_time: req.booking_time,
        number_of_guests: req.number_of_guests,
        total_price: req.total_price,
        special_requests,
    })
}

/// Inserts a pending booking and refreshes the host's booking views.
pub async fn create_booking(
    state: &AppState,
    user_id: Uuid,
    req: CreateBookingRequest,
) -> ApiResult<Booking> {
    let today = OffsetDateTime::now_utc().date();
    let new = prepare_booking(state, user_id, req, today).await?;
    let booking = state.store.insert_booking(new).await?;
    state.invalidate_booking_views(booking.host_id).await;
    info!(
        booking_id = %booking.id,
        host_id = %booking.host_id,
        user_id = %user_id,
        guests = booking.number_of_guests,
        "booking created"
    );
    Ok(booking)
}

/// Loads a booking the caller may see: its customer, the owning host or an admin.
pub async fn accessible_booking(state: &AppState, user: &AuthUser, id: Uuid) -> ApiResult<Booking> {
    let booking = state
        .store
        .booking_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Booking not found"))?;
    let host_id = state.store.host_by_user(user.user_id).await?.map(|h| h.id);
    if !booking.visible_to(user.user_id, host_id, user.is_admin()) {
        return Err(ApiError::not_found("Booking not found"));
    }
    Ok(booking)
}

/// Moves a booking to any status. No transition is refused.
pub async fn update_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    req: UpdateStatusRequest,
) -> ApiResult<Booking> {
    let current = accessible_booking(state, user, id).await?;
    let updated = state
        .store
        .set_booking_status(id, req.booking_status, req.payment_status)
        .await?
        .ok_or_else(|| ApiError::not_found("Booking not found"))?;
    state.invalidate_booking_views(updated.host_id).await;
    info!(
        booking_id = %id,
        from = %current.booking_status,
        to = %updated.booking_status,
        payment = %updated.payment_status,
        "booking status updated"
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::repo::Role,
        bookings::repo::{BookingStatus, PaymentStatus},
        experiences::repo::{ActivityType, Difficulty, Experience, NewExperience},
        hosts::repo::NewHostProfile,
    };
    use time::macros::{date, time};

    async fn seed_experience(state: &AppState, host_user: Uuid) -> Experience {
        let host = state
            .store
            .create_host(NewHostProfile {
                user_id: host_user,
                business_name: "Blue Lagoon Tours".into(),
                description: None,
                location: None,
                phone: None,
                website: None,
            })
            .await
            .unwrap();
        state
            .store
            .create_experience(NewExperience {
                host_id: host.id,
                title: "Paddle at dawn".into(),
                description: None,
                location: "Lagoon".into(),
                activity_type: ActivityType::Paddleboarding,
                difficulty_level: Difficulty::Beginner,
                price_per_person: 35.0,
                duration_hours: 2.0,
                min_guests: 1,
                max_guests: 4,
            })
            .await
            .unwrap()
    }

    fn request(experience_id: Uuid) -> CreateBookingRequest {
        CreateBookingRequest {
            experience_id,
            booking_date: date!(2099 - 01 - 10),
            booking_time: time!(7:30),
            number_of_guests: 2,
            total_price: 70.0,
            special_requests: Some("  ".into()),
        }
    }

    fn customer(id: Uuid) -> AuthUser {
        AuthUser {
            user_id: id,
            role: Role::Customer,
        }
    }

    #[tokio::test]
    async fn new_booking_is_pending_with_generated_id() {
        let state = AppState::fake();
        let exp = seed_experience(&state, Uuid::new_v4()).await;
        let user = Uuid::new_v4();

        let booking = create_booking(&state, user, request(exp.id)).await.unwrap();
        assert_ne!(booking.id, Uuid::nil());
        assert_eq!(booking.booking_status, BookingStatus::Pending);
        assert_eq!(booking.payment_status, PaymentStatus::Pending);
        assert_eq!(booking.host_id, exp.host_id);
        assert_eq!(booking.special_requests, None);
    }

    #[tokio::test]
    async fn overbooking_is_not_prevented() {
        let state = AppState::fake();
        let exp = seed_experience(&state, Uuid::new_v4()).await;
        let mut req = request(exp.id);
        req.number_of_guests = 40;
        let a = create_booking(&state, Uuid::new_v4(), req.clone()).await.unwrap();
        let b = create_booking(&state, Uuid::new_v4(), req).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn rejects_past_dates_and_missing_experience() {
        let state = AppState::fake();
        let exp = seed_experience(&state, Uuid::new_v4()).await;

        let err = prepare_booking(&state, Uuid::new_v4(), request(exp.id), date!(2099 - 01 - 11))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err = create_booking(&state, Uuid::new_v4(), request(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let mut req = request(exp.id);
        req.number_of_guests = 0;
        assert!(create_booking(&state, Uuid::new_v4(), req).await.is_err());
    }

    #[tokio::test]
    async fn status_updates_persist_and_are_unconditional() {
        let state = AppState::fake();
        let exp = seed_experience(&state, Uuid::new_v4()).await;
        let user = customer(Uuid::new_v4());
        let booking = create_booking(&state, user.user_id, request(exp.id)).await.unwrap();

        for status in [
            BookingStatus::Confirmed,
            BookingStatus::Completed,
            BookingStatus::Pending,
        ] {
            let updated = update_status(
                &state,
                &user,
                booking.id,
                UpdateStatusRequest {
                    booking_status: status,
                    payment_status: None,
                },
            )
            .await
            .unwrap();
            assert_eq!(updated.booking_status, status);
            let reread = state.store.booking_by_id(booking.id).await.unwrap().unwrap();
            assert_eq!(reread.booking_status, status);
        }
    }

    #[tokio::test]
    async fn host_can_update_and_strangers_cannot() {
        let state = AppState::fake();
        let host_user = Uuid::new_v4();
        let exp = seed_experience(&state, host_user).await;
        let booking = create_booking(&state, Uuid::new_v4(), request(exp.id)).await.unwrap();

        let host = AuthUser {
            user_id: host_user,
            role: Role::Host,
        };
        let updated = update_status(
            &state,
            &host,
            booking.id,
            UpdateStatusRequest {
                booking_status: BookingStatus::Confirmed,
                payment_status: Some(PaymentStatus::Paid),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.payment_status, PaymentStatus::Paid);

        let err = update_status(
            &state,
            &customer(Uuid::new_v4()),
            booking.id,
            UpdateStatusRequest {
                booking_status: BookingStatus::CancelledUser,
                payment_status: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}

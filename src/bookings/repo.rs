use async_trait::async_trait;
use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;

use crate::wire::{hh_mm, iso_date, text_enum};

text_enum! {
    pub enum BookingStatus {
        Pending => "pending",
        Confirmed => "confirmed",
        CancelledUser => "cancelled_user",
        CancelledHost => "cancelled_host",
        Completed => "completed",
        Rescheduled => "rescheduled",
    }
}

text_enum! {
    pub enum PaymentStatus {
        Pending => "pending",
        Paid => "paid",
        Refunded => "refunded",
        Failed => "failed",
    }
}

impl BookingStatus {
    /// Still expected to happen.
    pub fn is_active(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

/// A customer's reservation against an experience.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub experience_id: Uuid,
    pub host_id: Uuid,
    #[serde(with = "iso_date")]
    pub booking_date: Date,
    #[serde(with = "hh_mm")]
    pub booking_time: Time,
    pub number_of_guests: i32,
    pub total_price: f64,
    pub special_requests: Option<String>,
    pub booking_status: BookingStatus,
    pub payment_status: PaymentStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Booking {
    /// Customer, owning host and admins may see and change a booking.
    pub fn visible_to(&self, user_id: Uuid, host_id: Option<Uuid>, is_admin: bool) -> bool {
        is_admin || self.user_id == user_id || host_id == Some(self.host_id)
    }
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: Uuid,
    pub experience_id: Uuid,
    pub host_id: Uuid,
    pub booking_date: Date,
    pub booking_time: Time,
    pub number_of_guests: i32,
    pub total_price: f64,
    pub special_requests: Option<String>,
}

#[async_trait]
pub trait BookingRepo: Send + Sync {
    /// Inserts with `pending` booking and payment status.
    async fn insert_booking(&self, booking: NewBooking) -> anyhow::Result<Booking>;
    async fn booking_by_id(&self, id: Uuid) -> anyhow::Result<Option<Booking>>;
    async fn list_user_bookings(&self, user_id: Uuid) -> anyhow::Result<Vec<Booking>>;
    async fn list_host_bookings(
        &self,
        host_id: Uuid,
        status: Option<BookingStatus>,
    ) -> anyhow::Result<Vec<Booking>>;
    async fn set_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        payment: Option<PaymentStatus>,
    ) -> anyhow::Result<Option<Booking>>;
}

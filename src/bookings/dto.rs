use serde::Deserialize;
use time::{Date, Time};
use uuid::Uuid;

use super::repo::{BookingStatus, PaymentStatus};
use crate::wire::{hh_mm, iso_date};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub experience_id: Uuid,
    #[serde(with = "iso_date")]
    pub booking_date: Date,
    #[serde(with = "hh_mm")]
    pub booking_time: Time,
    pub number_of_guests: i32,
    pub total_price: f64,
    pub special_requests: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub booking_status: BookingStatus,
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Debug, Deserialize)]
pub struct HostBookingsQuery {
    pub status: Option<BookingStatus>,
}

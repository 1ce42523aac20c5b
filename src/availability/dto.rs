use serde::Deserialize;
use time::{Date, Time};
use uuid::Uuid;

use crate::wire::{hh_mm, iso_date};

#[derive(Debug, Clone, Deserialize)]
pub struct SlotRequest {
    pub experience_id: Option<Uuid>,
    #[serde(with = "iso_date")]
    pub available_date: Date,
    #[serde(with = "hh_mm")]
    pub start_time: Time,
    #[serde(with = "hh_mm")]
    pub end_time: Time,
    pub max_capacity: i32,
    pub price_override: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAvailabilityRequest {
    pub slots: Vec<SlotRequest>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    #[serde(default, with = "iso_date::option")]
    pub from: Option<Date>,
    #[serde(default, with = "iso_date::option")]
    pub to: Option<Date>,
    pub experience_id: Option<Uuid>,
}

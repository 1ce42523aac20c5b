use async_trait::async_trait;
use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;

use crate::wire::{hh_mm, iso_date};

/// A host-declared bookable window.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Availability {
    pub id: Uuid,
    pub host_id: Uuid,
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
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAvailability {
    pub host_id: Uuid,
    pub experience_id: Option<Uuid>,
    pub available_date: Date,
    pub start_time: Time,
    pub end_time: Time,
    pub max_capacity: i32,
    pub price_override: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AvailabilityFilter {
    pub host_id: Option<Uuid>,
    /// When set, host-wide slots (no experience) are included too.
    pub experience_id: Option<Uuid>,
    pub from: Option<Date>,
    pub to: Option<Date>,
}

impl AvailabilityFilter {
    pub fn matches(&self, slot: &Availability) -> bool {
        self.host_id.map_or(true, |h| slot.host_id == h)
            && self
                .experience_id
                .map_or(true, |e| slot.experience_id.map_or(true, |se| se == e))
            && self.from.map_or(true, |d| slot.available_date >= d)
            && self.to.map_or(true, |d| slot.available_date <= d)
    }
}

#[async_trait]
pub trait AvailabilityRepo: Send + Sync {
    /// Inserts every slot as a new row. No overlap or duplicate detection.
    async fn insert_availability(
        &self,
        slots: Vec<NewAvailability>,
    ) -> anyhow::Result<Vec<Availability>>;
    async fn list_availability(
        &self,
        filter: AvailabilityFilter,
    ) -> anyhow::Result<Vec<Availability>>;
    async fn delete_availability(&self, host_id: Uuid, id: Uuid) -> anyhow::Result<bool>;
}

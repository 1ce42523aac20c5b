use async_trait::async_trait;
use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::wire::text_enum;

text_enum! {
    pub enum ActivityType {
        JetSki => "jet_ski",
        Kayaking => "kayaking",
        Paddleboarding => "paddleboarding",
        Surfing => "surfing",
        Snorkeling => "snorkeling",
        ScubaDiving => "scuba_diving",
        Sailing => "sailing",
        BoatTour => "boat_tour",
        Fishing => "fishing",
        Wakeboarding => "wakeboarding",
        Other => "other",
    }
}

text_enum! {
    pub enum Difficulty {
        Beginner => "beginner",
        Intermediate => "intermediate",
        Advanced => "advanced",
    }
}

/// A bookable water-activity offering.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Experience {
    pub id: Uuid,
    pub host_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub activity_type: ActivityType,
    pub difficulty_level: Difficulty,
    pub price_per_person: f64,
    pub duration_hours: f64,
    pub min_guests: i32,
    pub max_guests: i32,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewExperience {
    pub host_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub activity_type: ActivityType,
    pub difficulty_level: Difficulty,
    pub price_per_person: f64,
    pub duration_hours: f64,
    pub min_guests: i32,
    pub max_guests: i32,
}

#[derive(Debug, Clone, Default)]
pub struct ExperienceChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub activity_type: Option<ActivityType>,
    pub difficulty_level: Option<Difficulty>,
    pub price_per_person: Option<f64>,
    pub duration_hours: Option<f64>,
    pub min_guests: Option<i32>,
    pub max_guests: Option<i32>,
    pub is_active: Option<bool>,
}

/// Public catalogue query. Only active experiences are listed.
#[derive(Debug, Clone, Default)]
pub struct ExperienceFilter {
    pub activity_type: Option<ActivityType>,
    pub location: Option<String>,
    pub max_price: Option<f64>,
    pub limit: i64,
    pub offset: i64,
}

#[async_trait]
pub trait ExperienceRepo: Send + Sync {
    async fn create_experience(&self, exp: NewExperience) -> anyhow::Result<Experience>;
    async fn experience_by_id(&self, id: Uuid) -> anyhow::Result<Option<Experience>>;
    async fn list_experiences(&self, filter: ExperienceFilter) -> anyhow::Result<Vec<Experience>>;
    async fn list_host_experiences(&self, host_id: Uuid) -> anyhow::Result<Vec<Experience>>;
    /// Applies `changes` only when the experience belongs to `host_id`.
    async fn update_experience(
        &self,
        host_id: Uuid,
        id: Uuid,
        changes: ExperienceChanges,
    ) -> anyhow::Result<Option<Experience>>;
}

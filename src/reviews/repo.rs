use async_trait::async_trait;
use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub experience_id: Uuid,
    pub host_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub experience_id: Uuid,
    pub host_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
}

#[async_trait]
pub trait ReviewRepo: Send + Sync {
    async fn insert_review(&self, review: NewReview) -> anyhow::Result<Review>;
    async fn review_for_booking(&self, booking_id: Uuid) -> anyhow::Result<Option<Review>>;
    async fn list_experience_reviews(&self, experience_id: Uuid) -> anyhow::Result<Vec<Review>>;
    async fn list_host_reviews(&self, host_id: Uuid) -> anyhow::Result<Vec<Review>>;
}

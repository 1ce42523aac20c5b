use async_trait::async_trait;
use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// The business behind a host account.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HostProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub is_verified: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewHostProfile {
    pub user_id: Uuid,
    pub business_name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct HostProfileChanges {
    pub business_name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
}

#[async_trait]
pub trait HostRepo: Send + Sync {
    async fn host_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<HostProfile>>;
    async fn create_host(&self, host: NewHostProfile) -> anyhow::Result<HostProfile>;
    async fn update_host(
        &self,
        host_id: Uuid,
        changes: HostProfileChanges,
    ) -> anyhow::Result<Option<HostProfile>>;
}

use axum::{extract::State, routing::get, Json, Router};
use time::OffsetDateTime;
use tracing::{debug, instrument};

use super::{dto::DashboardResponse, services::summarize};
use crate::{auth::AuthUser, error::ApiResult, hosts::current_host, state::AppState};

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/business/dashboard", get(get_dashboard))
}

#[instrument(skip(state))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<DashboardResponse>> {
    let host = current_host(&state, &user).await?;

    if let Some(cached) = state.dashboards.get(host.id).await {
        debug!(host_id = %host.id, "dashboard memo hit");
        return Ok(Json(cached));
    }

    let generation = state.dashboards.generation(host.id).await;
    let bookings = state.store.list_host_bookings(host.id, None).await?;
    let experiences = state.store.list_host_experiences(host.id).await?;
    let reviews = state.store.list_host_reviews(host.id).await?;

    let today = OffsetDateTime::now_utc().date();
    let body = summarize(&bookings, &experiences, &reviews, today);
    if !state.dashboards.insert(host.id, generation, body.clone()).await {
        debug!(host_id = %host.id, "dashboard changed while computing; not memoised");
    }
    Ok(Json(body))
}

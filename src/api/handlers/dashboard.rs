//! Dashboard overview handler

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::dto::ApiResponse;
use crate::api::handlers::gate::domain_error_response;
use crate::domain::RepositoryProvider;

/// State for dashboard handlers
#[derive(Clone)]
pub struct DashboardState {
    pub repos: Arc<dyn RepositoryProvider>,
}

/// Fleet-wide totals for the dashboard landing page
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardOverview {
    pub total_lots: u64,
    pub total_slots: u64,
    pub occupied_slots: u64,
    pub active_sessions: u64,
    /// Occupied share of all slots, percent
    pub utilization_percent: f64,
    /// Entries since midnight UTC
    pub today_entries: u64,
    /// Exits since midnight UTC
    pub today_exits: u64,
    /// Fare total of today's exits, minor currency units
    pub today_revenue: i64,
}

/// Dashboard overview
///
/// Today's counters reset at midnight UTC.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/overview",
    tag = "Dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Fleet totals", body = ApiResponse<DashboardOverview>)
    )
)]
pub async fn overview(
    State(state): State<DashboardState>,
) -> Result<Json<ApiResponse<DashboardOverview>>, (StatusCode, Json<ApiResponse<()>>)> {
    let midnight = Utc::now()
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or_else(Utc::now);

    let total_lots = state.repos.lots().count().await.map_err(domain_error_response)?;
    let slots = state.repos.slots().counts().await.map_err(domain_error_response)?;
    let counters = state
        .repos
        .sessions()
        .counters(midnight)
        .await
        .map_err(domain_error_response)?;

    let utilization_percent = if slots.total > 0 {
        (slots.occupied as f64 / slots.total as f64) * 100.0
    } else {
        0.0
    };

    Ok(Json(ApiResponse::success(DashboardOverview {
        total_lots,
        total_slots: slots.total,
        occupied_slots: slots.occupied,
        active_sessions: counters.active,
        utilization_percent,
        today_entries: counters.entries_since,
        today_exits: counters.exits_since,
        today_revenue: counters.revenue_since,
    })))
}

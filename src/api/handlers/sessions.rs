//! Session listing for the dashboard

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::api::dto::{ApiResponse, PaginatedResponse, SessionDto};
use crate::api::handlers::gate::domain_error_response;
use crate::domain::models::normalize_plate;
use crate::domain::{RepositoryProvider, SessionFilter, SessionStatus};

/// State for session handlers
#[derive(Clone)]
pub struct SessionAdminState {
    pub repos: Arc<dyn RepositoryProvider>,
}

/// Session list filters
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct SessionQuery {
    /// `IN` or `OUT`
    pub status: Option<String>,
    pub plate_number: Option<String>,
    pub lot_id: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    50
}

/// List parking sessions
///
/// Newest first. Filterable by status, plate and lot.
#[utoipa::path(
    get,
    path = "/api/v1/sessions",
    tag = "Sessions",
    security(("bearer_auth" = [])),
    params(SessionQuery),
    responses(
        (status = 200, description = "One page of sessions", body = ApiResponse<PaginatedResponse<SessionDto>>),
        (status = 400, description = "Unknown status filter")
    )
)]
pub async fn list_sessions(
    State(state): State<SessionAdminState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<SessionDto>>>, (StatusCode, Json<ApiResponse<()>>)>
{
    let status = match &query.status {
        None => None,
        Some(s) => match SessionStatus::from_str(s) {
            Some(st) => Some(st),
            None => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::error(format!("Unknown status: {}", s))),
                ));
            }
        },
    };

    let filter = SessionFilter {
        status,
        plate_number: query
            .plate_number
            .as_deref()
            .map(normalize_plate)
            .filter(|p| !p.is_empty()),
        lot_id: query.lot_id.clone(),
    };

    let limit = query.limit.clamp(1, 100);
    let (sessions, total) = state
        .repos
        .sessions()
        .list(filter, query.page as u64, limit as u64)
        .await
        .map_err(domain_error_response)?;

    let items = sessions.into_iter().map(SessionDto::from).collect();
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, total, query.page, limit,
    ))))
}

//! Mobile-app handlers: lots, vehicles and session history

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::api::dto::{
    ApiResponse, LotDto, PaginatedResponse, PaginationParams, SessionDto,
};
use crate::api::handlers::gate::domain_error_response;
use crate::auth::middleware::AuthenticatedUser;
use crate::domain::models::normalize_plate;
use crate::domain::{DomainError, RepositoryProvider};

/// State for app handlers
#[derive(Clone)]
pub struct AppState {
    pub repos: Arc<dyn RepositoryProvider>,
}

type HandlerError = (StatusCode, Json<ApiResponse<()>>);

/// Plate link request
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({ "plate_number": "34 ABC 123" }))]
pub struct LinkVehicleRequest {
    pub plate_number: String,
}

async fn lot_dto(
    repos: &Arc<dyn RepositoryProvider>,
    lot: crate::domain::ParkingLot,
) -> Result<LotDto, DomainError> {
    let available = repos.slots().count_available_for_lot(&lot.id, None).await?;
    let created = repos.slots().count_for_lot(&lot.id).await?;
    Ok(LotDto::from_domain(lot, available, created))
}

/// Active lots with availability
#[utoipa::path(
    get,
    path = "/api/v1/app/lots",
    tag = "App",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Open lots", body = ApiResponse<Vec<LotDto>>)
    )
)]
pub async fn app_list_lots(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<LotDto>>>, HandlerError> {
    let lots = state
        .repos
        .lots()
        .list(true)
        .await
        .map_err(domain_error_response)?;
    let mut dtos = Vec::with_capacity(lots.len());
    for lot in lots {
        dtos.push(lot_dto(&state.repos, lot).await.map_err(domain_error_response)?);
    }
    Ok(Json(ApiResponse::success(dtos)))
}

/// One lot with availability
#[utoipa::path(
    get,
    path = "/api/v1/app/lots/{id}",
    tag = "App",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Lot id")),
    responses(
        (status = 200, description = "Lot details", body = ApiResponse<LotDto>),
        (status = 404, description = "Unknown lot")
    )
)]
pub async fn app_get_lot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<LotDto>>, HandlerError> {
    let lot = state
        .repos
        .lots()
        .find_by_id(&id)
        .await
        .map_err(domain_error_response)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("Parking lot not found")),
            )
        })?;
    let dto = lot_dto(&state.repos, lot)
        .await
        .map_err(domain_error_response)?;
    Ok(Json(ApiResponse::success(dto)))
}

/// Link a vehicle plate to the current user
///
/// Plates are globally unique: a plate already linked to any account is
/// rejected with 409.
#[utoipa::path(
    post,
    path = "/api/v1/app/vehicles",
    tag = "App",
    security(("bearer_auth" = [])),
    request_body = LinkVehicleRequest,
    responses(
        (status = 200, description = "Updated plate list", body = ApiResponse<Vec<String>>),
        (status = 400, description = "Empty plate"),
        (status = 409, description = "Plate already linked")
    )
)]
pub async fn link_vehicle(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<LinkVehicleRequest>,
) -> Result<Json<ApiResponse<Vec<String>>>, HandlerError> {
    let plate = normalize_plate(&request.plate_number);
    if plate.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("plate_number is required")),
        ));
    }

    let plates = state
        .repos
        .users()
        .link_plate(&user.user_id, &plate)
        .await
        .map_err(domain_error_response)?;
    Ok(Json(ApiResponse::success(plates)))
}

/// Unlink a vehicle plate from the current user
#[utoipa::path(
    delete,
    path = "/api/v1/app/vehicles/{plate}",
    tag = "App",
    security(("bearer_auth" = [])),
    params(("plate" = String, Path, description = "Plate number")),
    responses(
        (status = 200, description = "Updated plate list", body = ApiResponse<Vec<String>>),
        (status = 404, description = "Plate not linked to this account")
    )
)]
pub async fn unlink_vehicle(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(plate): Path<String>,
) -> Result<Json<ApiResponse<Vec<String>>>, HandlerError> {
    let plate = normalize_plate(&plate);
    let plates = state
        .repos
        .users()
        .unlink_plate(&user.user_id, &plate)
        .await
        .map_err(domain_error_response)?;
    Ok(Json(ApiResponse::success(plates)))
}

async fn user_plates(
    state: &AppState,
    user_id: &str,
) -> Result<Vec<String>, HandlerError> {
    let user = state
        .repos
        .users()
        .find_by_id(user_id)
        .await
        .map_err(domain_error_response)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("User not found")),
            )
        })?;
    Ok(user.vehicle_plates)
}

/// Active sessions for the current user's vehicles
#[utoipa::path(
    get,
    path = "/api/v1/app/sessions/active",
    tag = "App",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Currently parked vehicles", body = ApiResponse<Vec<SessionDto>>)
    )
)]
pub async fn app_active_sessions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<SessionDto>>>, HandlerError> {
    let plates = user_plates(&state, &user.user_id).await?;
    let sessions = state
        .repos
        .sessions()
        .find_active_for_plates(&plates)
        .await
        .map_err(domain_error_response)?;
    Ok(Json(ApiResponse::success(
        sessions.into_iter().map(SessionDto::from).collect(),
    )))
}

/// Session history for the current user's vehicles
#[utoipa::path(
    get,
    path = "/api/v1/app/sessions/history",
    tag = "App",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "Past and current sessions, newest first", body = ApiResponse<PaginatedResponse<SessionDto>>)
    )
)]
pub async fn app_session_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PaginatedResponse<SessionDto>>>, HandlerError> {
    let plates = user_plates(&state, &user.user_id).await?;
    let limit = params.limit.clamp(1, 100);
    let (sessions, total) = state
        .repos
        .sessions()
        .list_for_plates(&plates, params.page as u64, limit as u64)
        .await
        .map_err(domain_error_response)?;
    let items = sessions.into_iter().map(SessionDto::from).collect();
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, total, params.page, limit,
    ))))
}

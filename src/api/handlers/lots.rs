//! Parking lot administration handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::api::dto::{ApiResponse, LotDto, SessionDto, SlotDto};
use crate::api::handlers::gate::domain_error_response;
use crate::domain::{DomainError, ParkingLot, Pricing, RepositoryProvider, VehicleType};

/// State for lot administration handlers
#[derive(Clone)]
pub struct LotAdminState {
    pub repos: Arc<dyn RepositoryProvider>,
}

type HandlerError = (StatusCode, Json<ApiResponse<()>>);

/// Lot creation request
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({
    "name": "Airport P1",
    "code": "APT1",
    "total_slots": 120,
    "rate_per_hour": 60,
    "free_minutes": 15,
    "address": "Terminal 1"
}))]
pub struct CreateLotRequest {
    pub name: String,
    /// Short unique code used by gate hardware
    pub code: String,
    pub total_slots: i32,
    /// Fare per hour in minor currency units
    pub rate_per_hour: i64,
    /// Free parking window in minutes. Default: 0
    #[serde(default)]
    pub free_minutes: i64,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Lot activation toggle
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLotRequest {
    pub is_active: bool,
}

/// Bulk slot creation request
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({ "count": 100, "vehicle_type": "Car" }))]
pub struct CreateSlotsRequest {
    pub count: i32,
    /// `Car` (default) or `Bike`
    pub vehicle_type: Option<String>,
}

async fn enrich(
    repos: &Arc<dyn RepositoryProvider>,
    lot: ParkingLot,
) -> Result<LotDto, DomainError> {
    let available = repos.slots().count_available_for_lot(&lot.id, None).await?;
    let created = repos.slots().count_for_lot(&lot.id).await?;
    Ok(LotDto::from_domain(lot, available, created))
}

/// Create a parking lot
///
/// Slots are provisioned separately via the bulk endpoint.
#[utoipa::path(
    post,
    path = "/api/v1/lots",
    tag = "Lots",
    security(("bearer_auth" = [])),
    request_body = CreateLotRequest,
    responses(
        (status = 201, description = "Lot created", body = ApiResponse<LotDto>),
        (status = 400, description = "Validation failure"),
        (status = 409, description = "Lot code already in use")
    )
)]
pub async fn create_lot(
    State(state): State<LotAdminState>,
    Json(request): Json<CreateLotRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LotDto>>), HandlerError> {
    if request.name.trim().is_empty() || request.code.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Name and code are required")),
        ));
    }
    if request.total_slots <= 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("total_slots must be positive")),
        ));
    }
    if request.rate_per_hour < 0 || request.free_minutes < 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Pricing must be non-negative")),
        ));
    }

    let now = Utc::now();
    let lot = ParkingLot {
        id: uuid::Uuid::new_v4().to_string(),
        name: request.name.trim().to_string(),
        code: request.code.trim().to_uppercase(),
        total_slots: request.total_slots,
        pricing: Pricing {
            rate_per_hour: request.rate_per_hour,
            free_minutes: request.free_minutes,
        },
        address: request.address,
        latitude: request.latitude,
        longitude: request.longitude,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    let created = state
        .repos
        .lots()
        .create(lot)
        .await
        .map_err(domain_error_response)?;
    let dto = enrich(&state.repos, created)
        .await
        .map_err(domain_error_response)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(dto))))
}

/// List parking lots with live occupancy
#[utoipa::path(
    get,
    path = "/api/v1/lots",
    tag = "Lots",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All lots", body = ApiResponse<Vec<LotDto>>)
    )
)]
pub async fn list_lots(
    State(state): State<LotAdminState>,
) -> Result<Json<ApiResponse<Vec<LotDto>>>, HandlerError> {
    let lots = state
        .repos
        .lots()
        .list(false)
        .await
        .map_err(domain_error_response)?;

    let mut dtos = Vec::with_capacity(lots.len());
    for lot in lots {
        dtos.push(enrich(&state.repos, lot).await.map_err(domain_error_response)?);
    }
    Ok(Json(ApiResponse::success(dtos)))
}

/// Get one parking lot
#[utoipa::path(
    get,
    path = "/api/v1/lots/{id}",
    tag = "Lots",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Lot id")),
    responses(
        (status = 200, description = "Lot with occupancy", body = ApiResponse<LotDto>),
        (status = 404, description = "Unknown lot")
    )
)]
pub async fn get_lot(
    State(state): State<LotAdminState>,
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
    let dto = enrich(&state.repos, lot)
        .await
        .map_err(domain_error_response)?;
    Ok(Json(ApiResponse::success(dto)))
}

/// Open or close a parking lot
///
/// A closed lot denies all entries; vehicles already inside can still
/// exit.
#[utoipa::path(
    patch,
    path = "/api/v1/lots/{id}",
    tag = "Lots",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Lot id")),
    request_body = UpdateLotRequest,
    responses(
        (status = 200, description = "Updated lot", body = ApiResponse<LotDto>),
        (status = 404, description = "Unknown lot")
    )
)]
pub async fn update_lot(
    State(state): State<LotAdminState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateLotRequest>,
) -> Result<Json<ApiResponse<LotDto>>, HandlerError> {
    let lot = state
        .repos
        .lots()
        .set_active(&id, request.is_active)
        .await
        .map_err(domain_error_response)?;
    let dto = enrich(&state.repos, lot)
        .await
        .map_err(domain_error_response)?;
    Ok(Json(ApiResponse::success(dto)))
}

/// Bulk-create slots for a lot
///
/// Numbering continues after the highest existing slot, so car and bike
/// batches can be provisioned in sequence.
#[utoipa::path(
    post,
    path = "/api/v1/lots/{id}/slots",
    tag = "Lots",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Lot id")),
    request_body = CreateSlotsRequest,
    responses(
        (status = 201, description = "Created slots", body = ApiResponse<Vec<SlotDto>>),
        (status = 400, description = "Invalid count or vehicle type"),
        (status = 404, description = "Unknown lot")
    )
)]
pub async fn create_slots(
    State(state): State<LotAdminState>,
    Path(id): Path<String>,
    Json(request): Json<CreateSlotsRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<SlotDto>>>), HandlerError> {
    if request.count <= 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("count must be positive")),
        ));
    }
    let vehicle_type = match &request.vehicle_type {
        None => VehicleType::Car,
        Some(s) => VehicleType::from_str(s).ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(format!("Unknown vehicle type: {}", s))),
            )
        })?,
    };

    let lot = state
        .repos
        .lots()
        .find_by_id(&id)
        .await
        .map_err(domain_error_response)?;
    if lot.is_none() {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Parking lot not found")),
        ));
    }

    let slots = state
        .repos
        .slots()
        .bulk_create(&id, request.count, vehicle_type)
        .await
        .map_err(domain_error_response)?;
    let dtos = slots.into_iter().map(SlotDto::from).collect();
    Ok((StatusCode::CREATED, Json(ApiResponse::success(dtos))))
}

/// List slots of a lot
#[utoipa::path(
    get,
    path = "/api/v1/lots/{id}/slots",
    tag = "Lots",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Lot id")),
    responses(
        (status = 200, description = "Slots ordered by number", body = ApiResponse<Vec<SlotDto>>)
    )
)]
pub async fn list_slots(
    State(state): State<LotAdminState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<SlotDto>>>, HandlerError> {
    let slots = state
        .repos
        .slots()
        .list_for_lot(&id)
        .await
        .map_err(domain_error_response)?;
    Ok(Json(ApiResponse::success(
        slots.into_iter().map(SlotDto::from).collect(),
    )))
}

/// Active session parked on a slot
#[utoipa::path(
    get,
    path = "/api/v1/lots/{id}/slots/{slot_number}/session",
    tag = "Lots",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Lot id"),
        ("slot_number" = i32, Path, description = "Slot number")
    ),
    responses(
        (status = 200, description = "Active session on the slot", body = ApiResponse<SessionDto>),
        (status = 404, description = "No vehicle on this slot")
    )
)]
pub async fn get_slot_session(
    State(state): State<LotAdminState>,
    Path((id, slot_number)): Path<(String, i32)>,
) -> Result<Json<ApiResponse<SessionDto>>, HandlerError> {
    let session = state
        .repos
        .sessions()
        .find_active_by_slot(&id, slot_number)
        .await
        .map_err(domain_error_response)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("No active session on this slot")),
            )
        })?;
    Ok(Json(ApiResponse::success(session.into())))
}

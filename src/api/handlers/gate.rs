//! Gate hardware endpoints: entry and exit events
//!
//! Denials are 200 responses with `success: false` and a DENY action so
//! the gate controller always gets a directive. Errors (unknown lot, bad
//! payload, storage failure) map to HTTP status codes.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::api::dto::ApiResponse;
use crate::application::services::parking::{EntryOutcome, ExitOutcome};
use crate::application::ParkingService;
use crate::domain::{DomainError, VehicleType};

/// State for gate handlers
#[derive(Clone)]
pub struct GateState {
    pub parking: Arc<ParkingService>,
}

/// Entry gate event
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({
    "plate_number": "34 ABC 123",
    "lot_id": "lot-airport",
    "vehicle_type": "Car"
}))]
pub struct EntryRequest {
    /// Plate as read at the gate; normalized server-side
    pub plate_number: String,
    pub lot_id: String,
    /// `Car` (default) or `Bike`
    pub vehicle_type: Option<String>,
}

/// Exit gate event
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({
    "plate_number": "34 ABC 123",
    "lot_id": "lot-airport"
}))]
pub struct ExitRequest {
    pub plate_number: String,
    pub lot_id: String,
}

pub(crate) fn parse_vehicle_type(
    raw: &Option<String>,
) -> Result<Option<VehicleType>, (StatusCode, Json<ApiResponse<()>>)> {
    match raw {
        None => Ok(None),
        Some(s) => match VehicleType::from_str(s) {
            Some(vt) => Ok(Some(vt)),
            None => Err((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(format!("Unknown vehicle type: {}", s))),
            )),
        },
    }
}

pub(crate) fn domain_error_response(e: DomainError) -> (StatusCode, Json<ApiResponse<()>>) {
    let status = match &e {
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::InsufficientFunds => StatusCode::PAYMENT_REQUIRED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ApiResponse::error(e.to_string())))
}

/// Vehicle entry event
///
/// Allocates the lowest free slot and opens a session. A full lot, a
/// closed lot or a vehicle already inside yields a DENY_ENTRY outcome.
#[utoipa::path(
    post,
    path = "/api/v1/gate/entry",
    tag = "Gate",
    request_body = EntryRequest,
    responses(
        (status = 200, description = "Gate directive (open or deny)", body = EntryOutcome),
        (status = 400, description = "Missing plate or unknown vehicle type"),
        (status = 404, description = "Unknown parking lot")
    )
)]
pub async fn gate_entry(
    State(state): State<GateState>,
    Json(request): Json<EntryRequest>,
) -> Result<Json<EntryOutcome>, (StatusCode, Json<ApiResponse<()>>)> {
    let vehicle_type = parse_vehicle_type(&request.vehicle_type)?;
    let outcome = state
        .parking
        .handle_entry(&request.plate_number, &request.lot_id, vehicle_type)
        .await
        .map_err(domain_error_response)?;
    Ok(Json(outcome))
}

/// Vehicle exit event
///
/// Closes the active session, computes the fare, attempts the wallet
/// debit and frees the slot. No active session yields DENY_EXIT.
#[utoipa::path(
    post,
    path = "/api/v1/gate/exit",
    tag = "Gate",
    request_body = ExitRequest,
    responses(
        (status = 200, description = "Gate directive (open or deny)", body = ExitOutcome),
        (status = 400, description = "Missing plate"),
        (status = 404, description = "Unknown parking lot")
    )
)]
pub async fn gate_exit(
    State(state): State<GateState>,
    Json(request): Json<ExitRequest>,
) -> Result<Json<ExitOutcome>, (StatusCode, Json<ApiResponse<()>>)> {
    let outcome = state
        .parking
        .handle_exit(&request.plate_number, &request.lot_id)
        .await
        .map_err(domain_error_response)?;
    Ok(Json(outcome))
}

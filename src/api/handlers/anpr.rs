//! ANPR endpoints: camera image in, gate directive out
//!
//! The image is forwarded to the plate-detection service; the best
//! usable read drives the same entry/exit flows as the plain gate
//! endpoints. The detection that was acted on is echoed back so camera
//! operators can audit misreads.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::dto::ApiResponse;
use crate::api::handlers::gate::{domain_error_response, parse_vehicle_type};
use crate::application::services::parking::{EntryOutcome, ExitOutcome};
use crate::application::{best_plate, ParkingService, PlateDetection, PlateDetector};

/// State for ANPR handlers
#[derive(Clone)]
pub struct AnprState {
    pub parking: Arc<ParkingService>,
    /// Absent when no detection service is configured
    pub detector: Option<Arc<dyn PlateDetector>>,
}

/// Plate read echoed in ANPR responses
#[derive(Debug, Serialize, ToSchema)]
pub struct DetectionDto {
    pub plate: String,
    pub confidence: f64,
    pub raw_text: Option<String>,
}

impl From<&PlateDetection> for DetectionDto {
    fn from(d: &PlateDetection) -> Self {
        Self {
            plate: d.plate.clone(),
            confidence: d.confidence,
            raw_text: d.raw_text.clone(),
        }
    }
}

/// Entry directive plus the detection it was based on
#[derive(Debug, Serialize, ToSchema)]
pub struct AnprEntryResponse {
    #[serde(flatten)]
    pub outcome: EntryOutcome,
    pub detection: DetectionDto,
}

/// Exit directive plus the detection it was based on
#[derive(Debug, Serialize, ToSchema)]
pub struct AnprExitResponse {
    #[serde(flatten)]
    pub outcome: ExitOutcome,
    pub detection: DetectionDto,
}

struct AnprUpload {
    image: Vec<u8>,
    filename: String,
    lot_id: Option<String>,
    vehicle_type: Option<String>,
}

type HandlerError = (StatusCode, Json<ApiResponse<()>>);

fn bad_request(message: impl Into<String>) -> HandlerError {
    (StatusCode::BAD_REQUEST, Json(ApiResponse::error(message)))
}

async fn read_upload(mut multipart: Multipart) -> Result<AnprUpload, HandlerError> {
    let mut upload = AnprUpload {
        image: Vec::new(),
        filename: "capture.jpg".to_string(),
        lot_id: None,
        vehicle_type: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Invalid multipart body: {}", e)))?
    {
        match field.name() {
            Some("image") => {
                if let Some(name) = field.file_name() {
                    upload.filename = name.to_string();
                }
                upload.image = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read image: {}", e)))?
                    .to_vec();
            }
            Some("lot_id") => {
                upload.lot_id = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| bad_request(format!("Invalid lot_id field: {}", e)))?,
                );
            }
            Some("vehicle_type") => {
                upload.vehicle_type = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| bad_request(format!("Invalid vehicle_type field: {}", e)))?,
                );
            }
            _ => {}
        }
    }

    if upload.image.is_empty() {
        return Err(bad_request("Missing image part"));
    }
    Ok(upload)
}

async fn detect_best(
    state: &AnprState,
    image: Vec<u8>,
    filename: &str,
) -> Result<(Vec<PlateDetection>, usize), HandlerError> {
    let Some(detector) = &state.detector else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse::error("Plate detection is not configured")),
        ));
    };

    let detections = detector
        .detect(image, filename)
        .await
        .map_err(domain_error_response)?;
    let best = best_plate(&detections)
        .ok_or_else(|| bad_request("No valid plate detected"))?;
    let index = detections
        .iter()
        .position(|d| std::ptr::eq(d, best))
        .unwrap_or(0);
    Ok((detections, index))
}

/// Standalone plate detection
///
/// Runs the image through the detection service and returns every
/// candidate without touching any session.
#[utoipa::path(
    post,
    path = "/api/v1/anpr/detect",
    tag = "ANPR",
    responses(
        (status = 200, description = "Detection candidates", body = ApiResponse<Vec<DetectionDto>>),
        (status = 400, description = "Missing or unreadable image"),
        (status = 503, description = "Detection service not configured")
    )
)]
pub async fn anpr_detect(
    State(state): State<AnprState>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<Vec<DetectionDto>>>, HandlerError> {
    let upload = read_upload(multipart).await?;
    let Some(detector) = &state.detector else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse::error("Plate detection is not configured")),
        ));
    };
    let detections = detector
        .detect(upload.image, &upload.filename)
        .await
        .map_err(domain_error_response)?;
    let dtos = detections.iter().map(DetectionDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// Camera-driven entry
///
/// Detects the plate, then runs the entry flow for it.
#[utoipa::path(
    post,
    path = "/api/v1/anpr/entry",
    tag = "ANPR",
    responses(
        (status = 200, description = "Gate directive with the acted-on detection", body = AnprEntryResponse),
        (status = 400, description = "Missing image, missing lot_id or no usable plate"),
        (status = 404, description = "Unknown parking lot"),
        (status = 503, description = "Detection service not configured")
    )
)]
pub async fn anpr_entry(
    State(state): State<AnprState>,
    multipart: Multipart,
) -> Result<Json<AnprEntryResponse>, HandlerError> {
    let upload = read_upload(multipart).await?;
    let lot_id = upload
        .lot_id
        .clone()
        .ok_or_else(|| bad_request("Missing lot_id part"))?;
    let vehicle_type = parse_vehicle_type(&upload.vehicle_type)?;

    let (detections, best) = detect_best(&state, upload.image, &upload.filename).await?;
    let detection = DetectionDto::from(&detections[best]);

    let outcome = state
        .parking
        .handle_entry(&detection.plate, &lot_id, vehicle_type)
        .await
        .map_err(domain_error_response)?;
    Ok(Json(AnprEntryResponse { outcome, detection }))
}

/// Camera-driven exit
///
/// Detects the plate, then runs the exit flow for it.
#[utoipa::path(
    post,
    path = "/api/v1/anpr/exit",
    tag = "ANPR",
    responses(
        (status = 200, description = "Gate directive with the acted-on detection", body = AnprExitResponse),
        (status = 400, description = "Missing image, missing lot_id or no usable plate"),
        (status = 404, description = "Unknown parking lot"),
        (status = 503, description = "Detection service not configured")
    )
)]
pub async fn anpr_exit(
    State(state): State<AnprState>,
    multipart: Multipart,
) -> Result<Json<AnprExitResponse>, HandlerError> {
    let upload = read_upload(multipart).await?;
    let lot_id = upload
        .lot_id
        .clone()
        .ok_or_else(|| bad_request("Missing lot_id part"))?;

    let (detections, best) = detect_best(&state, upload.image, &upload.filename).await?;
    let detection = DetectionDto::from(&detections[best]);

    let outcome = state
        .parking
        .handle_exit(&detection.plate, &lot_id)
        .await
        .map_err(domain_error_response)?;
    Ok(Json(AnprExitResponse { outcome, detection }))
}

//! Outbound ports: collaborators the application calls but does not own

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::DomainResult;

/// Push message for an app user
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Structured payload the app uses for deep links
    pub data: Value,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>, data: Value) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            data,
        }
    }
}

/// Fire-and-forget push delivery.
///
/// Implementations must never propagate failures to the caller; a failed
/// delivery is logged and reported as `false`. The coordinator invokes this
/// from detached tasks so the gate response is never delayed by it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user_id: &str, notification: Notification) -> bool;
}

/// No-op delivery used when no push endpoint is configured.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, user_id: &str, notification: Notification) -> bool {
        tracing::debug!(
            user_id,
            title = %notification.title,
            "push delivery disabled, dropping notification"
        );
        false
    }
}

/// One plate candidate returned by the detection service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlateDetection {
    pub plate: String,
    pub confidence: f64,
    /// "OK" for usable reads; anything else is discarded
    pub status: String,
    pub raw_text: Option<String>,
}

/// External plate-detection service (ANPR).
///
/// Detection failures abort only the ANPR flow; the parking coordinator is
/// never invoked without a plate.
#[async_trait]
pub trait PlateDetector: Send + Sync {
    async fn detect(&self, image: Vec<u8>, filename: &str) -> DomainResult<Vec<PlateDetection>>;
}

/// Pick the highest-confidence detection with status "OK".
pub fn best_plate(detections: &[PlateDetection]) -> Option<&PlateDetection> {
    detections
        .iter()
        .filter(|d| d.status == "OK" && !d.plate.trim().is_empty())
        .max_by(|a, b| {
            a.confidence
                .partial_cmp(&b.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(plate: &str, confidence: f64, status: &str) -> PlateDetection {
        PlateDetection {
            plate: plate.to_string(),
            confidence,
            status: status.to_string(),
            raw_text: None,
        }
    }

    #[test]
    fn test_best_plate_picks_highest_confidence_ok() {
        let detections = vec![
            det("KA01AB1234", 0.71, "OK"),
            det("KA01AB1284", 0.94, "OK"),
            det("??", 0.99, "LOW_QUALITY"),
        ];
        assert_eq!(best_plate(&detections).unwrap().plate, "KA01AB1284");
    }

    #[test]
    fn test_best_plate_none_when_no_usable_detection() {
        assert!(best_plate(&[]).is_none());
        assert!(best_plate(&[det("", 0.9, "OK")]).is_none());
        assert!(best_plate(&[det("KA01AB1234", 0.9, "FAILED")]).is_none());
    }
}

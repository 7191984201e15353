//! HTTP client for the external plate-detection (ANPR) service

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::application::{PlateDetection, PlateDetector};
use crate::domain::{DomainError, DomainResult};

/// Response body of POST {base_url}/detect
#[derive(Debug, Deserialize)]
struct DetectResponse {
    #[serde(default)]
    plates: Vec<DetectedPlate>,
}

#[derive(Debug, Deserialize)]
struct DetectedPlate {
    plate: String,
    confidence: f64,
    status: String,
    raw_text: Option<String>,
}

pub struct AnprClient {
    http: reqwest::Client,
    base_url: String,
}

impl AnprClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PlateDetector for AnprClient {
    async fn detect(&self, image: Vec<u8>, filename: &str) -> DomainResult<Vec<PlateDetection>> {
        let part = multipart::Part::bytes(image)
            .file_name(filename.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| DomainError::Validation(format!("bad image part: {}", e)))?;
        let form = multipart::Form::new().part("image", part);

        let url = format!("{}/detect", self.base_url);
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "plate detection request failed");
                DomainError::Database(format!("plate detection unreachable: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(%status, "plate detection returned an error status");
            return Err(DomainError::Database(format!(
                "plate detection failed with status {}",
                status
            )));
        }

        let body: DetectResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "plate detection returned an unreadable body");
            DomainError::Database(format!("plate detection response invalid: {}", e))
        })?;

        debug!(candidates = body.plates.len(), "plate detection completed");
        Ok(body
            .plates
            .into_iter()
            .map(|p| PlateDetection {
                plate: p.plate,
                confidence: p.confidence,
                status: p.status,
                raw_text: p.raw_text,
            })
            .collect())
    }
}

//! HTTP push delivery backed by a device-token gateway
//!
//! Looks up the recipient's device token, posts the message to the
//! configured gateway, and drops tokens the gateway reports as stale.
//! Delivery failures are logged, never propagated.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use crate::application::{Notification, Notifier};
use crate::domain::repositories::RepositoryProvider;

pub struct PushClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    repos: Arc<dyn RepositoryProvider>,
}

impl PushClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        repos: Arc<dyn RepositoryProvider>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            repos,
        }
    }
}

#[async_trait]
impl Notifier for PushClient {
    async fn notify(&self, user_id: &str, notification: Notification) -> bool {
        let token = match self.repos.users().find_by_id(user_id).await {
            Ok(Some(user)) => user.fcm_token,
            Ok(None) => {
                debug!(user_id, "push skipped, user not found");
                return false;
            }
            Err(e) => {
                warn!(user_id, error = %e, "push skipped, user lookup failed");
                return false;
            }
        };
        let Some(token) = token else {
            debug!(user_id, "push skipped, no device token registered");
            return false;
        };

        let payload = json!({
            "to": token,
            "notification": {
                "title": notification.title,
                "body": notification.body,
            },
            "data": notification.data,
        });

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(r) if r.status().is_success() => {
                debug!(user_id, "push delivered");
                true
            }
            Ok(r) if r.status() == reqwest::StatusCode::NOT_FOUND || r.status() == reqwest::StatusCode::GONE => {
                // the gateway no longer knows this token
                warn!(user_id, "device token stale, clearing");
                if let Err(e) = self.repos.users().clear_fcm_token_by_value(&token).await {
                    warn!(user_id, error = %e, "failed to clear stale device token");
                }
                false
            }
            Ok(r) => {
                warn!(user_id, status = %r.status(), "push delivery rejected");
                false
            }
            Err(e) => {
                warn!(user_id, error = %e, "push delivery failed");
                false
            }
        }
    }
}

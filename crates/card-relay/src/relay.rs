//! Delivery of rendered cards to downstream webhooks.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};

use crate::error::{ConfigError, RelayError};

/// Trait for card delivery backends.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Relay: Send + Sync {
    /// Get the name of this relay, for logs.
    fn name(&self) -> &'static str;

    /// POST `payload` to `destination` once. Any non-2xx answer is an error.
    async fn deliver(&self, destination: &str, payload: Vec<u8>) -> Result<(), RelayError>;
}

/// Relay backed by a pooled HTTP client with a bounded request timeout.
#[derive(Debug, Clone)]
pub struct WebhookRelay {
    client: reqwest::Client,
}

impl WebhookRelay {
    /// Create a relay whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("card-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Relay for WebhookRelay {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn deliver(&self, destination: &str, payload: Vec<u8>) -> Result<(), RelayError> {
        let bytes = payload.len();
        let response = self
            .client
            .post(destination)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(relay = "webhook", %status, bytes, "Card delivered");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        warn!(
            relay = "webhook",
            %status,
            body = %body,
            "Webhook rejected card"
        );
        Err(RelayError::Status { status })
    }
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{NotificationAdapter, SendResult};
use crate::error::NotificationError;
use crate::types::{Channel, Payload};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts JSON payloads to a chat webhook (Slack, Teams or Chime).
pub struct WebhookAdapter {
    http_client: Client,
    url: String,
}

impl WebhookAdapter {
    pub fn new(url: impl Into<String>) -> Self {
        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self::with_client(http_client, url)
    }

    pub fn with_client(http_client: Client, url: impl Into<String>) -> Self {
        Self {
            http_client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl NotificationAdapter for WebhookAdapter {
    async fn send(&self, payload: &Payload) -> Result<SendResult, NotificationError> {
        let Payload::Json(body) = payload else {
            return Err(NotificationError::UnsupportedPayload {
                channel: "webhook",
                payload: payload.kind(),
            });
        };

        let response = self
            .http_client
            .post(&self.url)
            .json(body)
            .send()
            .await
            .map_err(|e| NotificationError::send_failed(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(SendResult::delivered(None))
        } else {
            let error = response.text().await.unwrap_or_default();
            Ok(SendResult::failed(format!(
                "Webhook failed ({}): {}",
                status.as_u16(),
                error
            )))
        }
    }

    fn supports(&self, channel: Channel) -> bool {
        matches!(
            channel,
            Channel::SlackWebhook | Channel::SlackWorkflow | Channel::Teams | Channel::Chime
        )
    }
}

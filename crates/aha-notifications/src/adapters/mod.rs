pub mod email;
pub mod eventbridge;
pub mod webhook;

use async_trait::async_trait;

use crate::error::NotificationError;
use crate::types::{Channel, Payload};

/// Result of sending a notification
#[derive(Debug)]
pub struct SendResult {
    pub success: bool,
    pub external_id: Option<String>,
    pub error: Option<String>,
}

impl SendResult {
    pub fn delivered(external_id: Option<String>) -> Self {
        Self {
            success: true,
            external_id,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            external_id: None,
            error: Some(error.into()),
        }
    }
}

/// Adapter for delivering a rendered payload to one destination
#[async_trait]
pub trait NotificationAdapter: Send + Sync {
    /// Send a rendered payload
    async fn send(&self, payload: &Payload) -> Result<SendResult, NotificationError>;

    /// Check if adapter can deliver this channel's payloads
    fn supports(&self, channel: Channel) -> bool;
}

pub use email::{EmailAdapter, EmailTransport, SmtpSettings};
pub use eventbridge::EventBridgeAdapter;
pub use webhook::WebhookAdapter;

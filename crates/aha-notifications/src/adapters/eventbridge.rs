use async_trait::async_trait;
use aws_sdk_eventbridge::Client;
use aws_sdk_eventbridge::error::DisplayErrorContext;
use aws_sdk_eventbridge::types::PutEventsRequestEntry;
use tracing::debug;

use super::{NotificationAdapter, SendResult};
use crate::error::NotificationError;
use crate::types::{Channel, Payload};

/// Detail size limit for a single PutEvents entry
pub const MAX_ENTRY_BYTES: usize = 256 * 1024;

/// Puts bus entries on a named EventBridge bus.
pub struct EventBridgeAdapter {
    client: Client,
    bus_name: String,
}

impl EventBridgeAdapter {
    pub fn new(client: Client, bus_name: impl Into<String>) -> Self {
        Self {
            client,
            bus_name: bus_name.into(),
        }
    }
}

#[async_trait]
impl NotificationAdapter for EventBridgeAdapter {
    async fn send(&self, payload: &Payload) -> Result<SendResult, NotificationError> {
        let Payload::BusEvent {
            source,
            detail_type,
            detail,
        } = payload
        else {
            return Err(NotificationError::UnsupportedPayload {
                channel: "eventbridge",
                payload: payload.kind(),
            });
        };

        debug!(
            bus = %self.bus_name,
            size_kb = detail.len() / 1024,
            "Putting event bus entry"
        );
        if detail.len() > MAX_ENTRY_BYTES {
            return Ok(SendResult::failed(format!(
                "Entry detail is {} bytes, over the {} byte limit",
                detail.len(),
                MAX_ENTRY_BYTES
            )));
        }

        let entry = PutEventsRequestEntry::builder()
            .source(source)
            .detail_type(detail_type)
            .detail(detail)
            .event_bus_name(&self.bus_name)
            .build();

        let output = self
            .client
            .put_events()
            .entries(entry)
            .send()
            .await
            .map_err(|e| {
                NotificationError::send_failed(format!(
                    "PutEvents to {} failed: {}",
                    self.bus_name,
                    DisplayErrorContext(&e)
                ))
            })?;

        let result = output.entries().first();
        if output.failed_entry_count() > 0 {
            let (code, message) = result
                .map(|r| (r.error_code().unwrap_or("unknown"), r.error_message().unwrap_or("")))
                .unwrap_or(("unknown", ""));
            return Ok(SendResult::failed(format!(
                "Entry rejected by {}: {code}: {message}",
                self.bus_name
            )));
        }

        Ok(SendResult::delivered(
            result.and_then(|r| r.event_id()).map(String::from),
        ))
    }

    fn supports(&self, channel: Channel) -> bool {
        channel == Channel::EventBridge
    }
}

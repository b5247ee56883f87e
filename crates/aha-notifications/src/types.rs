use serde::{Deserialize, Serialize};
use std::fmt;

use aha_core::{Event, EventType, resource_labels};

/// Notification destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Slack incoming webhook, attachment card
    SlackWebhook,
    /// Slack workflow webhook, flat key/value body
    SlackWorkflow,
    /// Microsoft Teams connector, MessageCard
    Teams,
    /// Amazon Chime webhook, markdown content
    Chime,
    /// EventBridge bus entry
    EventBridge,
    /// HTML email
    Email,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SlackWebhook => "slack_webhook",
            Self::SlackWorkflow => "slack_workflow",
            Self::Teams => "teams",
            Self::Chime => "chime",
            Self::EventBridge => "eventbridge",
            Self::Email => "email",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a formatter needs to render one notification
#[derive(Debug, Clone)]
pub struct NotificationContext {
    pub event: Event,
    pub event_type: EventType,

    /// Affected accounts as `"{name} ({id})"`
    pub account_labels: Vec<String>,

    /// Affected resources, account-level entries removed
    pub resource_labels: Vec<String>,
}

impl NotificationContext {
    /// Builds the context for an event, deriving the event type from its
    /// status and the resource labels from its affected entities.
    pub fn for_event(event: Event, account_labels: Vec<String>) -> Self {
        let event_type = EventType::for_status(event.status_code);
        let resource_labels = resource_labels(&event.affected_entities);
        Self {
            event,
            event_type,
            account_labels,
            resource_labels,
        }
    }
}

/// A rendered, destination-shaped message
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// JSON body for a webhook POST
    Json(serde_json::Value),

    /// HTML email body
    Html(String),

    /// Event bus entry; the bus name is added by the sender
    BusEvent {
        source: String,
        detail_type: String,
        detail: String,
    },
}

impl Payload {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Json(_) => "json",
            Self::Html(_) => "html",
            Self::BusEvent { .. } => "bus_event",
        }
    }
}

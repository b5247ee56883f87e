//! Pure per-channel renderers.
//!
//! Every formatter takes a [`NotificationContext`] and produces the payload
//! shape its destination expects. They share one field set (accounts,
//! resources, service, region, start time, status, event ARN and latest
//! update, plus end time for resolved events) and differ only in layout.

pub mod chime;
pub mod email;
pub mod eventbridge;
pub mod slack;
pub mod teams;

use aha_core::{EventType, LabelKind, ListFormat, cleanup_time, render_labels};

use crate::error::NotificationError;
use crate::types::{Channel, NotificationContext, Payload};

/// Renders the payload for a channel.
pub fn format(channel: Channel, ctx: &NotificationContext) -> Result<Payload, NotificationError> {
    match channel {
        Channel::SlackWebhook => slack::webhook(ctx).map(Payload::Json),
        Channel::SlackWorkflow => slack::workflow(ctx).map(Payload::Json),
        Channel::Teams => teams::message_card(ctx).map(Payload::Json),
        Channel::Chime => chime::message(ctx).map(Payload::Json),
        Channel::EventBridge => eventbridge::entry(ctx),
        Channel::Email => email::html_body(ctx).map(Payload::Html),
    }
}

/// Header line naming the service and region in upper case.
pub(crate) fn headline(ctx: &NotificationContext) -> String {
    let service = ctx.event.service.to_uppercase();
    let region = ctx.event.region.to_uppercase();
    match ctx.event_type {
        EventType::Create => format!(
            "[NEW] AWS Health reported an issue with the {service} service in the {region} region."
        ),
        EventType::Resolve => format!(
            "[RESOLVED] The AWS Health issue with the {service} service in the {region} region is now resolved."
        ),
    }
}

/// Field values shared by every layout.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Fields {
    pub accounts: String,
    pub resources: String,
    pub service: String,
    pub region: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub status: String,
    pub event_arn: String,
    pub updates: String,
}

impl Fields {
    pub(crate) fn collect(
        ctx: &NotificationContext,
        list: ListFormat,
    ) -> Result<Self, NotificationError> {
        let event = &ctx.event;

        // A closed event without an end time reports when it was last updated
        let end_time = match ctx.event_type {
            EventType::Create => None,
            EventType::Resolve => Some(cleanup_time(
                event.end_time.as_deref().unwrap_or(&event.last_updated_time),
            )?),
        };

        Ok(Self {
            accounts: render_labels(&ctx.account_labels, LabelKind::Accounts, list),
            resources: render_labels(&ctx.resource_labels, LabelKind::Resources, list),
            service: event.service.clone(),
            region: event.region.clone(),
            start_time: cleanup_time(&event.start_time)?,
            end_time,
            status: event.status_code.as_str().to_string(),
            event_arn: event.arn.clone(),
            updates: event.latest_description.clone(),
        })
    }

    /// `(title, value, short)` rows in display order.
    pub(crate) fn rows(&self) -> Vec<(&'static str, &str, bool)> {
        let mut rows = vec![
            ("Account(s)", self.accounts.as_str(), true),
            ("Resource(s)", self.resources.as_str(), true),
            ("Service", self.service.as_str(), true),
            ("Region", self.region.as_str(), true),
            ("Start Time (UTC)", self.start_time.as_str(), true),
        ];
        if let Some(end_time) = &self.end_time {
            rows.push(("End Time (UTC)", end_time.as_str(), true));
        }
        rows.extend([
            ("Status", self.status.as_str(), true),
            ("Event ARN", self.event_arn.as_str(), false),
            ("Updates", self.updates.as_str(), false),
        ]);
        rows
    }
}

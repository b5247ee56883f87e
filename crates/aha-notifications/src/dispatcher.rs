use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::adapters::NotificationAdapter;
use crate::error::NotificationError;
use crate::formatters;
use crate::types::{Channel, NotificationContext};

/// An enabled channel and the adapter that delivers it
#[derive(Clone)]
pub struct ChannelRoute {
    pub channel: Channel,
    pub adapter: Arc<dyn NotificationAdapter>,
}

/// A channel that could not be notified
#[derive(Debug)]
pub struct ChannelFailure {
    pub channel: Channel,
    pub error: NotificationError,
}

/// Per-channel outcome of one dispatch
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub delivered: Vec<Channel>,
    pub failed: Vec<ChannelFailure>,
}

impl DispatchReport {
    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }
}

/// Formats and sends a notification to every enabled channel.
///
/// Channels are independent: a formatting or delivery failure on one is
/// recorded in the report and the remaining channels are still attempted.
/// Nothing is retried.
#[derive(Clone, Default)]
pub struct Dispatcher {
    routes: Vec<ChannelRoute>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a channel; channels are attempted in insertion order.
    pub fn with_route(mut self, channel: Channel, adapter: Arc<dyn NotificationAdapter>) -> Self {
        self.add_route(channel, adapter);
        self
    }

    pub fn add_route(&mut self, channel: Channel, adapter: Arc<dyn NotificationAdapter>) {
        self.routes.push(ChannelRoute { channel, adapter });
    }

    pub fn channels(&self) -> Vec<Channel> {
        self.routes.iter().map(|route| route.channel).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub async fn dispatch(&self, ctx: &NotificationContext) -> DispatchReport {
        let mut report = DispatchReport::default();

        for route in &self.routes {
            match self.deliver(route, ctx).await {
                Ok(external_id) => {
                    info!(
                        event_arn = %ctx.event.arn,
                        channel = %route.channel,
                        event_type = %ctx.event_type,
                        external_id = external_id.as_deref().unwrap_or("-"),
                        "Notification sent"
                    );
                    report.delivered.push(route.channel);
                }
                Err(e) => {
                    warn!(
                        event_arn = %ctx.event.arn,
                        channel = %route.channel,
                        error = %e,
                        "Notification failed"
                    );
                    report.failed.push(ChannelFailure {
                        channel: route.channel,
                        error: e,
                    });
                }
            }
        }

        report
    }

    async fn deliver(
        &self,
        route: &ChannelRoute,
        ctx: &NotificationContext,
    ) -> Result<Option<String>, NotificationError> {
        if !route.adapter.supports(route.channel) {
            return Err(NotificationError::InvalidConfig(format!(
                "adapter cannot deliver {}",
                route.channel
            )));
        }

        let payload = formatters::format(route.channel, ctx)?;
        debug!(channel = %route.channel, payload = payload.kind(), "Rendered payload");

        let result = route.adapter.send(&payload).await?;
        if result.success {
            Ok(result.external_id)
        } else {
            Err(NotificationError::send_failed(
                result.error.unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }
}

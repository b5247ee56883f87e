//! Wires configuration, secrets and clients into a [`Poller`].

use std::sync::Arc;

use tracing::info;

use aha_config::{AppConfig, ChannelSecrets, Endpoint, configured, enabled_endpoints};
use aha_health::{
    AccountDirectory, AwsHealthSource, HealthView, IdOnlyDirectory, OrganizationsDirectory,
};
use aha_notifications::{
    Channel, Dispatcher, EmailAdapter, EmailTransport, EventBridgeAdapter, NotificationAdapter,
    SmtpSettings, WebhookAdapter,
};
use aha_storage::{DynStateStore, DynamoStateStore};

use crate::clients::AwsClients;
use crate::poller::{ExclusionSource, PollSettings, Poller};

const DEFAULT_SMTP_PORT: u16 = 587;

/// Query settings derived from configuration.
pub fn poll_settings(config: &AppConfig) -> PollSettings {
    PollSettings {
        lookback_hours: config.event_search_back,
        issues_only: config.issues_only(),
        regions: config.region_allowlist(),
        organization_mode: config.organization_mode(),
    }
}

/// Email transport: SMTP when a relay host is configured, SES otherwise.
pub fn email_transport(config: &AppConfig, ses: &aws_sdk_ses::Client) -> EmailTransport {
    match configured(config.smtp_host.as_deref()) {
        Some(host) => EmailTransport::Smtp(SmtpSettings {
            host: host.to_string(),
            port: config.smtp_port.unwrap_or(DEFAULT_SMTP_PORT),
            username: configured(config.smtp_username.as_deref()).map(str::to_string),
            password: config.smtp_password.clone(),
        }),
        None => EmailTransport::Ses(ses.clone()),
    }
}

/// Maps an endpoint to its channel and sender.
pub fn route_for(
    endpoint: &Endpoint,
    config: &AppConfig,
    clients: &AwsClients,
) -> (Channel, Arc<dyn NotificationAdapter>) {
    let adapter: Arc<dyn NotificationAdapter> = match endpoint {
        Endpoint::EventBridge { bus_name } => Arc::new(EventBridgeAdapter::new(
            clients.eventbridge.clone(),
            bus_name,
        )),
        Endpoint::SlackWebhook { url }
        | Endpoint::SlackWorkflow { url }
        | Endpoint::Teams { url }
        | Endpoint::Chime { url } => Arc::new(WebhookAdapter::new(url)),
        Endpoint::Email { from, to, subject } => Arc::new(EmailAdapter::new(
            email_transport(config, &clients.ses),
            from,
            to.clone(),
            subject,
        )),
    };
    (channel_for(endpoint), adapter)
}

pub fn channel_for(endpoint: &Endpoint) -> Channel {
    match endpoint {
        Endpoint::EventBridge { .. } => Channel::EventBridge,
        Endpoint::SlackWebhook { .. } => Channel::SlackWebhook,
        Endpoint::SlackWorkflow { .. } => Channel::SlackWorkflow,
        Endpoint::Teams { .. } => Channel::Teams,
        Endpoint::Chime { .. } => Channel::Chime,
        Endpoint::Email { .. } => Channel::Email,
    }
}

/// Dispatcher over every enabled channel, in delivery order.
pub fn build_dispatcher(
    config: &AppConfig,
    secrets: &ChannelSecrets,
    clients: &AwsClients,
) -> Dispatcher {
    let mut dispatcher = Dispatcher::new();
    for endpoint in enabled_endpoints(config, secrets) {
        let (channel, adapter) = route_for(&endpoint, config, clients);
        dispatcher.add_route(channel, adapter);
    }
    info!(
        channels = ?dispatcher.channels().iter().map(Channel::as_str).collect::<Vec<_>>(),
        "Notification channels enabled"
    );
    dispatcher
}

/// Exclusion list location; only set in organization mode with a key and bucket.
pub fn exclusion_source(config: &AppConfig, clients: &AwsClients) -> ExclusionSource {
    if !config.organization_mode() {
        return ExclusionSource::None;
    }
    match (config.exclusion_bucket(), config.exclusion_key()) {
        (Some(bucket), Some(key)) => ExclusionSource::S3 {
            client: clients.s3.clone(),
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        _ => ExclusionSource::None,
    }
}

/// Builds the poll loop backed by AWS services.
pub fn build_poller(config: &AppConfig, secrets: &ChannelSecrets, clients: &AwsClients) -> Poller {
    let settings = poll_settings(config);
    let view = if settings.organization_mode {
        HealthView::Organization
    } else {
        HealthView::Account
    };
    let directory: Arc<dyn AccountDirectory> = match view {
        HealthView::Organization => {
            Arc::new(OrganizationsDirectory::new(clients.organizations.clone()))
        }
        HealthView::Account => Arc::new(IdOnlyDirectory),
    };
    info!(
        organization_mode = settings.organization_mode,
        lookback_hours = settings.lookback_hours,
        table = %config.dynamodb_table,
        "Poller configured"
    );

    let source = Arc::new(AwsHealthSource::new(clients.health.clone(), view));
    let store: DynStateStore = Arc::new(DynamoStateStore::new(
        clients.dynamodb.clone(),
        &config.dynamodb_table,
    ));

    Poller::new(
        source,
        store,
        build_dispatcher(config, secrets, clients),
        directory,
        settings,
    )
    .with_exclusions(exclusion_source(config, clients))
}

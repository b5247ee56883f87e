//! Channel endpoint secrets.
//!
//! Each channel endpoint is looked up independently. A missing, denied or
//! failed lookup disables that channel and never aborts the run.

use async_trait::async_trait;
use aws_sdk_secretsmanager::error::ProvideErrorMetadata;
use tracing::{debug, info, warn};

use crate::app::{AppConfig, configured};
use crate::error::ConfigError;

pub const SLACK_SECRET_ID: &str = "SlackChannelID";
pub const TEAMS_SECRET_ID: &str = "MicrosoftChannelID";
pub const CHIME_SECRET_ID: &str = "ChimeChannelID";
pub const EVENT_BUS_SECRET_ID: &str = "EventBusName";
pub const ASSUME_ROLE_SECRET_ID: &str = "AssumeRoleArn";

/// Source of secret strings
#[async_trait]
pub trait SecretSource: Send + Sync {
    /// `Ok(None)` when the secret exists but has no string value
    async fn secret_string(&self, id: &str) -> Result<Option<String>, ConfigError>;
}

/// AWS Secrets Manager backed source
pub struct SecretsManagerSource {
    client: aws_sdk_secretsmanager::Client,
}

impl SecretsManagerSource {
    pub fn new(client: aws_sdk_secretsmanager::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretSource for SecretsManagerSource {
    async fn secret_string(&self, id: &str) -> Result<Option<String>, ConfigError> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(id)
            .send()
            .await
            .map_err(|e| ConfigError::Secret {
                id: id.to_string(),
                code: e.code().unwrap_or("unknown").to_string(),
                message: e.message().unwrap_or_default().to_string(),
            })?;
        Ok(output.secret_string().map(str::to_string))
    }
}

/// Resolved channel endpoints; `None` disables the channel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelSecrets {
    pub slack: Option<String>,
    pub teams: Option<String>,
    pub chime: Option<String>,
    pub event_bus: Option<String>,
    pub assume_role: Option<String>,
}

impl ChannelSecrets {
    /// Endpoints from configuration overrides only.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            slack: owned(config.slack_webhook_url.as_deref()),
            teams: owned(config.teams_webhook_url.as_deref()),
            chime: owned(config.chime_webhook_url.as_deref()),
            event_bus: owned(config.event_bus_name.as_deref()),
            assume_role: owned(config.assume_role_arn.as_deref()),
        }
    }

    /// Configuration overrides first, then the secret source for anything
    /// left unset.
    pub async fn resolve(config: &AppConfig, source: &dyn SecretSource) -> Self {
        let mut secrets = Self::from_config(config);
        let slots = [
            (SLACK_SECRET_ID, &mut secrets.slack),
            (TEAMS_SECRET_ID, &mut secrets.teams),
            (CHIME_SECRET_ID, &mut secrets.chime),
            (EVENT_BUS_SECRET_ID, &mut secrets.event_bus),
            (ASSUME_ROLE_SECRET_ID, &mut secrets.assume_role),
        ];
        for (id, slot) in slots {
            if slot.is_none() {
                *slot = fetch(source, id).await;
            }
        }
        secrets
    }
}

async fn fetch(source: &dyn SecretSource, id: &str) -> Option<String> {
    match source.secret_string(id).await {
        Ok(value) => {
            let value = owned(value.as_deref());
            debug!(secret_id = id, configured = value.is_some(), "Resolved secret");
            value
        }
        Err(e) if e.is_access_denied() => {
            info!(secret_id = id, "No secret configured, skipping channel");
            None
        }
        Err(e) => {
            warn!(secret_id = id, error = %e, "Secret lookup failed, skipping channel");
            None
        }
    }
}

fn owned(value: Option<&str>) -> Option<String> {
    configured(value).map(str::to_string)
}

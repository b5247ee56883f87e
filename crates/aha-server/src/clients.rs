//! AWS client bundle.
//!
//! Built once at startup from the loaded configuration and handed to the
//! poll loop; nothing here is process-global.

use std::time::Duration;

use aws_config::retry::RetryConfig;
use aws_config::sts::AssumeRoleProvider;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::SharedCredentialsProvider;
use tracing::info;

use aha_config::{AppConfig, ChannelSecrets, SecretsManagerSource};

/// Session name used for the cross-account role
pub const ROLE_SESSION_NAME: &str = "cross_acct_aha_session";

const ROLE_SESSION: Duration = Duration::from_secs(900);
const HEALTH_MAX_ATTEMPTS: u32 = 10;

/// Credentials used for the Health and Organizations clients
#[derive(Debug, Clone)]
pub enum HealthCredentials {
    /// The deployment's own credential chain
    Default,
    /// A cross-account role, re-assumed by the SDK before each session expires
    AssumedRole {
        role_arn: String,
        provider: SharedCredentialsProvider,
    },
}

impl HealthCredentials {
    /// Picks the credential source for an optional role ARN.
    pub async fn resolve(sdk_config: &SdkConfig, assume_role: Option<&str>) -> Self {
        match assume_role.filter(|arn| is_role_arn(arn)) {
            Some(role_arn) => {
                info!(role_arn, "Running in member account deployment mode");
                let provider = AssumeRoleProvider::builder(role_arn)
                    .session_name(ROLE_SESSION_NAME)
                    .session_length(ROLE_SESSION)
                    .configure(sdk_config)
                    .build()
                    .await;
                Self::AssumedRole {
                    role_arn: role_arn.to_string(),
                    provider: SharedCredentialsProvider::new(provider),
                }
            }
            None => {
                info!("Running in management account deployment mode");
                Self::Default
            }
        }
    }

    fn provider(&self) -> Option<SharedCredentialsProvider> {
        match self {
            Self::Default => None,
            Self::AssumedRole { provider, .. } => Some(provider.clone()),
        }
    }
}

/// Every AWS client the service talks to
#[derive(Debug, Clone)]
pub struct AwsClients {
    pub health: aws_sdk_health::Client,
    pub organizations: aws_sdk_organizations::Client,
    pub dynamodb: aws_sdk_dynamodb::Client,
    pub eventbridge: aws_sdk_eventbridge::Client,
    pub ses: aws_sdk_ses::Client,
    pub s3: aws_sdk_s3::Client,
    pub secrets: aws_sdk_secretsmanager::Client,
}

/// Shared SDK configuration for the deployment region.
pub async fn load_sdk_config(config: &AppConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = config.aws_region.as_deref() {
        loader = loader.region(Region::new(region.to_string()));
    }
    loader.load().await
}

impl AwsClients {
    /// Builds all clients.
    ///
    /// Health and Organizations run against the Health region with a larger
    /// retry budget, under the cross-account role when `assume_role` names
    /// an IAM role.
    pub async fn build(sdk_config: &SdkConfig, config: &AppConfig, assume_role: Option<&str>) -> Self {
        let credentials = HealthCredentials::resolve(sdk_config, assume_role).await;

        let retry = RetryConfig::standard().with_max_attempts(HEALTH_MAX_ATTEMPTS);
        let health_region = Region::new(config.health_region.clone());

        let mut health = aws_sdk_health::config::Builder::from(sdk_config)
            .region(health_region.clone())
            .retry_config(retry.clone());
        let mut organizations = aws_sdk_organizations::config::Builder::from(sdk_config)
            .region(health_region)
            .retry_config(retry);
        if let Some(provider) = credentials.provider() {
            health = health.credentials_provider(provider.clone());
            organizations = organizations.credentials_provider(provider);
        }

        Self {
            health: aws_sdk_health::Client::from_conf(health.build()),
            organizations: aws_sdk_organizations::Client::from_conf(organizations.build()),
            dynamodb: aws_sdk_dynamodb::Client::new(sdk_config),
            eventbridge: aws_sdk_eventbridge::Client::new(sdk_config),
            ses: aws_sdk_ses::Client::new(sdk_config),
            s3: aws_sdk_s3::Client::new(sdk_config),
            secrets: aws_sdk_secretsmanager::Client::new(sdk_config),
        }
    }
}

/// Channel endpoints from configuration overrides and Secrets Manager.
pub async fn resolve_secrets(sdk_config: &SdkConfig, config: &AppConfig) -> ChannelSecrets {
    let source = SecretsManagerSource::new(aws_sdk_secretsmanager::Client::new(sdk_config));
    ChannelSecrets::resolve(config, &source).await
}

/// Whether a value names an IAM role to assume.
pub fn is_role_arn(value: &str) -> bool {
    value.contains("arn:aws:iam::")
}

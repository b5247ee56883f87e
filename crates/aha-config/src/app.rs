use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Sender address shipped in deployment templates; email stays off until
/// it is replaced.
pub const PLACEHOLDER_SENDER: &str = "none@domain.com";

/// `REGIONS` value that disables the region allowlist
pub const ALL_REGIONS: &str = "all regions";

/// Sentinel deployments use for "not configured"
pub const NONE_SENTINEL: &str = "None";

const VALID_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];
const VALID_FORMATS: [&str; 2] = ["text", "json"];

/// Runtime configuration.
///
/// Field names are the lowercased environment keys of existing
/// deployments (`EVENT_SEARCH_BACK` becomes `event_search_back`), so the
/// same names work in `aha.toml` and in the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Lookback window in hours
    #[serde(default = "default_lookback")]
    pub event_search_back: u32,

    /// `issue` limits polling to issue and investigation events
    #[serde(default = "default_event_type")]
    pub health_event_type: String,

    /// `all regions` or a comma separated allowlist
    #[serde(default = "default_regions")]
    pub regions: String,

    /// `Yes` for organization mode
    #[serde(default = "default_org_status")]
    pub org_status: String,

    /// S3 key of the account exclusion list
    #[serde(default)]
    pub account_ids: Option<String>,
    #[serde(default)]
    pub s3_bucket: Option<String>,

    #[serde(default = "default_table")]
    pub dynamodb_table: String,

    #[serde(default = "default_sender")]
    pub from_email: String,
    /// Comma separated recipients
    #[serde(default)]
    pub to_email: String,
    #[serde(default = "default_subject")]
    pub email_subject: String,

    /// Region for SES, Secrets Manager, DynamoDB and EventBridge
    #[serde(default)]
    pub aws_region: Option<String>,
    /// Region of the active Health API endpoint
    #[serde(default = "default_health_region")]
    pub health_region: String,

    // Endpoint overrides; when unset they come from Secrets Manager
    #[serde(default)]
    pub slack_webhook_url: Option<String>,
    #[serde(default)]
    pub teams_webhook_url: Option<String>,
    #[serde(default)]
    pub chime_webhook_url: Option<String>,
    #[serde(default)]
    pub event_bus_name: Option<String>,
    #[serde(default)]
    pub assume_role_arn: Option<String>,

    // SMTP relay for email instead of SES
    #[serde(default)]
    pub smtp_host: Option<String>,
    #[serde(default)]
    pub smtp_port: Option<u16>,
    #[serde(default)]
    pub smtp_username: Option<String>,
    #[serde(default)]
    pub smtp_password: Option<String>,

    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_lookback() -> u32 {
    1
}
fn default_event_type() -> String {
    "all".into()
}
fn default_regions() -> String {
    ALL_REGIONS.into()
}
fn default_org_status() -> String {
    "No".into()
}
fn default_table() -> String {
    "aha-events".into()
}
fn default_sender() -> String {
    PLACEHOLDER_SENDER.into()
}
fn default_subject() -> String {
    "AWS Health Alert".into()
}
fn default_health_region() -> String {
    "us-east-1".into()
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            event_search_back: default_lookback(),
            health_event_type: default_event_type(),
            regions: default_regions(),
            org_status: default_org_status(),
            account_ids: None,
            s3_bucket: None,
            dynamodb_table: default_table(),
            from_email: default_sender(),
            to_email: String::new(),
            email_subject: default_subject(),
            aws_region: None,
            health_region: default_health_region(),
            slack_webhook_url: None,
            teams_webhook_url: None,
            chime_webhook_url: None,
            event_bus_name: None,
            assume_role_arn: None,
            smtp_host: None,
            smtp_port: None,
            smtp_username: None,
            smtp_password: None,
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if self.event_search_back == 0 {
            return Err(ConfigError::validation("event_search_back must be > 0"));
        }
        let lvl = self.log_level.to_ascii_lowercase();
        if !VALID_LEVELS.contains(&lvl.as_str()) {
            return Err(ConfigError::validation(format!(
                "log_level must be one of {VALID_LEVELS:?}"
            )));
        }
        let fmt = self.log_format.to_ascii_lowercase();
        if !VALID_FORMATS.contains(&fmt.as_str()) {
            return Err(ConfigError::validation(format!(
                "log_format must be one of {VALID_FORMATS:?}"
            )));
        }
        if !matches!(self.org_status.as_str(), "Yes" | "No") {
            return Err(ConfigError::validation("org_status must be Yes or No"));
        }
        if self.exclusion_key().is_some() && configured(self.s3_bucket.as_deref()).is_none() {
            return Err(ConfigError::validation(
                "account_ids requires s3_bucket to be set",
            ));
        }
        Ok(())
    }

    pub fn organization_mode(&self) -> bool {
        self.org_status == "Yes"
    }

    pub fn issues_only(&self) -> bool {
        self.health_event_type == "issue"
    }

    /// Region allowlist; empty means every region.
    pub fn region_allowlist(&self) -> Vec<String> {
        if self.regions.trim() == ALL_REGIONS {
            return Vec::new();
        }
        split_list(&self.regions)
    }

    pub fn exclusion_key(&self) -> Option<&str> {
        configured(self.account_ids.as_deref())
    }

    pub fn exclusion_bucket(&self) -> Option<&str> {
        configured(self.s3_bucket.as_deref())
    }

    pub fn recipients(&self) -> Vec<String> {
        split_list(&self.to_email)
    }

    pub fn email_enabled(&self) -> bool {
        !self.from_email.contains(PLACEHOLDER_SENDER) && !self.recipients().is_empty()
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

/// Treats empty values and the `None` sentinel as unset.
pub fn configured(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != NONE_SENTINEL)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

pub mod loader {
    use super::AppConfig;
    use crate::error::Result;
    use config::{Config, Environment, File};
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// File read when no path is given
    pub const DEFAULT_CONFIG_FILE: &str = "aha.toml";

    /// Loads `aha.toml` (or `path`) overlaid by the process environment.
    pub fn load_config(path: Option<&str>) -> Result<AppConfig> {
        load_with_env(path, None)
    }

    /// Like [`load_config`], reading variables from `vars` instead of the
    /// process environment when given.
    pub fn load_with_env(
        path: Option<&str>,
        vars: Option<HashMap<String, String>>,
    ) -> Result<AppConfig> {
        let mut builder = Config::builder();
        let file = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));
        if file.exists() {
            builder = builder.add_source(File::from(file));
        } else if let Some(p) = path {
            return Err(crate::error::ConfigError::load(format!(
                "config file {p} not found"
            )));
        }

        // Deployment keys are unprefixed, e.g. EVENT_SEARCH_BACK=2
        builder = builder.add_source(Environment::default().source(vars));

        let merged: AppConfig = builder.build()?.try_deserialize()?;
        merged.validate()?;
        Ok(merged)
    }
}

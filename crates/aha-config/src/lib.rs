//! Configuration for AHA.
//!
//! [`AppConfig`] is loaded from an optional TOML file overlaid by the
//! environment. Channel endpoints come from configuration overrides or
//! Secrets Manager ([`ChannelSecrets`]) and are turned into the ordered list
//! of enabled [`Endpoint`]s.

pub mod app;
pub mod channels;
pub mod error;
pub mod secrets;

pub use app::loader::{DEFAULT_CONFIG_FILE, load_config, load_with_env};
pub use app::{AppConfig, configured};
pub use channels::{ChannelStatus, Endpoint, channel_report, enabled_endpoints};
pub use error::{ConfigError, Result};
pub use secrets::{ChannelSecrets, SecretSource, SecretsManagerSource};

pub mod bootstrap;
pub mod clients;
pub mod observability;
pub mod poller;

pub use bootstrap::{build_dispatcher, build_poller, poll_settings};
pub use clients::{AwsClients, HealthCredentials, load_sdk_config, resolve_secrets};
pub use observability::{LogFormat, apply_logging_level, init_tracing_with};
pub use poller::{ExclusionSource, PollError, PollSettings, PollSummary, Poller};

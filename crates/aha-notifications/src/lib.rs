pub mod adapters;
pub mod dispatcher;
pub mod error;
pub mod formatters;
pub mod types;

pub use adapters::{
    EmailAdapter, EmailTransport, EventBridgeAdapter, NotificationAdapter, SendResult,
    SmtpSettings, WebhookAdapter,
};
pub use dispatcher::{ChannelFailure, ChannelRoute, DispatchReport, Dispatcher};
pub use error::NotificationError;
pub use types::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported payload for {channel}: {payload}")]
    UnsupportedPayload {
        channel: &'static str,
        payload: &'static str,
    },

    #[error("Formatting failed: {0}")]
    Format(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Rejected by remote ({status}): {body}")]
    Rejected { status: u16, body: String },
}

impl NotificationError {
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    pub fn send_failed(message: impl Into<String>) -> Self {
        Self::SendFailed(message.into())
    }

    /// Whether the failure happened before anything was sent
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_) | Self::UnsupportedPayload { .. } | Self::Format(_)
        )
    }
}

impl From<aha_core::CoreError> for NotificationError {
    fn from(err: aha_core::CoreError) -> Self {
        Self::Format(err.to_string())
    }
}

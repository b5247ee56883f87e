use thiserror::Error;

/// Core error types for health event processing
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid event status: {0}")]
    InvalidStatus(String),

    #[error("Invalid event: {message}")]
    InvalidEvent { message: String },

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Time formatting error: {0}")]
    TimeFormat(#[from] time::error::Format),
}

impl CoreError {
    /// Create a new InvalidTimestamp error
    pub fn invalid_timestamp(value: impl Into<String>) -> Self {
        Self::InvalidTimestamp(value.into())
    }

    /// Create a new InvalidStatus error
    pub fn invalid_status(value: impl Into<String>) -> Self {
        Self::InvalidStatus(value.into())
    }

    /// Create a new InvalidEvent error
    pub fn invalid_event(message: impl Into<String>) -> Self {
        Self::InvalidEvent {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::invalid_timestamp("2023-05");
        assert_eq!(err.to_string(), "Invalid timestamp: 2023-05");

        let err = CoreError::invalid_status("pending");
        assert_eq!(err.to_string(), "Invalid event status: pending");

        let err = CoreError::invalid_event("missing arn");
        assert_eq!(err.to_string(), "Invalid event: missing arn");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::JsonError(_)));
    }
}

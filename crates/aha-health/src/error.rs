use thiserror::Error;

#[derive(Debug, Error)]
pub enum HealthError {
    #[error("{operation} failed ({code}): {message}")]
    Api {
        operation: &'static str,
        code: String,
        message: String,
    },

    /// The details lookup returned only a failure entry for the event
    #[error("Event details unavailable for account {account_id}: {error_name}: {message}")]
    EventDetails {
        account_id: String,
        error_name: String,
        message: String,
    },

    #[error("Invalid event from upstream: {0}")]
    InvalidEvent(String),

    #[error("Request could not be built: {0}")]
    Request(String),

    #[error("Account exclusion list error: {0}")]
    Exclusions(String),
}

impl HealthError {
    pub fn invalid_event(message: impl Into<String>) -> Self {
        Self::InvalidEvent(message.into())
    }

    pub fn exclusions(message: impl Into<String>) -> Self {
        Self::Exclusions(message.into())
    }

    /// Wraps an SDK error using its service error code and message.
    pub fn api<E>(operation: &'static str, err: &E) -> Self
    where
        E: aws_sdk_health::error::ProvideErrorMetadata + std::fmt::Display,
    {
        Self::Api {
            operation,
            code: err.code().unwrap_or("unknown").to_string(),
            message: err
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string()),
        }
    }

    /// Whether only this event is affected, as opposed to the whole query
    pub fn is_event_scoped(&self) -> bool {
        matches!(self, Self::EventDetails { .. } | Self::InvalidEvent(_))
    }
}

impl From<aha_core::CoreError> for HealthError {
    fn from(err: aha_core::CoreError) -> Self {
        Self::InvalidEvent(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_details_display() {
        let err = HealthError::EventDetails {
            account_id: "123456789012".to_string(),
            error_name: "UnsupportedLocale".to_string(),
            message: "locale not supported".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Event details unavailable for account 123456789012: UnsupportedLocale: locale not supported"
        );
        assert!(err.is_event_scoped());
    }

    #[test]
    fn test_exclusions_not_event_scoped() {
        assert!(!HealthError::exclusions("missing bucket").is_event_scoped());
    }
}

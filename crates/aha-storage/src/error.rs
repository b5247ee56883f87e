/// Errors from reading or writing tracked event records.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A stored row could not be decoded into a tracked record.
    #[error("Invalid record for {arn}: {message}")]
    InvalidRecord { arn: String, message: String },

    /// The backend rejected or failed a request.
    #[error("{operation} on {table} failed: {message}")]
    Backend {
        operation: &'static str,
        table: String,
        message: String,
    },

    /// The backend could not be reached at all.
    #[error("State store unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    #[must_use]
    pub fn invalid_record(arn: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            arn: arn.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn backend(
        operation: &'static str,
        table: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Backend {
            operation,
            table: table.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::invalid_record("arn:1", "missing statusCode");
        assert_eq!(err.to_string(), "Invalid record for arn:1: missing statusCode");

        let err = StorageError::backend("PutItem", "aha-events", "throttled");
        assert_eq!(err.to_string(), "PutItem on aha-events failed: throttled");
    }
}

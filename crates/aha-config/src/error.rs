use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Load error: {0}")]
    Load(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Secret {id} unavailable ({code}): {message}")]
    Secret {
        id: String,
        code: String,
        message: String,
    },
}

impl ConfigError {
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Whether a secret lookup failed because access is not granted, which
    /// is how an unconfigured channel usually shows up.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::Secret { code, .. } if code == "AccessDeniedException")
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        Self::Load(err.to_string())
    }
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

use thiserror::Error;

/// Boxed vendor error carried through unchanged.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Adapter is not initialized: call initialize() with credentials first")]
    NotInitialized,

    #[error("Invalid credentials: {reason}")]
    InvalidCredentials { reason: String },

    /// Failure reported by the underlying client, surfaced as-is.
    #[error(transparent)]
    Transport(BoxError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Lifecycle,
    Credentials,
    Transport,
    Configuration,
    Validation,
    System,
}

impl AdapterError {
    pub fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        AdapterError::Transport(Box::new(err))
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AdapterError::NotInitialized => ErrorCategory::Lifecycle,
            AdapterError::InvalidCredentials { .. } => ErrorCategory::Credentials,
            AdapterError::Transport(_) => ErrorCategory::Transport,
            AdapterError::MissingConfigError { .. }
            | AdapterError::InvalidConfigValueError { .. }
            | AdapterError::TomlError(_) => ErrorCategory::Configuration,
            AdapterError::ValidationError { .. } => ErrorCategory::Validation,
            AdapterError::IoError(_) | AdapterError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AdapterError::NotInitialized => {
                "The cloud connection has not been set up yet.".to_string()
            }
            AdapterError::InvalidCredentials { reason } => {
                format!("The supplied credentials are not usable: {}", reason)
            }
            AdapterError::Transport(e) => format!("The cloud provider rejected the request: {}", e),
            AdapterError::MissingConfigError { field } => {
                format!("Required setting '{}' is missing.", field)
            }
            AdapterError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AdapterError>;

use thiserror::Error;

/// Errors related to application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable required by the application is not set.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// An environment variable is set but its value cannot be used.
    #[error("Invalid value {value:?} for {name}: {reason}")]
    InvalidValue {
        /// Variable name.
        name: String,
        /// The raw value as read.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
}

//! Error types for helmbridge-config

use thiserror::Error;

/// Result type for configuration resolution
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while resolving provider configuration
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The storage driver name is not one of the supported values
    #[error("'{value}' must be a valid storage driver (configmap, secret or memory)")]
    InvalidDriver { value: String },

    /// A path containing a home-directory shorthand could not be expanded
    #[error("cannot expand path '{path}': {reason}")]
    PathExpansion { path: String, reason: String },

    /// An environment variable holds something other than a boolean
    #[error("environment variable {var} is not a valid boolean: '{value}'")]
    InvalidBool { var: String, value: String },

    /// A platform base directory (data, config, cache) could not be located
    #[error("could not determine the platform {0} directory")]
    UnknownBaseDir(&'static str),

    /// The declarative provider block failed to decode
    #[error("invalid provider block: {0}")]
    Parse(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

//! Error types for helmbridge-kube

use thiserror::Error;

/// Result type for session and storage operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors that can occur while initializing a session or touching
/// release storage
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    /// Kube config file could not be read or converted
    #[error("kubeconfig error: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    /// In-cluster connection config unavailable
    #[error("in-cluster configuration error: {0}")]
    InCluster(#[from] kube::config::InClusterError),

    /// Default connection config discovery failed
    #[error("could not infer cluster configuration: {0}")]
    InferConfig(#[from] kube::config::InferConfigError),

    /// Provider configuration failed to resolve
    #[error(transparent)]
    Config(#[from] helmbridge_config::ConfigError),

    /// Release not found
    #[error("release '{name}' not found in namespace '{namespace}'")]
    ReleaseNotFound { name: String, namespace: String },

    /// Release already exists
    #[error("release '{name}' already exists in namespace '{namespace}'")]
    ReleaseAlreadyExists { name: String, namespace: String },

    /// Storage error
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Compression error
    #[error("compression error: {0}")]
    Compression(String),
}

impl From<serde_json::Error> for SessionError {
    fn from(e: serde_json::Error) -> Self {
        SessionError::Serialization(e.to_string())
    }
}

impl SessionError {
    /// Check if this is a Kubernetes 404 Not Found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, SessionError::Api(kube::Error::Api(resp)) if resp.code == 404)
    }
}

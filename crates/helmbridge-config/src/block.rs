//! Declarative provider configuration block
//!
//! These types mirror the schema the host tool hands to the provider.
//! Every field is an `Option` so that "unset" is structurally distinct
//! from an explicit zero value: `insecure: false` in the block stays
//! `Some(false)` and never falls through to defaults.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Top-level provider configuration block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderBlock {
    /// Run Helm operations with debug output enabled
    #[serde(default)]
    pub debug: Option<bool>,

    /// Path to the Helm plugins directory
    #[serde(default)]
    pub plugins_path: Option<String>,

    /// Path to the registry config file
    #[serde(default)]
    pub registry_config_path: Option<String>,

    /// Path to the file containing repository names and URLs
    #[serde(default)]
    pub repository_config_path: Option<String>,

    /// Path to the directory containing cached repository indexes
    #[serde(default)]
    pub repository_cache: Option<String>,

    /// Backend storage driver: configmap, secret or memory
    #[serde(default)]
    pub helm_driver: Option<String>,

    /// Namespace Helm stores release information in
    #[serde(default)]
    pub helm_namespace: Option<String>,

    /// Cluster connection settings
    #[serde(default)]
    pub kubernetes: Option<KubernetesBlock>,
}

impl ProviderBlock {
    /// Decode a provider block from YAML
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }
}

/// Nested `kubernetes` connection block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KubernetesBlock {
    /// The hostname (in form of URI) of the Kubernetes API server
    #[serde(default)]
    pub host: Option<String>,

    /// Username for HTTP basic authentication against the API server
    #[serde(default)]
    pub username: Option<String>,

    /// Password for HTTP basic authentication against the API server
    #[serde(default)]
    pub password: Option<String>,

    /// Bearer token for authentication against the API server
    #[serde(default)]
    pub token: Option<String>,

    /// Skip TLS certificate verification
    #[serde(default)]
    pub insecure: Option<bool>,

    /// PEM-encoded client certificate for TLS authentication
    #[serde(default)]
    pub client_certificate: Option<String>,

    /// PEM-encoded client certificate key for TLS authentication
    #[serde(default)]
    pub client_key: Option<String>,

    /// PEM-encoded root certificate bundle for TLS verification
    #[serde(default)]
    pub cluster_ca_certificate: Option<String>,

    /// Path to the kube config file
    #[serde(default)]
    pub config_path: Option<String>,

    /// Context to choose from the config file
    #[serde(default)]
    pub config_context: Option<String>,

    /// Retrieve connection config from within the cluster
    #[serde(default)]
    pub in_cluster: Option<bool>,

    /// Load the local kube config file (default true)
    #[serde(default)]
    pub load_config_file: Option<bool>,
}

//! Environment variable layer
//!
//! The resolver never reads `std::env` directly; it works against a
//! captured snapshot so precedence rules stay testable without mutating
//! process state. An empty variable behaves as unset, matching the
//! behaviour Helm users expect from `HELM_*`/`KUBE_*` variables.

use std::collections::HashMap;

use crate::error::{ConfigError, Result};

/// Helm debug flag
pub const HELM_DEBUG: &str = "HELM_DEBUG";
/// Helm plugins directory
pub const HELM_PLUGINS: &str = "HELM_PLUGINS";
/// Registry config file
pub const HELM_REGISTRY_CONFIG: &str = "HELM_REGISTRY_CONFIG";
/// Repository config file
pub const HELM_REPOSITORY_CONFIG: &str = "HELM_REPOSITORY_CONFIG";
/// Repository cache directory
pub const HELM_REPOSITORY_CACHE: &str = "HELM_REPOSITORY_CACHE";
/// Release storage driver
pub const HELM_DRIVER: &str = "HELM_DRIVER";
/// Namespace release information is stored in
pub const HELM_NAMESPACE: &str = "HELM_NAMESPACE";

/// API server host
pub const KUBE_HOST: &str = "KUBE_HOST";
/// Basic auth username
pub const KUBE_USER: &str = "KUBE_USER";
/// Basic auth password
pub const KUBE_PASSWORD: &str = "KUBE_PASSWORD";
/// Bearer token
pub const KUBE_BEARER_TOKEN: &str = "KUBE_BEARER_TOKEN";
/// Skip TLS verification
pub const KUBE_INSECURE: &str = "KUBE_INSECURE";
/// PEM client certificate
pub const KUBE_CLIENT_CERT_DATA: &str = "KUBE_CLIENT_CERT_DATA";
/// PEM client key
pub const KUBE_CLIENT_KEY_DATA: &str = "KUBE_CLIENT_KEY_DATA";
/// PEM cluster CA bundle
pub const KUBE_CLUSTER_CA_CERT_DATA: &str = "KUBE_CLUSTER_CA_CERT_DATA";
/// Kube config file path; `KUBE_CONFIG` wins over `KUBECONFIG`
pub const KUBE_CONFIG_PATHS: [&str; 2] = ["KUBE_CONFIG", "KUBECONFIG"];
/// Context to select from the config file
pub const KUBE_CTX: &str = "KUBE_CTX";
/// Whether to load the local config file at all
pub const KUBE_LOAD_CONFIG_FILE: &str = "KUBE_LOAD_CONFIG_FILE";

/// Immutable snapshot of environment variables
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Capture the current process environment
    pub fn capture() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// An environment with nothing set
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot from explicit pairs (used in tests)
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up a variable; empty values count as unset
    pub fn get(&self, var: &str) -> Option<&str> {
        self.vars.get(var).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// First variable from `vars` that is set
    pub fn first_of(&self, vars: &[&str]) -> Option<&str> {
        vars.iter().find_map(|v| self.get(v))
    }

    /// Look up a boolean variable
    pub fn get_bool(&self, var: &str) -> Result<Option<bool>> {
        match self.get(var) {
            None => Ok(None),
            Some(raw) => parse_bool(raw).map(Some).ok_or_else(|| ConfigError::InvalidBool {
                var: var.to_string(),
                value: raw.to_string(),
            }),
        }
    }
}

/// Accepts the same spellings as Go's `strconv.ParseBool`
fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "true" | "True" | "TRUE" => Some(true),
        "0" | "f" | "F" | "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_value_counts_as_unset() {
        let env = Environment::from_vars([(HELM_DRIVER, "")]);
        assert_eq!(env.get(HELM_DRIVER), None);
    }

    #[test]
    fn test_first_of_prefers_earlier_name() {
        let env = Environment::from_vars([
            ("KUBE_CONFIG", "/from/kube_config"),
            ("KUBECONFIG", "/from/kubeconfig"),
        ]);
        assert_eq!(env.first_of(&KUBE_CONFIG_PATHS), Some("/from/kube_config"));

        let env = Environment::from_vars([("KUBECONFIG", "/from/kubeconfig")]);
        assert_eq!(env.first_of(&KUBE_CONFIG_PATHS), Some("/from/kubeconfig"));
    }

    #[test]
    fn test_bool_spellings() {
        for (raw, expected) in [
            ("1", true),
            ("t", true),
            ("TRUE", true),
            ("True", true),
            ("0", false),
            ("f", false),
            ("FALSE", false),
            ("False", false),
        ] {
            let env = Environment::from_vars([(KUBE_INSECURE, raw)]);
            assert_eq!(env.get_bool(KUBE_INSECURE).unwrap(), Some(expected), "raw: {raw}");
        }
    }

    #[test]
    fn test_bool_invalid_names_variable() {
        let env = Environment::from_vars([(KUBE_INSECURE, "yes")]);
        match env.get_bool(KUBE_INSECURE).unwrap_err() {
            ConfigError::InvalidBool { var, value } => {
                assert_eq!(var, KUBE_INSECURE);
                assert_eq!(value, "yes");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bool_unset_is_none() {
        assert_eq!(Environment::empty().get_bool(HELM_DEBUG).unwrap(), None);
    }
}

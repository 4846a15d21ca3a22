//! Layered configuration resolution
//!
//! Every field is resolved from three layers with a fixed precedence:
//! explicit block value, then environment variable, then the built-in
//! (or platform-derived) default. The nested `kubernetes` block gets the
//! same per-field treatment; because all block fields are typed
//! `Option`s, an explicit `false` never falls through to a default.

use std::path::PathBuf;

use crate::block::{KubernetesBlock, ProviderBlock};
use crate::driver::DriverKind;
use crate::env::{self, Environment};
use crate::error::Result;
use crate::paths;

/// Helm runtime settings after resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    /// Run with debug output enabled
    pub debug: bool,

    /// Helm plugins directory
    pub plugins_directory: PathBuf,

    /// Registry config file
    pub registry_config: PathBuf,

    /// Repository config file
    pub repository_config: PathBuf,

    /// Repository cache directory
    pub repository_cache: PathBuf,

    /// Release storage backend
    pub driver: DriverKind,

    /// Namespace release information is stored in
    pub namespace: String,
}

/// Cluster connection settings after resolution.
///
/// `None` defers to the client library's own discovery rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterAccess {
    /// API server URI
    pub host: Option<String>,

    /// Basic auth username
    pub username: Option<String>,

    /// Basic auth password, stored separately from the username
    pub password: Option<String>,

    /// Bearer token
    pub token: Option<String>,

    /// Skip TLS verification; `Some(false)` is an explicit choice
    pub insecure: Option<bool>,

    /// PEM-encoded client certificate
    pub client_certificate: Option<String>,

    /// PEM-encoded client key
    pub client_key: Option<String>,

    /// PEM-encoded cluster CA bundle
    pub cluster_ca_certificate: Option<String>,

    /// Kube config file path, home-expanded
    pub kubeconfig_path: Option<PathBuf>,

    /// Context to select from the config file
    pub context: Option<String>,

    /// Namespace operations default to
    pub namespace: Option<String>,

    /// Use in-cluster connection config
    pub in_cluster: bool,

    /// Whether the local config file participates at all
    pub load_config_file: bool,
}

/// Output of a full resolution pass
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub settings: ResolvedSettings,
    pub access: ClusterAccess,
}

/// Resolves a declarative block against an environment snapshot
#[derive(Debug)]
pub struct Resolver {
    block: ProviderBlock,
    env: Environment,
}

impl Resolver {
    pub fn new(block: ProviderBlock, env: Environment) -> Self {
        Self { block, env }
    }

    /// Produce the full resolved configuration.
    ///
    /// Pure apart from reading the captured environment and deriving
    /// platform default paths.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let settings = self.resolve_settings()?;
        let access = self.resolve_access(&settings)?;
        Ok(ResolvedConfig { settings, access })
    }

    fn resolve_settings(&self) -> Result<ResolvedSettings> {
        let debug = match self.block.debug {
            Some(v) => v,
            None => self.env.get_bool(env::HELM_DEBUG)?.unwrap_or(false),
        };

        let plugins_directory = match self.path_field(&self.block.plugins_path, env::HELM_PLUGINS) {
            Some(path) => path,
            None => paths::default_plugins_dir()?,
        };
        let registry_config =
            match self.path_field(&self.block.registry_config_path, env::HELM_REGISTRY_CONFIG) {
                Some(path) => path,
                None => paths::default_registry_config()?,
            };
        let repository_config = match self
            .path_field(&self.block.repository_config_path, env::HELM_REPOSITORY_CONFIG)
        {
            Some(path) => path,
            None => paths::default_repository_config()?,
        };
        let repository_cache =
            match self.path_field(&self.block.repository_cache, env::HELM_REPOSITORY_CACHE) {
                Some(path) => path,
                None => paths::default_repository_cache()?,
            };

        let driver = self
            .string_field(&self.block.helm_driver, env::HELM_DRIVER)
            .map(|v| v.parse::<DriverKind>())
            .transpose()?
            .unwrap_or_default();

        let namespace = self
            .string_field(&self.block.helm_namespace, env::HELM_NAMESPACE)
            .unwrap_or_else(|| "default".to_string());

        Ok(ResolvedSettings {
            debug,
            plugins_directory,
            registry_config,
            repository_config,
            repository_cache,
            driver,
            namespace,
        })
    }

    fn resolve_access(&self, settings: &ResolvedSettings) -> Result<ClusterAccess> {
        // An absent nested block still resolves: every field falls back
        // to its environment variable, then to its default.
        let empty = KubernetesBlock::default();
        let k8s = self.block.kubernetes.as_ref().unwrap_or(&empty);

        let in_cluster = k8s.in_cluster.unwrap_or(false);
        let load_config_file = match k8s.load_config_file {
            Some(v) => v,
            None => self
                .env
                .get_bool(env::KUBE_LOAD_CONFIG_FILE)?
                .unwrap_or(true),
        };

        // The config file path only matters when a file may be loaded.
        let kubeconfig_path = if !in_cluster && load_config_file {
            let raw = non_empty(&k8s.config_path)
                .map(str::to_string)
                .or_else(|| self.env.first_of(&env::KUBE_CONFIG_PATHS).map(str::to_string))
                .unwrap_or_else(|| paths::DEFAULT_KUBECONFIG.to_string());
            Some(paths::expand_home(&raw)?)
        } else {
            None
        };

        let insecure = match k8s.insecure {
            Some(v) => Some(v),
            None => self.env.get_bool(env::KUBE_INSECURE)?,
        };

        Ok(ClusterAccess {
            host: self.string_field(&k8s.host, env::KUBE_HOST),
            username: self.string_field(&k8s.username, env::KUBE_USER),
            password: self.string_field(&k8s.password, env::KUBE_PASSWORD),
            token: self.string_field(&k8s.token, env::KUBE_BEARER_TOKEN),
            insecure,
            client_certificate: self.string_field(&k8s.client_certificate, env::KUBE_CLIENT_CERT_DATA),
            client_key: self.string_field(&k8s.client_key, env::KUBE_CLIENT_KEY_DATA),
            cluster_ca_certificate: self
                .string_field(&k8s.cluster_ca_certificate, env::KUBE_CLUSTER_CA_CERT_DATA),
            kubeconfig_path,
            context: self.string_field(&k8s.config_context, env::KUBE_CTX),
            namespace: Some(settings.namespace.clone()),
            in_cluster,
            load_config_file,
        })
    }

    /// Block value, else environment variable; empty strings count as unset
    fn string_field(&self, block_value: &Option<String>, var: &str) -> Option<String> {
        non_empty(block_value)
            .or_else(|| self.env.get(var))
            .map(str::to_string)
    }

    /// Like `string_field`, producing a path
    fn path_field(&self, block_value: &Option<String>, var: &str) -> Option<PathBuf> {
        self.string_field(block_value, var).map(PathBuf::from)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    fn resolve(block: ProviderBlock, env: Environment) -> ResolvedConfig {
        Resolver::new(block, env).resolve().unwrap()
    }

    fn block_yaml(text: &str) -> ProviderBlock {
        ProviderBlock::from_yaml(text).unwrap()
    }

    #[test]
    fn test_defaults_with_empty_inputs() {
        let resolved = resolve(ProviderBlock::default(), Environment::empty());
        assert!(!resolved.settings.debug);
        assert_eq!(resolved.settings.driver, DriverKind::Secret);
        assert_eq!(resolved.settings.namespace, "default");
        assert_eq!(resolved.access.namespace.as_deref(), Some("default"));
        assert!(resolved.access.host.is_none());
        assert!(resolved.access.insecure.is_none());
        assert!(!resolved.access.in_cluster);
        assert!(resolved.access.load_config_file);
    }

    #[test]
    fn test_driver_accepts_any_case() {
        for raw in ["configmap", "CONFIGMAP", "Secret", "secret", "MEMORY", "memory"] {
            let block = block_yaml(&format!("helm_driver: {raw}\n"));
            let resolved = resolve(block, Environment::empty());
            assert_eq!(resolved.settings.driver.as_str(), raw.to_lowercase());
        }
    }

    #[test]
    fn test_invalid_driver_fails_resolution() {
        let block = block_yaml("helm_driver: postgres\n");
        let err = Resolver::new(block, Environment::empty()).resolve().unwrap_err();
        match err {
            ConfigError::InvalidDriver { value } => assert_eq!(value, "postgres"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_driver_from_env_fails_too() {
        let env = Environment::from_vars([(env::HELM_DRIVER, "etcd")]);
        let err = Resolver::new(ProviderBlock::default(), env).resolve().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDriver { value } if value == "etcd"));
    }

    #[test]
    fn test_block_wins_over_env_for_every_scalar() {
        let block = block_yaml(
            r#"
debug: false
plugins_path: /block/plugins
registry_config_path: /block/registry.json
repository_config_path: /block/repositories.yaml
repository_cache: /block/cache
helm_driver: memory
helm_namespace: block-ns
kubernetes:
  host: https://block:6443
  username: block-user
  password: block-pass
  token: block-token
  insecure: false
  client_certificate: block-cert
  client_key: block-key
  cluster_ca_certificate: block-ca
  config_path: /block/kubeconfig
  config_context: block-ctx
"#,
        );
        let env = Environment::from_vars([
            (env::HELM_DEBUG, "true"),
            (env::HELM_PLUGINS, "/env/plugins"),
            (env::HELM_REGISTRY_CONFIG, "/env/registry.json"),
            (env::HELM_REPOSITORY_CONFIG, "/env/repositories.yaml"),
            (env::HELM_REPOSITORY_CACHE, "/env/cache"),
            (env::HELM_DRIVER, "configmap"),
            (env::HELM_NAMESPACE, "env-ns"),
            (env::KUBE_HOST, "https://env:6443"),
            (env::KUBE_USER, "env-user"),
            (env::KUBE_PASSWORD, "env-pass"),
            (env::KUBE_BEARER_TOKEN, "env-token"),
            (env::KUBE_INSECURE, "true"),
            (env::KUBE_CLIENT_CERT_DATA, "env-cert"),
            (env::KUBE_CLIENT_KEY_DATA, "env-key"),
            (env::KUBE_CLUSTER_CA_CERT_DATA, "env-ca"),
            ("KUBE_CONFIG", "/env/kubeconfig"),
            (env::KUBE_CTX, "env-ctx"),
        ]);

        let resolved = resolve(block, env);
        assert!(!resolved.settings.debug);
        assert_eq!(resolved.settings.plugins_directory, PathBuf::from("/block/plugins"));
        assert_eq!(resolved.settings.registry_config, PathBuf::from("/block/registry.json"));
        assert_eq!(
            resolved.settings.repository_config,
            PathBuf::from("/block/repositories.yaml")
        );
        assert_eq!(resolved.settings.repository_cache, PathBuf::from("/block/cache"));
        assert_eq!(resolved.settings.driver, DriverKind::Memory);
        assert_eq!(resolved.settings.namespace, "block-ns");
        assert_eq!(resolved.access.host.as_deref(), Some("https://block:6443"));
        assert_eq!(resolved.access.username.as_deref(), Some("block-user"));
        assert_eq!(resolved.access.password.as_deref(), Some("block-pass"));
        assert_eq!(resolved.access.token.as_deref(), Some("block-token"));
        assert_eq!(resolved.access.insecure, Some(false));
        assert_eq!(resolved.access.client_certificate.as_deref(), Some("block-cert"));
        assert_eq!(resolved.access.client_key.as_deref(), Some("block-key"));
        assert_eq!(resolved.access.cluster_ca_certificate.as_deref(), Some("block-ca"));
        assert_eq!(resolved.access.kubeconfig_path, Some(PathBuf::from("/block/kubeconfig")));
        assert_eq!(resolved.access.context.as_deref(), Some("block-ctx"));
    }

    #[test]
    fn test_env_wins_over_default() {
        let env = Environment::from_vars([
            (env::HELM_DEBUG, "true"),
            (env::HELM_PLUGINS, "/env/plugins"),
            (env::HELM_DRIVER, "memory"),
            (env::HELM_NAMESPACE, "env-ns"),
            (env::KUBE_USER, "env-user"),
            ("KUBECONFIG", "/env/kubeconfig"),
        ]);
        let resolved = resolve(ProviderBlock::default(), env);
        assert!(resolved.settings.debug);
        assert_eq!(resolved.settings.plugins_directory, PathBuf::from("/env/plugins"));
        assert_eq!(resolved.settings.driver, DriverKind::Memory);
        assert_eq!(resolved.settings.namespace, "env-ns");
        assert_eq!(resolved.access.username.as_deref(), Some("env-user"));
        assert_eq!(resolved.access.kubeconfig_path, Some(PathBuf::from("/env/kubeconfig")));
    }

    #[test]
    fn test_explicit_false_booleans_do_not_fall_through() {
        // Env says true everywhere; explicit block false must survive.
        let block = block_yaml(
            "debug: false\nkubernetes:\n  insecure: false\n  load_config_file: false\n  in_cluster: false\n",
        );
        let env = Environment::from_vars([
            (env::HELM_DEBUG, "true"),
            (env::KUBE_INSECURE, "true"),
            (env::KUBE_LOAD_CONFIG_FILE, "true"),
        ]);
        let resolved = resolve(block, env);
        assert!(!resolved.settings.debug);
        assert_eq!(resolved.access.insecure, Some(false));
        assert!(!resolved.access.load_config_file);
        assert!(!resolved.access.in_cluster);
    }

    #[test]
    fn test_username_and_password_stored_independently() {
        let block = block_yaml("kubernetes:\n  username: alice\n  password: s3cret\n");
        let resolved = resolve(block, Environment::empty());
        assert_eq!(resolved.access.username.as_deref(), Some("alice"));
        assert_eq!(resolved.access.password.as_deref(), Some("s3cret"));
        assert_ne!(resolved.access.username, resolved.access.password);
    }

    #[test]
    fn test_default_kubeconfig_is_home_expanded() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let resolved = resolve(ProviderBlock::default(), Environment::empty());
        let path = resolved.access.kubeconfig_path.unwrap();
        assert!(path.is_absolute());
        assert_eq!(path, home.join(".kube").join("config"));
    }

    #[test]
    fn test_tilde_in_block_config_path_expands() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let block = block_yaml("kubernetes:\n  config_path: ~/.kube/other\n");
        let resolved = resolve(block, Environment::empty());
        assert_eq!(resolved.access.kubeconfig_path, Some(home.join(".kube").join("other")));
    }

    #[test]
    fn test_no_kubeconfig_path_when_file_loading_disabled() {
        let block = block_yaml("kubernetes:\n  load_config_file: false\n");
        let resolved = resolve(block, Environment::empty());
        assert_eq!(resolved.access.kubeconfig_path, None);

        let block = block_yaml("kubernetes:\n  in_cluster: true\n");
        let resolved = resolve(block, Environment::empty());
        assert!(resolved.access.in_cluster);
        assert_eq!(resolved.access.kubeconfig_path, None);
    }

    #[test]
    fn test_kube_config_env_beats_kubeconfig_env() {
        let env = Environment::from_vars([
            ("KUBE_CONFIG", "/first/kubeconfig"),
            ("KUBECONFIG", "/second/kubeconfig"),
        ]);
        let resolved = resolve(ProviderBlock::default(), env);
        assert_eq!(resolved.access.kubeconfig_path, Some(PathBuf::from("/first/kubeconfig")));
    }

    #[test]
    fn test_access_resolves_without_nested_block() {
        let env = Environment::from_vars([(env::KUBE_BEARER_TOKEN, "env-token")]);
        let resolved = resolve(ProviderBlock::default(), env);
        assert_eq!(resolved.access.token.as_deref(), Some("env-token"));
    }

    #[test]
    fn test_invalid_bool_env_fails_resolution() {
        let env = Environment::from_vars([(env::KUBE_INSECURE, "maybe")]);
        let err = Resolver::new(ProviderBlock::default(), env).resolve().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBool { .. }));
    }

    #[test]
    fn test_end_to_end_resolution_scenario() {
        let block = block_yaml(
            "helm_driver: secret\nhelm_namespace: ops\nkubernetes:\n  insecure: true\n",
        );
        let resolved = resolve(block, Environment::empty());
        assert_eq!(resolved.settings.driver, DriverKind::Secret);
        assert_eq!(resolved.access.namespace.as_deref(), Some("ops"));
        assert_eq!(resolved.access.insecure, Some(true));
    }
}

//! Default Helm path locations and home-directory expansion
//!
//! Mirrors Helm's path conventions on top of the platform base
//! directories: plugins under the data dir, registry and repository
//! config under the config dir, the repository cache under the cache dir.

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Default kube config location, expanded at resolution time
pub const DEFAULT_KUBECONFIG: &str = "~/.kube/config";

/// Default plugins directory: `<data>/helm/plugins`
pub fn default_plugins_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or(ConfigError::UnknownBaseDir("data"))?;
    Ok(data_dir.join("helm").join("plugins"))
}

/// Default registry config file: `<config>/helm/registry.json`
pub fn default_registry_config() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::UnknownBaseDir("config"))?;
    Ok(config_dir.join("helm").join("registry.json"))
}

/// Default repository config file: `<config>/helm/repositories.yaml`
pub fn default_repository_config() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::UnknownBaseDir("config"))?;
    Ok(config_dir.join("helm").join("repositories.yaml"))
}

/// Default repository cache directory: `<cache>/helm/repository`
pub fn default_repository_cache() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir().ok_or(ConfigError::UnknownBaseDir("cache"))?;
    Ok(cache_dir.join("helm").join("repository"))
}

/// Expand a leading `~` against the platform home directory.
///
/// Paths without the shorthand pass through untouched. `~user` form is
/// not supported. Failures are logged at debug level before surfacing.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    let expanded = match path.strip_prefix('~') {
        None => Ok(PathBuf::from(path)),
        Some(rest) if rest.is_empty() || rest.starts_with('/') => {
            match dirs::home_dir() {
                Some(home) => Ok(home.join(rest.trim_start_matches('/'))),
                None => Err(ConfigError::PathExpansion {
                    path: path.to_string(),
                    reason: "could not determine home directory".to_string(),
                }),
            }
        }
        Some(_) => Err(ConfigError::PathExpansion {
            path: path.to_string(),
            reason: "~user expansion is not supported".to_string(),
        }),
    };

    if let Err(e) = &expanded {
        tracing::debug!("error expanding path: {e}");
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path_passes_through() {
        assert_eq!(
            expand_home("/etc/kubernetes/admin.conf").unwrap(),
            PathBuf::from("/etc/kubernetes/admin.conf")
        );
        assert_eq!(expand_home("relative/path").unwrap(), PathBuf::from("relative/path"));
    }

    #[test]
    fn test_tilde_expands_to_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let expanded = expand_home("~/.kube/config").unwrap();
        assert_eq!(expanded, home.join(".kube").join("config"));
        assert!(expanded.is_absolute());
    }

    #[test]
    fn test_bare_tilde_is_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(expand_home("~").unwrap(), home);
    }

    #[test]
    fn test_tilde_user_is_rejected() {
        let err = expand_home("~root/.kube/config").unwrap_err();
        assert!(matches!(err, ConfigError::PathExpansion { .. }));
    }

    #[test]
    fn test_default_paths_end_with_helm_conventions() {
        if let Ok(p) = default_plugins_dir() {
            assert!(p.ends_with("helm/plugins"));
        }
        if let Ok(p) = default_registry_config() {
            assert!(p.ends_with("helm/registry.json"));
        }
        if let Ok(p) = default_repository_config() {
            assert!(p.ends_with("helm/repositories.yaml"));
        }
        if let Ok(p) = default_repository_cache() {
            assert!(p.ends_with("helm/repository"));
        }
    }
}

//! Release storage driver selection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Backend used to persist release information inside the cluster
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// Store releases in ConfigMaps (less secure, but more accessible)
    ConfigMap,

    /// Store releases in Secrets (Helm's default)
    #[default]
    Secret,

    /// Keep releases in process memory (testing, dry runs)
    Memory,
}

impl DriverKind {
    /// Canonical lowercase name of the driver
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverKind::ConfigMap => "configmap",
            DriverKind::Secret => "secret",
            DriverKind::Memory => "memory",
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DriverKind {
    type Err = ConfigError;

    /// Parse a driver name, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "configmap" => Ok(DriverKind::ConfigMap),
            "secret" => Ok(DriverKind::Secret),
            "memory" => Ok(DriverKind::Memory),
            _ => Err(ConfigError::InvalidDriver {
                value: s.to_string(),
            }),
        }
    }
}

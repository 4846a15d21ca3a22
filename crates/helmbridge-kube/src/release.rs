//! Persisted release records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a stored release revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseStatus {
    /// Currently deployed revision
    Deployed,

    /// Replaced by a newer revision
    Superseded,

    /// Deployment failed
    Failed,

    /// Release was uninstalled, history kept
    Uninstalled,
}

/// A single release revision as persisted by the storage drivers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseRecord {
    /// Release name
    pub name: String,

    /// Kubernetes namespace
    pub namespace: String,

    /// Revision number (1-indexed)
    pub revision: u32,

    /// Lifecycle status
    pub status: ReleaseStatus,

    /// Rendered manifest at deploy time
    pub manifest: String,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl ReleaseRecord {
    /// Create a first-revision record
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        revision: u32,
        manifest: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            revision,
            status: ReleaseStatus::Deployed,
            manifest: manifest.into(),
            updated_at: Utc::now(),
        }
    }

    /// Name of the Secret/ConfigMap holding this record.
    ///
    /// Uses Helm's key layout so records sit next to Helm's own.
    pub fn storage_key(&self) -> String {
        storage_key(&self.name, self.revision)
    }
}

/// Storage key for a (name, revision) pair
pub fn storage_key(name: &str, revision: u32) -> String {
    format!("sh.helm.release.v1.{name}.v{revision}")
}

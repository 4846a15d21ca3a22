//! Kubernetes ConfigMap storage driver
//!
//! Same layout as the Secret driver, for clusters where release payloads
//! are intentionally readable.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use kube::Client;
use std::collections::BTreeMap;

use helmbridge_config::DriverKind;

use super::{decode_record, encode_record, latest_only, release_labels, release_selector, ReleaseStore};
use crate::error::{Result, SessionError};
use crate::release::{storage_key, ReleaseRecord};

/// Kubernetes ConfigMap storage driver
pub struct ConfigMapStore {
    client: Client,
    namespace: String,
}

impl ConfigMapStore {
    /// Create a driver scoped to `namespace`
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
        }
    }

    fn api(&self) -> Api<ConfigMap> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    fn not_found(&self, name: &str) -> SessionError {
        SessionError::ReleaseNotFound {
            name: name.to_string(),
            namespace: self.namespace.clone(),
        }
    }

    /// Build the ConfigMap holding an encoded record
    fn build_configmap(record: &ReleaseRecord, encoded: &str) -> ConfigMap {
        let mut data = BTreeMap::new();
        data.insert("release".to_string(), encoded.to_string());

        ConfigMap {
            metadata: ObjectMeta {
                name: Some(record.storage_key()),
                namespace: Some(record.namespace.clone()),
                labels: Some(release_labels(record)),
                ..Default::default()
            },
            data: Some(data),
            ..Default::default()
        }
    }

    /// Parse a record out of a ConfigMap
    fn parse_configmap(cm: &ConfigMap) -> Result<ReleaseRecord> {
        let encoded = cm
            .data
            .as_ref()
            .and_then(|d| d.get("release"))
            .ok_or_else(|| SessionError::Storage("ConfigMap missing 'release' data".to_string()))?;
        decode_record(encoded)
    }
}

#[async_trait]
impl ReleaseStore for ConfigMapStore {
    fn driver(&self) -> DriverKind {
        DriverKind::ConfigMap
    }

    async fn get(&self, name: &str, revision: u32) -> Result<ReleaseRecord> {
        match self.api().get(&storage_key(name, revision)).await {
            Ok(cm) => Self::parse_configmap(&cm),
            Err(kube::Error::Api(e)) if e.code == 404 => Err(self.not_found(name)),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_latest(&self, name: &str) -> Result<ReleaseRecord> {
        let lp = ListParams::default().labels(&release_selector(Some(name)));
        let cms = self.api().list(&lp).await?;

        let mut records: Vec<ReleaseRecord> = Vec::new();
        for cm in &cms.items {
            records.push(Self::parse_configmap(cm)?);
        }
        records.sort_by(|a, b| b.revision.cmp(&a.revision));
        records.into_iter().next().ok_or_else(|| self.not_found(name))
    }

    async fn list(&self) -> Result<Vec<ReleaseRecord>> {
        let lp = ListParams::default().labels(&release_selector(None));
        let cms = self.api().list(&lp).await?;

        let mut records: Vec<ReleaseRecord> = Vec::new();
        for cm in &cms.items {
            records.push(Self::parse_configmap(cm)?);
        }
        Ok(latest_only(records))
    }

    async fn create(&self, record: &ReleaseRecord) -> Result<()> {
        let api = self.api();
        match api.get(&record.storage_key()).await {
            Ok(_) => {
                return Err(SessionError::ReleaseAlreadyExists {
                    name: record.name.clone(),
                    namespace: record.namespace.clone(),
                });
            }
            Err(kube::Error::Api(e)) if e.code == 404 => {}
            Err(e) => return Err(e.into()),
        }

        let encoded = encode_record(record)?;
        let cm = Self::build_configmap(record, &encoded);
        api.create(&PostParams::default(), &cm).await?;
        Ok(())
    }

    async fn delete(&self, name: &str, revision: u32) -> Result<ReleaseRecord> {
        let record = self.get(name, revision).await?;
        self.api()
            .delete(&storage_key(name, revision), &DeleteParams::default())
            .await?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_configmap_layout() {
        let record = ReleaseRecord::new("myapp", "ops", 1, "");
        let encoded = encode_record(&record).unwrap();
        let cm = ConfigMapStore::build_configmap(&record, &encoded);

        assert_eq!(cm.metadata.name.as_deref(), Some("sh.helm.release.v1.myapp.v1"));
        assert_eq!(cm.metadata.namespace.as_deref(), Some("ops"));
        assert!(cm.data.as_ref().unwrap().contains_key("release"));
    }

    #[test]
    fn test_parse_configmap_roundtrip() {
        let record = ReleaseRecord::new("myapp", "ops", 5, "kind: Deployment");
        let encoded = encode_record(&record).unwrap();
        let cm = ConfigMapStore::build_configmap(&record, &encoded);

        let parsed = ConfigMapStore::parse_configmap(&cm).unwrap();
        assert_eq!(parsed.revision, 5);
        assert_eq!(parsed.manifest, "kind: Deployment");
    }

    #[test]
    fn test_parse_configmap_missing_data() {
        assert!(ConfigMapStore::parse_configmap(&ConfigMap::default()).is_err());
    }
}

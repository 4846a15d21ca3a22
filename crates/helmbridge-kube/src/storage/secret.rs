//! Kubernetes Secrets storage driver
//!
//! The default driver; stores release records in Secrets with Helm's
//! resource type and key layout.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use kube::Client;
use std::collections::BTreeMap;

use helmbridge_config::DriverKind;

use super::{decode_record, encode_record, latest_only, release_labels, release_selector, ReleaseStore};
use crate::error::{Result, SessionError};
use crate::release::{storage_key, ReleaseRecord};

/// Secret type marking helm release payloads
const RELEASE_SECRET_TYPE: &str = "helm.sh/release.v1";

/// Kubernetes Secrets storage driver
pub struct SecretStore {
    client: Client,
    namespace: String,
}

impl SecretStore {
    /// Create a driver scoped to `namespace`
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
        }
    }

    fn api(&self) -> Api<Secret> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    fn not_found(&self, name: &str) -> SessionError {
        SessionError::ReleaseNotFound {
            name: name.to_string(),
            namespace: self.namespace.clone(),
        }
    }

    /// Build the Secret holding an encoded record
    fn build_secret(record: &ReleaseRecord, encoded: &str) -> Secret {
        let mut data = BTreeMap::new();
        data.insert(
            "release".to_string(),
            k8s_openapi::ByteString(encoded.as_bytes().to_vec()),
        );

        Secret {
            metadata: ObjectMeta {
                name: Some(record.storage_key()),
                namespace: Some(record.namespace.clone()),
                labels: Some(release_labels(record)),
                ..Default::default()
            },
            type_: Some(RELEASE_SECRET_TYPE.to_string()),
            data: Some(data),
            ..Default::default()
        }
    }

    /// Parse a record out of a Secret
    fn parse_secret(secret: &Secret) -> Result<ReleaseRecord> {
        let data = secret
            .data
            .as_ref()
            .and_then(|d| d.get("release"))
            .ok_or_else(|| SessionError::Storage("Secret missing 'release' data".to_string()))?;
        let encoded = String::from_utf8(data.0.clone())
            .map_err(|e| SessionError::Storage(format!("invalid UTF-8 in secret: {e}")))?;
        decode_record(&encoded)
    }
}

#[async_trait]
impl ReleaseStore for SecretStore {
    fn driver(&self) -> DriverKind {
        DriverKind::Secret
    }

    async fn get(&self, name: &str, revision: u32) -> Result<ReleaseRecord> {
        match self.api().get(&storage_key(name, revision)).await {
            Ok(secret) => Self::parse_secret(&secret),
            Err(kube::Error::Api(e)) if e.code == 404 => Err(self.not_found(name)),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_latest(&self, name: &str) -> Result<ReleaseRecord> {
        let lp = ListParams::default().labels(&release_selector(Some(name)));
        let secrets = self.api().list(&lp).await?;

        let mut records: Vec<ReleaseRecord> = Vec::new();
        for secret in &secrets.items {
            records.push(Self::parse_secret(secret)?);
        }
        records.sort_by(|a, b| b.revision.cmp(&a.revision));
        records.into_iter().next().ok_or_else(|| self.not_found(name))
    }

    async fn list(&self) -> Result<Vec<ReleaseRecord>> {
        let lp = ListParams::default().labels(&release_selector(None));
        let secrets = self.api().list(&lp).await?;

        let mut records: Vec<ReleaseRecord> = Vec::new();
        for secret in &secrets.items {
            records.push(Self::parse_secret(secret)?);
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
        let secret = Self::build_secret(record, &encoded);
        api.create(&PostParams::default(), &secret).await?;
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

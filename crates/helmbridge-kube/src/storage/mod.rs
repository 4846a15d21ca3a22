//! Release storage drivers
//!
//! A session binds one driver for the namespace it is scoped to:
//! - **Secret** (default): records in Kubernetes Secrets, Helm's layout
//! - **ConfigMap**: same layout in ConfigMaps
//! - **Memory**: in-process map, for tests and dry runs
//!
//! Records are framed the way Helm frames its own release payloads:
//! base64(gzip(json)).

mod configmap;
mod memory;
mod secret;

pub use configmap::ConfigMapStore;
pub use memory::MemoryStore;
pub use secret::SecretStore;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::{Read, Write};

use helmbridge_config::DriverKind;
use kube::Client;

use crate::error::{Result, SessionError};
use crate::release::ReleaseRecord;

/// Storage driver for release persistence, scoped to one namespace.
///
/// Implementations must be Send + Sync for use across async tasks.
#[async_trait]
pub trait ReleaseStore: Send + Sync {
    /// Which backend this store writes to
    fn driver(&self) -> DriverKind;

    /// Get a specific release revision
    async fn get(&self, name: &str, revision: u32) -> Result<ReleaseRecord>;

    /// Get the newest revision of a release
    async fn get_latest(&self, name: &str) -> Result<ReleaseRecord>;

    /// List the newest revision of every release in the namespace
    async fn list(&self) -> Result<Vec<ReleaseRecord>>;

    /// Persist a new release revision
    async fn create(&self, record: &ReleaseRecord) -> Result<()>;

    /// Delete a release revision, returning it
    async fn delete(&self, name: &str, revision: u32) -> Result<ReleaseRecord>;
}

/// Open the store for the given driver, scoped to `namespace`
pub fn open(driver: DriverKind, client: Client, namespace: &str) -> Box<dyn ReleaseStore> {
    match driver {
        DriverKind::Secret => Box::new(SecretStore::new(client, namespace)),
        DriverKind::ConfigMap => Box::new(ConfigMapStore::new(client, namespace)),
        DriverKind::Memory => Box::new(MemoryStore::new(namespace)),
    }
}

/// Encode a record for in-cluster storage: base64(gzip(json))
pub fn encode_record(record: &ReleaseRecord) -> Result<String> {
    let json = serde_json::to_vec(record)?;
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder
        .write_all(&json)
        .map_err(|e| SessionError::Compression(e.to_string()))?;
    let compressed = encoder
        .finish()
        .map_err(|e| SessionError::Compression(e.to_string()))?;
    Ok(base64::Engine::encode(
        &base64::engine::general_purpose::STANDARD,
        &compressed,
    ))
}

/// Decode a record from in-cluster storage
pub fn decode_record(data: &str) -> Result<ReleaseRecord> {
    let compressed = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, data)
        .map_err(|e| SessionError::Serialization(format!("base64 decode error: {e}")))?;
    let mut decoder = flate2::read::GzDecoder::new(compressed.as_slice());
    let mut json = Vec::new();
    decoder
        .read_to_end(&mut json)
        .map_err(|e| SessionError::Compression(e.to_string()))?;
    Ok(serde_json::from_slice(&json)?)
}

/// Labels applied to every storage resource, Helm's conventions
pub fn release_labels(record: &ReleaseRecord) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert("owner".to_string(), "helm".to_string());
    labels.insert("name".to_string(), record.name.clone());
    labels.insert("version".to_string(), record.revision.to_string());
    labels
}

/// Label selector matching every record of `name`, or all records
pub fn release_selector(name: Option<&str>) -> String {
    match name {
        Some(name) => format!("owner=helm,name={name}"),
        None => "owner=helm".to_string(),
    }
}

/// Keep only the newest revision of each release name
pub(crate) fn latest_only(mut records: Vec<ReleaseRecord>) -> Vec<ReleaseRecord> {
    records.sort_by(|a, b| b.revision.cmp(&a.revision));
    let mut seen = std::collections::HashSet::new();
    records.retain(|r| seen.insert(r.name.clone()));
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_record() -> ReleaseRecord {
        ReleaseRecord::new("myapp", "default", 1, "apiVersion: v1\nkind: ConfigMap")
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let record = test_record();
        let encoded = encode_record(&record).unwrap();
        let decoded = decode_record(&encoded).unwrap();
        assert_eq!(decoded.name, record.name);
        assert_eq!(decoded.revision, record.revision);
        assert_eq!(decoded.manifest, record.manifest);
    }

    #[test]
    fn test_encoded_form_is_base64() {
        let encoded = encode_record(&test_record()).unwrap();
        assert!(base64::Engine::decode(
            &base64::engine::general_purpose::STANDARD,
            encoded.as_bytes()
        )
        .is_ok());
    }

    #[test]
    fn test_large_manifest_compresses() {
        let manifest = "apiVersion: v1\nkind: ConfigMap\n".repeat(1000);
        let record = ReleaseRecord::new("big", "default", 1, manifest.clone());
        let encoded = encode_record(&record).unwrap();
        assert!(encoded.len() < manifest.len());
        assert_eq!(decode_record(&encoded).unwrap().manifest, manifest);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_record("not base64!!!").is_err());

        let not_gzip =
            base64::Engine::encode(&base64::engine::general_purpose::STANDARD, b"not gzip");
        assert!(decode_record(&not_gzip).is_err());
    }

    #[test]
    fn test_release_labels() {
        let labels = release_labels(&test_record());
        assert_eq!(labels.get("owner"), Some(&"helm".to_string()));
        assert_eq!(labels.get("name"), Some(&"myapp".to_string()));
        assert_eq!(labels.get("version"), Some(&"1".to_string()));
    }

    #[test]
    fn test_release_selector() {
        assert_eq!(release_selector(Some("myapp")), "owner=helm,name=myapp");
        assert_eq!(release_selector(None), "owner=helm");
    }

    #[test]
    fn test_latest_only_keeps_newest_revision() {
        let records = vec![
            ReleaseRecord::new("a", "default", 1, ""),
            ReleaseRecord::new("a", "default", 3, ""),
            ReleaseRecord::new("b", "default", 2, ""),
            ReleaseRecord::new("a", "default", 2, ""),
        ];
        let latest = latest_only(records);
        assert_eq!(latest.len(), 2);
        let a = latest.iter().find(|r| r.name == "a").unwrap();
        assert_eq!(a.revision, 3);
        let b = latest.iter().find(|r| r.name == "b").unwrap();
        assert_eq!(b.revision, 2);
    }
}

//! In-memory storage driver
//!
//! Backs `DriverKind::Memory` and doubles as the test driver: release
//! records live in a process-local map and vanish with the session.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use helmbridge_config::DriverKind;

use super::ReleaseStore;
use crate::error::{Result, SessionError};
use crate::release::ReleaseRecord;

/// In-memory storage driver scoped to one namespace
#[derive(Clone)]
pub struct MemoryStore {
    namespace: String,
    /// name -> revision -> record
    store: Arc<RwLock<HashMap<String, HashMap<u32, ReleaseRecord>>>>,
}

impl MemoryStore {
    /// Create an empty store scoped to `namespace`
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            store: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create with pre-populated records (used in tests)
    pub fn with_records(namespace: impl Into<String>, records: Vec<ReleaseRecord>) -> Self {
        let store = Self::new(namespace);
        {
            let mut map = store.store.write().unwrap();
            for record in records {
                map.entry(record.name.clone())
                    .or_default()
                    .insert(record.revision, record);
            }
        }
        store
    }

    fn not_found(&self, name: &str) -> SessionError {
        SessionError::ReleaseNotFound {
            name: name.to_string(),
            namespace: self.namespace.clone(),
        }
    }
}

#[async_trait]
impl ReleaseStore for MemoryStore {
    fn driver(&self) -> DriverKind {
        DriverKind::Memory
    }

    async fn get(&self, name: &str, revision: u32) -> Result<ReleaseRecord> {
        let map = self.store.read().unwrap();
        map.get(name)
            .and_then(|revisions| revisions.get(&revision))
            .cloned()
            .ok_or_else(|| self.not_found(name))
    }

    async fn get_latest(&self, name: &str) -> Result<ReleaseRecord> {
        let map = self.store.read().unwrap();
        map.get(name)
            .and_then(|revisions| revisions.values().max_by_key(|r| r.revision))
            .cloned()
            .ok_or_else(|| self.not_found(name))
    }

    async fn list(&self) -> Result<Vec<ReleaseRecord>> {
        let map = self.store.read().unwrap();
        Ok(map
            .values()
            .filter_map(|revisions| revisions.values().max_by_key(|r| r.revision))
            .cloned()
            .collect())
    }

    async fn create(&self, record: &ReleaseRecord) -> Result<()> {
        let mut map = self.store.write().unwrap();
        let revisions = map.entry(record.name.clone()).or_default();
        if revisions.contains_key(&record.revision) {
            return Err(SessionError::ReleaseAlreadyExists {
                name: record.name.clone(),
                namespace: record.namespace.clone(),
            });
        }
        revisions.insert(record.revision, record.clone());
        Ok(())
    }

    async fn delete(&self, name: &str, revision: u32) -> Result<ReleaseRecord> {
        let mut map = self.store.write().unwrap();
        let record = map
            .get_mut(name)
            .and_then(|revisions| revisions.remove(&revision))
            .ok_or_else(|| self.not_found(name))?;
        if map.get(name).is_some_and(|revisions| revisions.is_empty()) {
            map.remove(name);
        }
        Ok(record)
    }
}

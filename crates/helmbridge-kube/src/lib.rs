//! Helmbridge Kube - session factory and release storage for helmbridge
//!
//! This crate provides:
//! - **Provider**: the configured entry point resource operations use to
//!   obtain namespace-scoped Helm sessions, serialized through an
//!   internal initialization lock
//! - **Cluster access**: assembly of kube client configuration from the
//!   resolved connection settings (in-cluster, config file with
//!   overrides, bare endpoint, or inferred)
//! - **Storage drivers**: release persistence in Secrets, ConfigMaps or
//!   process memory, using Helm's key and label layout

pub mod access;
pub mod error;
pub mod provider;
pub mod release;
pub mod storage;

pub use error::{Result, SessionError};
pub use provider::{HelmSession, Provider};
pub use release::{ReleaseRecord, ReleaseStatus};
pub use storage::{ConfigMapStore, MemoryStore, ReleaseStore, SecretStore};

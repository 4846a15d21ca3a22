//! Helmbridge Config - layered provider configuration resolution
//!
//! This crate turns the declarative configuration block a host tool hands
//! to the Helm provider into a fully resolved runtime configuration:
//!
//! - **Declarative block**: typed schema for the provider block and its
//!   nested `kubernetes` connection block
//! - **Environment layer**: `HELM_*` / `KUBE_*` variables, captured as an
//!   immutable snapshot
//! - **Defaults**: Helm path conventions derived from platform base
//!   directories, plus home-directory expansion
//! - **Resolution**: per-field precedence of block value over environment
//!   variable over default, with validated storage-driver selection

pub mod block;
pub mod driver;
pub mod env;
pub mod error;
pub mod paths;
pub mod resolver;

pub use block::{KubernetesBlock, ProviderBlock};
pub use driver::DriverKind;
pub use env::Environment;
pub use error::{ConfigError, Result};
pub use resolver::{ClusterAccess, ResolvedConfig, ResolvedSettings, Resolver};

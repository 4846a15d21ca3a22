//! Provider session factory
//!
//! A [`Provider`] is configured once per host-tool instantiation from the
//! declarative block. Resource operations then call
//! [`Provider::helm_configuration`] to obtain a fresh, namespace-scoped
//! [`HelmSession`]; nothing is cached across calls. Initialization runs
//! under an internal lock because the underlying client setup is not
//! specified as safe for concurrent invocation.

use tokio::sync::Mutex;

use helmbridge_config::{
    ClusterAccess, DriverKind, Environment, ProviderBlock, ResolvedSettings, Resolver,
};
use kube::Client;

use crate::access;
use crate::error::Result;
use crate::storage::{self, ReleaseStore};

/// Configured provider instance.
///
/// Settings and cluster access are immutable after `configure`; the lock
/// only serializes session initialization.
pub struct Provider {
    settings: ResolvedSettings,
    access: ClusterAccess,
    init_lock: Mutex<()>,
}

impl Provider {
    /// Resolve the declarative block against the process environment
    pub fn configure(block: ProviderBlock) -> Result<Self> {
        Self::configure_with_env(block, Environment::capture())
    }

    /// Resolve against an explicit environment snapshot
    pub fn configure_with_env(block: ProviderBlock, env: Environment) -> Result<Self> {
        let resolved = Resolver::new(block, env).resolve()?;
        tracing::debug!(
            driver = %resolved.settings.driver,
            namespace = %resolved.settings.namespace,
            "provider configured"
        );
        Ok(Self {
            settings: resolved.settings,
            access: resolved.access,
            init_lock: Mutex::new(()),
        })
    }

    /// Resolved Helm settings
    pub fn settings(&self) -> &ResolvedSettings {
        &self.settings
    }

    /// Resolved cluster access
    pub fn cluster_access(&self) -> &ClusterAccess {
        &self.access
    }

    /// Produce a Helm action configuration bound to `namespace`.
    ///
    /// Each call initializes a fresh session; failures surface verbatim
    /// with no retries.
    pub async fn helm_configuration(&self, namespace: &str) -> Result<HelmSession> {
        let _guard = self.init_lock.lock().await;

        if self.settings.debug {
            tracing::debug!(
                namespace,
                driver = %self.settings.driver,
                host = ?self.access.host,
                kubeconfig = ?self.access.kubeconfig_path,
                "initializing helm session"
            );
        }

        let mut config = access::client_config(&self.access).await?;
        config.default_namespace = namespace.to_string();
        let client = Client::try_from(config)?;
        let store = storage::open(self.settings.driver, client.clone(), namespace);

        Ok(HelmSession {
            client,
            store,
            driver: self.settings.driver,
            namespace: namespace.to_string(),
        })
    }
}

/// A ready-to-use action configuration, scoped to one namespace.
///
/// Owned by the resource operation that requested it; dropped after use.
pub struct HelmSession {
    client: Client,
    store: Box<dyn ReleaseStore>,
    driver: DriverKind,
    namespace: String,
}

impl HelmSession {
    /// The lazy Kubernetes client backing this session
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// The release store this session writes to
    pub fn store(&self) -> &dyn ReleaseStore {
        self.store.as_ref()
    }

    /// Backend driver kind
    pub fn driver(&self) -> DriverKind {
        self.driver
    }

    /// Namespace this session is bound to
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

//! Building kube client configuration from resolved cluster access
//!
//! The resolved [`ClusterAccess`] can describe four connection shapes:
//! in-cluster config, a kube config file with per-field overrides, a
//! bare API server endpoint with credentials (no file at all), or
//! nothing, in which case discovery is left to the client library.

use helmbridge_config::ClusterAccess;
use kube::config::{
    AuthInfo, Cluster, Context, KubeConfigOptions, Kubeconfig, NamedAuthInfo, NamedCluster,
    NamedContext,
};
use kube::{Client, Config};

use crate::error::Result;

/// Name used for the synthetic cluster/user/context assembled from
/// overrides when no config file participates
const OVERRIDE_NAME: &str = "helmbridge";

/// Build a `kube::Config` for the given cluster access.
///
/// No connection is attempted here; failures are config-shaped only
/// (unreadable file, unknown context, malformed data).
pub async fn client_config(access: &ClusterAccess) -> Result<Config> {
    if access.in_cluster {
        tracing::debug!("using in-cluster configuration");
        return Ok(Config::incluster()?);
    }

    let kubeconfig = load_kubeconfig(access)?;

    let mut config = match kubeconfig {
        Some(kc) => {
            let kc = apply_overrides(kc, access);
            let options = KubeConfigOptions {
                context: access.context.clone(),
                ..Default::default()
            };
            Config::from_custom_kubeconfig(kc, &options).await?
        }
        None if access.host.is_some() => {
            let kc = synthetic_kubeconfig(access);
            let options = KubeConfigOptions {
                context: Some(OVERRIDE_NAME.to_string()),
                ..Default::default()
            };
            Config::from_custom_kubeconfig(kc, &options).await?
        }
        None => {
            tracing::debug!("no kubeconfig or host overrides, inferring configuration");
            Config::infer().await?
        }
    };

    if let Some(namespace) = &access.namespace {
        config.default_namespace = namespace.clone();
    }

    Ok(config)
}

/// Build a lazy client for the given cluster access
pub async fn connect(access: &ClusterAccess) -> Result<Client> {
    let config = client_config(access).await?;
    Ok(Client::try_from(config)?)
}

/// Read the kube config file if one participates in this resolution.
///
/// A configured path that does not exist on disk is not fatal: the
/// connection may still be fully described by overrides, so the file
/// layer is skipped with a diagnostic.
fn load_kubeconfig(access: &ClusterAccess) -> Result<Option<Kubeconfig>> {
    if !access.load_config_file {
        return Ok(None);
    }
    let Some(path) = &access.kubeconfig_path else {
        return Ok(None);
    };
    if !path.exists() {
        tracing::debug!(path = %path.display(), "kubeconfig does not exist, skipping file layer");
        return Ok(None);
    }

    tracing::debug!(path = %path.display(), "loading kubeconfig");
    Ok(Some(Kubeconfig::read_from(path)?))
}

/// Merge explicit access fields into a loaded kubeconfig.
///
/// Overrides target the cluster and user referenced by the selected
/// context (explicit context, else the file's current context), falling
/// back to the first entries for files without one.
fn apply_overrides(mut kc: Kubeconfig, access: &ClusterAccess) -> Kubeconfig {
    let selected = access
        .context
        .as_deref()
        .or(kc.current_context.as_deref());
    let target = selected
        .and_then(|name| kc.contexts.iter().find(|c| c.name == name))
        .and_then(|c| c.context.as_ref());

    let (cluster_name, user_name) = match target {
        Some(ctx) => (Some(ctx.cluster.clone()), ctx.user.clone()),
        None => (
            kc.clusters.first().map(|c| c.name.clone()),
            kc.auth_infos.first().map(|a| a.name.clone()),
        ),
    };

    if let Some(name) = cluster_name {
        for named in &mut kc.clusters {
            if named.name == name
                && let Some(cluster) = &mut named.cluster
            {
                override_cluster(cluster, access);
            }
        }
    }
    if let Some(name) = user_name {
        for named in &mut kc.auth_infos {
            if named.name == name
                && let Some(auth) = &mut named.auth_info
            {
                override_auth(auth, access);
            }
        }
    }

    kc
}

fn override_cluster(cluster: &mut Cluster, access: &ClusterAccess) {
    if let Some(host) = &access.host {
        cluster.server = Some(host.clone());
    }
    if let Some(insecure) = access.insecure {
        cluster.insecure_skip_tls_verify = Some(insecure);
    }
    if let Some(ca) = &access.cluster_ca_certificate {
        cluster.certificate_authority = None;
        cluster.certificate_authority_data = Some(encode_pem(ca));
    }
}

fn override_auth(auth: &mut AuthInfo, access: &ClusterAccess) {
    if let Some(username) = &access.username {
        auth.username = Some(username.clone());
    }
    if let Some(password) = &access.password {
        auth.password = Some(password.clone().into());
    }
    if let Some(token) = &access.token {
        auth.token = Some(token.clone().into());
    }
    if let Some(cert) = &access.client_certificate {
        auth.client_certificate = None;
        auth.client_certificate_data = Some(encode_pem(cert));
    }
    if let Some(key) = &access.client_key {
        auth.client_key = None;
        auth.client_key_data = Some(encode_pem(key).into());
    }
}

/// Assemble a single-cluster kubeconfig purely from overrides
fn synthetic_kubeconfig(access: &ClusterAccess) -> Kubeconfig {
    let mut cluster = Cluster {
        server: access.host.clone(),
        ..Default::default()
    };
    let mut auth = AuthInfo::default();
    override_cluster(&mut cluster, access);
    override_auth(&mut auth, access);

    Kubeconfig {
        clusters: vec![NamedCluster {
            name: OVERRIDE_NAME.to_string(),
            cluster: Some(cluster),
        }],
        contexts: vec![NamedContext {
            name: OVERRIDE_NAME.to_string(),
            context: Some(Context {
                cluster: OVERRIDE_NAME.to_string(),
                user: Some(OVERRIDE_NAME.to_string()),
                namespace: access.namespace.clone(),
                ..Default::default()
            }),
        }],
        auth_infos: vec![NamedAuthInfo {
            name: OVERRIDE_NAME.to_string(),
            auth_info: Some(auth),
        }],
        current_context: Some(OVERRIDE_NAME.to_string()),
        ..Default::default()
    }
}

/// Kubeconfig `*-data` fields carry base64-encoded PEM
fn encode_pem(pem: &str) -> String {
    base64::Engine::encode(&base64::engine::general_purpose::STANDARD, pem.as_bytes())
}

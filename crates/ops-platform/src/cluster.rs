//! Kubernetes adapter for [`ClusterPort`].
//!
//! Reads go through `Api::get`; writes are JSON merge patches that carry the
//! complete map, so keys the caller kept stay and the one it set is updated.

use async_trait::async_trait;
use k8s_openapi::api::{apps::v1::Deployment, core::v1::ConfigMap};
use kube::{
    api::{Api, Patch, PatchParams},
    config::{KubeConfigOptions, Kubeconfig},
    Client, Config,
};
use serde_json::json;

use ops_core::ports::{ClusterPort, StringMap};
use ops_types::{config::ClusterConfig, OpsError, Result};

pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from in-cluster credentials, an explicit kubeconfig,
    /// or the default kubeconfig lookup, optionally pinned to a context.
    pub async fn connect(cluster: &ClusterConfig) -> Result<Self> {
        let config = if cluster.in_cluster {
            Config::incluster().map_err(|e| OpsError::Config(format!("in-cluster config: {}", e)))?
        } else {
            let options = KubeConfigOptions {
                context: cluster.context.clone(),
                ..Default::default()
            };
            match &cluster.kubeconfig {
                Some(path) => {
                    let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                        OpsError::Config(format!("failed to read {}: {}", path.display(), e))
                    })?;
                    Config::from_custom_kubeconfig(kubeconfig, &options)
                        .await
                        .map_err(|e| OpsError::Config(e.to_string()))?
                }
                None => Config::from_kubeconfig(&options)
                    .await
                    .map_err(|e| OpsError::Config(e.to_string()))?,
            }
        };

        let client = Client::try_from(config).map_err(cluster_err)?;
        log::info!(
            "Kubernetes client ready (context: {})",
            cluster.context.as_deref().unwrap_or("current")
        );
        Ok(Self::new(client))
    }

    fn config_maps(&self, namespace: &str) -> Api<ConfigMap> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn deployments(&self, namespace: &str) -> Api<Deployment> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

/// API errors carry the server's message (`configmaps "x" not found`);
/// everything else is the transport error text.
fn cluster_err(e: kube::Error) -> OpsError {
    match e {
        kube::Error::Api(resp) => OpsError::Cluster(resp.message),
        other => OpsError::Cluster(other.to_string()),
    }
}

#[async_trait(?Send)]
impl ClusterPort for KubeCluster {
    async fn get_config_data(&self, name: &str, namespace: &str) -> Result<Option<StringMap>> {
        let cm = self.config_maps(namespace).get(name).await.map_err(cluster_err)?;
        Ok(cm.data)
    }

    async fn patch_config_data(&self, name: &str, namespace: &str, data: &StringMap) -> Result<()> {
        let patch = json!({ "data": data });
        self.config_maps(namespace)
            .patch(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(cluster_err)?;
        Ok(())
    }

    async fn get_template_annotations(&self, name: &str, namespace: &str) -> Result<Option<StringMap>> {
        let deployment = self.deployments(namespace).get(name).await.map_err(cluster_err)?;
        Ok(deployment
            .spec
            .and_then(|spec| spec.template.metadata)
            .and_then(|meta| meta.annotations))
    }

    async fn patch_template_annotations(
        &self,
        name: &str,
        namespace: &str,
        annotations: &StringMap,
    ) -> Result<()> {
        let patch = json!({
            "spec": {
                "template": {
                    "metadata": {
                        "annotations": annotations,
                    }
                }
            }
        });
        self.deployments(namespace)
            .patch(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(cluster_err)?;
        Ok(())
    }
}

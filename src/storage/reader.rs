use async_trait::async_trait;
use k8s_openapi::api::autoscaling::v1::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{Event, Pod, ReplicationController};

use super::Storage;
use crate::error::Result;
use crate::models::{DeploymentConfig, LabelSelector};

/// Read-only view of the cluster objects a description needs.
#[async_trait]
pub trait ClusterReader: Send + Sync {
    async fn get_deployment_config(&self, namespace: &str, name: &str) -> Result<DeploymentConfig>;

    async fn get_replication_controller(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<ReplicationController>;

    async fn list_replication_controllers(
        &self,
        namespace: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<ReplicationController>>;

    async fn list_pods(&self, namespace: &str, selector: &LabelSelector) -> Result<Vec<Pod>>;

    async fn list_autoscalers(&self, namespace: &str) -> Result<Vec<HorizontalPodAutoscaler>>;

    /// Events about `kind/name`, oldest first.
    async fn search_events(&self, namespace: &str, kind: &str, name: &str) -> Result<Vec<Event>>;
}

#[async_trait]
impl ClusterReader for Storage {
    async fn get_deployment_config(&self, namespace: &str, name: &str) -> Result<DeploymentConfig> {
        self.deployment_configs().get(namespace, name).await
    }

    async fn get_replication_controller(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<ReplicationController> {
        self.replication_controllers().get(namespace, name).await
    }

    async fn list_replication_controllers(
        &self,
        namespace: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<ReplicationController>> {
        self.replication_controllers().list(Some(namespace), selector).await
    }

    async fn list_pods(&self, namespace: &str, selector: &LabelSelector) -> Result<Vec<Pod>> {
        self.pods().list(Some(namespace), selector).await
    }

    async fn list_autoscalers(&self, namespace: &str) -> Result<Vec<HorizontalPodAutoscaler>> {
        self.autoscalers()
            .list(Some(namespace), &LabelSelector::everything())
            .await
    }

    async fn search_events(&self, namespace: &str, kind: &str, name: &str) -> Result<Vec<Event>> {
        self.events().search(namespace, kind, name).await
    }
}

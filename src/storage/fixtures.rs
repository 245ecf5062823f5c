//! Loads multi-document YAML manifests into storage.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use super::{ObjectStore, Storage, StoredObject};
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub deployment_configs: usize,
    pub replication_controllers: usize,
    pub pods: usize,
    pub autoscalers: usize,
    pub events: usize,
    pub skipped: usize,
}

impl LoadSummary {
    pub fn total(&self) -> usize {
        self.deployment_configs + self.replication_controllers + self.pods + self.autoscalers + self.events
    }
}

async fn store<T: StoredObject>(store: ObjectStore<T>, namespace: &str, value: Value) -> Result<()> {
    let object: T = serde_json::from_value(value)?;
    store.create(namespace, object).await?;
    Ok(())
}

pub async fn load_documents(storage: &Storage, contents: &str, default_namespace: &str) -> Result<LoadSummary> {
    let mut summary = LoadSummary::default();

    for document in serde_yaml::Deserializer::from_str(contents) {
        let value = Value::deserialize(document)?;
        if value.is_null() {
            continue;
        }

        let kind = value
            .get("kind")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let namespace = value
            .pointer("/metadata/namespace")
            .and_then(Value::as_str)
            .unwrap_or(default_namespace)
            .to_string();

        match kind.as_str() {
            "DeploymentConfig" => {
                store(storage.deployment_configs(), &namespace, value).await?;
                summary.deployment_configs += 1;
            }
            "ReplicationController" => {
                store(storage.replication_controllers(), &namespace, value).await?;
                summary.replication_controllers += 1;
            }
            "Pod" => {
                store(storage.pods(), &namespace, value).await?;
                summary.pods += 1;
            }
            "HorizontalPodAutoscaler" => {
                store(storage.autoscalers(), &namespace, value).await?;
                summary.autoscalers += 1;
            }
            "Event" => {
                store(storage.events(), &namespace, value).await?;
                summary.events += 1;
            }
            other => {
                warn!("Skipping document of unsupported kind {:?}", other);
                summary.skipped += 1;
            }
        }
    }

    Ok(summary)
}

pub async fn load_file(storage: &Storage, path: &Path, default_namespace: &str) -> Result<LoadSummary> {
    let contents = tokio::fs::read_to_string(path).await?;
    let summary = load_documents(storage, &contents, default_namespace).await?;
    info!("Loaded {} objects from {}", summary.total(), path.display());
    Ok(summary)
}

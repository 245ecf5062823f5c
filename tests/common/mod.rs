// Shared fixtures for the integration tests

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use k8s_openapi::api::core::v1::Event;
use rollout_describe::storage::fixtures::{self, LoadSummary};
use rollout_describe::Storage;
use serde_json::json;

pub const NAMESPACE: &str = "shop";

pub const FRONTEND: &str = include_str!("../fixtures/frontend.yaml");

/// The instant the fixture timestamps are relative to.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

pub async fn frontend_storage() -> (Storage, LoadSummary) {
    let storage = Storage::in_memory().await.unwrap();
    let summary = fixtures::load_documents(&storage, FRONTEND, NAMESPACE)
        .await
        .unwrap();
    (storage, summary)
}

pub fn config_event(name: &str, reason: &str, minutes_ago: i64) -> Event {
    let seen = now() - chrono::Duration::minutes(minutes_ago);
    serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Event",
        "metadata": {
            "name": format!("{}.{}", name, reason.to_lowercase()),
        },
        "involvedObject": {
            "kind": "DeploymentConfig",
            "name": name,
            "namespace": NAMESPACE,
        },
        "reason": reason,
        "message": format!("{} for {}", reason, name),
        "type": "Normal",
        "source": { "component": "deploymentconfig-controller" },
        "firstTimestamp": seen.to_rfc3339(),
        "lastTimestamp": seen.to_rfc3339(),
        "count": 1,
    }))
    .unwrap()
}

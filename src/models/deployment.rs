//! Accessors for the annotations that tie a replication controller back to the
//! deployment config that produced it.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::ReplicationController;

use super::selector::LabelSelector;

pub const DEPLOYMENT_CONFIG_ANNOTATION: &str = "openshift.io/deployment-config.name";
pub const DEPLOYMENT_CONFIG_LABEL: &str = "openshift.io/deployment-config.name";
pub const DEPLOYMENT_VERSION_ANNOTATION: &str = "openshift.io/deployment-config.latest-version";
pub const DEPLOYMENT_PHASE_ANNOTATION: &str = "openshift.io/deployment.phase";
pub const DEPLOYMENT_STATUS_REASON_ANNOTATION: &str = "openshift.io/deployment.status-reason";
pub const DEPLOYMENT_CANCELLED_ANNOTATION: &str = "openshift.io/deployment.cancelled";
pub const DEPLOYMENT_CAUSE_ANNOTATION: &str = "openshift.io/deployment.cause";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeploymentPhase {
    New,
    Pending,
    Running,
    Complete,
    Failed,
    Unknown,
}

impl DeploymentPhase {
    pub fn parse(value: &str) -> Self {
        match value {
            "New" => DeploymentPhase::New,
            "Pending" => DeploymentPhase::Pending,
            "Running" => DeploymentPhase::Running,
            "Complete" => DeploymentPhase::Complete,
            "Failed" => DeploymentPhase::Failed,
            _ => DeploymentPhase::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentPhase::New => "New",
            DeploymentPhase::Pending => "Pending",
            DeploymentPhase::Running => "Running",
            DeploymentPhase::Complete => "Complete",
            DeploymentPhase::Failed => "Failed",
            DeploymentPhase::Unknown => "Unknown",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DeploymentPhase::Complete | DeploymentPhase::Failed)
    }
}

impl fmt::Display for DeploymentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What caused a deployment to be created, as recorded on the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerCause {
    ConfigChange,
    ImageChange,
}

pub fn deployment_name(config_name: &str, version: i64) -> String {
    format!("{}-{}", config_name, version)
}

/// Selects every controller materialized from the named config.
pub fn config_selector(config_name: &str) -> LabelSelector {
    LabelSelector::from_pairs([(DEPLOYMENT_CONFIG_LABEL, config_name)])
}

fn annotation<'a>(rc: &'a ReplicationController, key: &str) -> Option<&'a str> {
    rc.metadata
        .annotations
        .as_ref()
        .and_then(|annotations| annotations.get(key))
        .map(String::as_str)
}

pub fn config_name_for(rc: &ReplicationController) -> Option<&str> {
    annotation(rc, DEPLOYMENT_CONFIG_ANNOTATION).filter(|name| !name.is_empty())
}

/// The controller's version. Versions start at 1; anything else is treated as absent.
pub fn version_for(rc: &ReplicationController) -> Option<i64> {
    annotation(rc, DEPLOYMENT_VERSION_ANNOTATION)?
        .trim()
        .parse()
        .ok()
        .filter(|version| *version >= 1)
}

pub fn phase_for(rc: &ReplicationController) -> DeploymentPhase {
    annotation(rc, DEPLOYMENT_PHASE_ANNOTATION)
        .map(DeploymentPhase::parse)
        .unwrap_or(DeploymentPhase::Unknown)
}

pub fn status_reason_for(rc: &ReplicationController) -> Option<&str> {
    annotation(rc, DEPLOYMENT_STATUS_REASON_ANNOTATION).filter(|reason| !reason.is_empty())
}

pub fn is_cancelled(rc: &ReplicationController) -> bool {
    annotation(rc, DEPLOYMENT_CANCELLED_ANNOTATION) == Some("true")
}

pub fn cause_for(rc: &ReplicationController) -> Option<TriggerCause> {
    match annotation(rc, DEPLOYMENT_CAUSE_ANNOTATION)? {
        "ConfigChange" => Some(TriggerCause::ConfigChange),
        "ImageChange" => Some(TriggerCause::ImageChange),
        _ => None,
    }
}

pub fn name_of(rc: &ReplicationController) -> &str {
    rc.metadata.name.as_deref().unwrap_or_default()
}

pub fn created_at(rc: &ReplicationController) -> Option<DateTime<Utc>> {
    rc.metadata.creation_timestamp.as_ref().map(|time| time.0)
}

pub fn desired_replicas(rc: &ReplicationController) -> i32 {
    rc.spec
        .as_ref()
        .and_then(|spec| spec.replicas)
        .unwrap_or_default()
}

pub fn current_replicas(rc: &ReplicationController) -> i32 {
    rc.status
        .as_ref()
        .map(|status| status.replicas)
        .unwrap_or_default()
}

pub fn selector_for(rc: &ReplicationController) -> BTreeMap<String, String> {
    rc.spec
        .as_ref()
        .and_then(|spec| spec.selector.clone())
        .unwrap_or_default()
}

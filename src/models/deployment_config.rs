use std::collections::BTreeMap;
use std::fmt;

use k8s_openapi::api::core::v1::{EnvVar, ObjectReference, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEPLOYMENT_CONFIG_KIND: &str = "DeploymentConfig";
pub const DEPLOYMENT_CONFIG_API_VERSION: &str = "apps.openshift.io/v1";

/// Declarative deployment definition. Every rollout of it materializes a new
/// versioned replication controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfig {
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: DeploymentConfigSpec,
    #[serde(default)]
    pub status: DeploymentConfigStatus,
}

fn default_api_version() -> String {
    DEPLOYMENT_CONFIG_API_VERSION.to_string()
}

fn default_kind() -> String {
    DEPLOYMENT_CONFIG_KIND.to_string()
}

impl DeploymentConfig {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            spec: DeploymentConfigSpec::default(),
            status: DeploymentConfigStatus::default(),
        }
    }

    pub fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }

    pub fn namespace(&self) -> &str {
        self.metadata.namespace.as_deref().unwrap_or_default()
    }

    /// Name of the replication controller the config is currently driving toward.
    pub fn latest_deployment_name(&self) -> String {
        super::deployment::deployment_name(self.name(), self.status.latest_version)
    }

    pub fn failure_message(&self) -> Option<&str> {
        self.status
            .details
            .as_ref()
            .map(|details| details.message.as_str())
            .filter(|message| !message.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfigSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<DeploymentStrategy>,
    #[serde(default)]
    pub triggers: Vec<DeploymentTriggerPolicy>,
    #[serde(default)]
    pub replicas: i32,
    #[serde(default)]
    pub test: bool,
    #[serde(default)]
    pub selector: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PodTemplateSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfigStatus {
    #[serde(default)]
    pub latest_version: i64,
    #[serde(default)]
    pub observed_generation: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<DeploymentDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentDetails {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub causes: Vec<DeploymentCause>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentCause {
    #[serde(rename = "type")]
    pub cause_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DeploymentStrategyFields", into = "DeploymentStrategyFields")]
pub enum DeploymentStrategy {
    Recreate { params: Option<RecreateParams> },
    Rolling { params: Option<RollingParams> },
    Custom { params: Option<CustomParams> },
    /// A strategy type without a model here, kept under its stored name.
    Unknown(String),
}

impl DeploymentStrategy {
    pub fn name(&self) -> &str {
        match self {
            DeploymentStrategy::Recreate { .. } => "Recreate",
            DeploymentStrategy::Rolling { .. } => "Rolling",
            DeploymentStrategy::Custom { .. } => "Custom",
            DeploymentStrategy::Unknown(name) => name,
        }
    }
}

// Wire shape of a strategy: `type` plus the params block that goes with it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeploymentStrategyFields {
    #[serde(rename = "type", default)]
    strategy_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recreate_params: Option<RecreateParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rolling_params: Option<RollingParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom_params: Option<CustomParams>,
}

impl From<DeploymentStrategyFields> for DeploymentStrategy {
    fn from(fields: DeploymentStrategyFields) -> Self {
        match fields.strategy_type.as_str() {
            "Recreate" => DeploymentStrategy::Recreate {
                params: fields.recreate_params,
            },
            "Rolling" => DeploymentStrategy::Rolling {
                params: fields.rolling_params,
            },
            "Custom" => DeploymentStrategy::Custom {
                params: fields.custom_params,
            },
            _ => DeploymentStrategy::Unknown(fields.strategy_type),
        }
    }
}

impl From<DeploymentStrategy> for DeploymentStrategyFields {
    fn from(strategy: DeploymentStrategy) -> Self {
        let mut fields = DeploymentStrategyFields {
            strategy_type: strategy.name().to_string(),
            ..Default::default()
        };
        match strategy {
            DeploymentStrategy::Recreate { params } => fields.recreate_params = params,
            DeploymentStrategy::Rolling { params } => fields.rolling_params = params,
            DeploymentStrategy::Custom { params } => fields.custom_params = params,
            DeploymentStrategy::Unknown(_) => {}
        }
        fields
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecreateParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre: Option<LifecycleHook>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid: Option<LifecycleHook>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<LifecycleHook>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_period_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_unavailable: Option<IntOrString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_surge: Option<IntOrString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre: Option<LifecycleHook>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<LifecycleHook>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomParams {
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub environment: Vec<EnvVar>,
    #[serde(default)]
    pub command: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailurePolicy {
    #[default]
    Abort,
    Retry,
    #[serde(alias = "Continue")]
    Ignore,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailurePolicy::Abort => "Abort",
            FailurePolicy::Retry => "Retry",
            FailurePolicy::Ignore => "Ignore",
        };
        f.write_str(name)
    }
}

/// A hook executed at a fixed point of a rollout. `action` is `None` when the
/// stored hook names neither a pod nor any image tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "LifecycleHookFields", into = "LifecycleHookFields")]
pub struct LifecycleHook {
    pub failure_policy: FailurePolicy,
    pub action: Option<HookAction>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HookAction {
    ExecNewPod(ExecNewPodHook),
    TagImages(Vec<TagImageHook>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecNewPodHook {
    #[serde(default)]
    pub container_name: String,
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default)]
    pub env: Vec<EnvVar>,
    #[serde(default)]
    pub volumes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagImageHook {
    #[serde(default)]
    pub container_name: String,
    #[serde(default)]
    pub to: ObjectReference,
}

// Wire shape of a hook: at most one of the action fields is expected to be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LifecycleHookFields {
    #[serde(default)]
    failure_policy: FailurePolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exec_new_pod: Option<ExecNewPodHook>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tag_images: Vec<TagImageHook>,
}

impl From<LifecycleHookFields> for LifecycleHook {
    fn from(fields: LifecycleHookFields) -> Self {
        let action = match (fields.exec_new_pod, fields.tag_images) {
            (Some(exec), tags) => {
                if !tags.is_empty() {
                    debug!(
                        "Hook runs container {:?}; ignoring its {} image tags",
                        exec.container_name,
                        tags.len()
                    );
                }
                Some(HookAction::ExecNewPod(exec))
            }
            (None, tags) if !tags.is_empty() => Some(HookAction::TagImages(tags)),
            _ => None,
        };
        Self {
            failure_policy: fields.failure_policy,
            action,
        }
    }
}

impl From<LifecycleHook> for LifecycleHookFields {
    fn from(hook: LifecycleHook) -> Self {
        let mut fields = LifecycleHookFields {
            failure_policy: hook.failure_policy,
            ..Default::default()
        };
        match hook.action {
            Some(HookAction::ExecNewPod(exec)) => fields.exec_new_pod = Some(exec),
            Some(HookAction::TagImages(tags)) => fields.tag_images = tags,
            None => {}
        }
        fields
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DeploymentTriggerPolicy {
    ConfigChange,
    ImageChange {
        #[serde(rename = "imageChangeParams", default)]
        params: ImageChangeParams,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageChangeParams {
    #[serde(default)]
    pub automatic: bool,
    #[serde(default)]
    pub container_names: Vec<String>,
    #[serde(default)]
    pub from: ObjectReference,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_triggered_image: String,
}

impl ImageChangeParams {
    /// Splits `from.name` (`stream:tag`) into its stream and tag, defaulting the tag to `latest`.
    pub fn stream_and_tag(&self) -> Option<(&str, &str)> {
        let name = self.from.name.as_deref().filter(|name| !name.is_empty())?;
        match name.rsplit_once(':') {
            Some((stream, tag)) if !tag.is_empty() => Some((stream, tag)),
            Some((stream, _)) => Some((stream, "latest")),
            None => Some((name, "latest")),
        }
    }
}

use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::ReplicationController;
use tracing::debug;

use super::format::format_relative_time;
use super::writer::PrefixWriter;
use crate::error::Result;
use crate::graph::{relevant_deployments, HistoryLimit, LineageGraph};
use crate::models::deployment::{self, config_selector, DeploymentPhase};
use crate::models::deployment_config::DeploymentTriggerPolicy;
use crate::models::DeploymentConfig;
use crate::storage::ClusterReader;

/// One status line per deployment of a config, most recent first.
pub struct LatestDeploymentsDescriber<'a, R: ?Sized> {
    reader: &'a R,
    limit: HistoryLimit,
    now: DateTime<Utc>,
}

impl<'a, R: ClusterReader + ?Sized> LatestDeploymentsDescriber<'a, R> {
    pub fn new(reader: &'a R, limit: HistoryLimit) -> Self {
        Self {
            reader,
            limit,
            now: Utc::now(),
        }
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub async fn describe(&self, namespace: &str, name: &str) -> Result<String> {
        let config = self.reader.get_deployment_config(namespace, name).await?;

        let controllers = match self.limit {
            HistoryLimit::Count(count) if count <= 1 => {
                let latest = config.latest_deployment_name();
                match self.reader.get_replication_controller(namespace, &latest).await {
                    Ok(controller) => vec![controller],
                    Err(e) if e.is_not_found() => {
                        debug!("Latest deployment {}/{} not found", namespace, latest);
                        Vec::new()
                    }
                    Err(e) => return Err(e),
                }
            }
            _ => {
                match self
                    .reader
                    .list_replication_controllers(namespace, &config_selector(name))
                    .await
                {
                    Ok(controllers) => controllers,
                    Err(e) if e.is_not_found() => Vec::new(),
                    Err(e) => return Err(e),
                }
            }
        };

        let (graph, root) = LineageGraph::build(&config, controllers);
        let relevant = relevant_deployments(&graph, root, self.limit);

        let mut lines = Vec::new();
        let mut to_print = Vec::new();
        match relevant.active.and_then(|index| graph.deployment(index)) {
            Some(active) => to_print.push(&active.controller),
            None => {
                let (on, automatic) = describe_triggers(&config);
                if config.status.latest_version == 0 {
                    lines.push(format!("deployment #1 waiting {}", on));
                } else if automatic {
                    lines.push(format!(
                        "deployment #{} pending {}",
                        config.status.latest_version, on
                    ));
                }
            }
        }
        to_print.extend(
            relevant
                .inactive
                .iter()
                .filter_map(|&index| graph.deployment(index))
                .map(|node| &node.controller),
        );

        for (i, controller) in to_print.into_iter().enumerate() {
            lines.push(self.describe_status(controller, i == 0, config.spec.test));
            let done = match self.limit {
                HistoryLimit::UntilLastSuccess => {
                    deployment::phase_for(controller) == DeploymentPhase::Complete
                }
                HistoryLimit::Count(count) => i + 1 >= count,
            };
            if done {
                break;
            }
        }

        let prefix = format!("{} ", name);
        let mut w = PrefixWriter::new();
        for line in lines {
            w.line(&prefix, line);
        }
        Ok(w.finish())
    }

    fn describe_status(&self, controller: &ReplicationController, first: bool, test: bool) -> String {
        let time_at = deployment::created_at(controller)
            .map(|created| format_relative_time(created, self.now))
            .unwrap_or_else(|| "<unknown>".to_string());
        let phase = deployment::phase_for(controller);
        let version = deployment::version_for(controller)
            .map(|version| version.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        let cancelling = if deployment::is_cancelled(controller) && !phase.is_terminal() {
            " (cancelling)"
        } else {
            ""
        };
        let test = if test { "test " } else { "" };

        match phase {
            DeploymentPhase::Failed => {
                let reason = deployment::status_reason_for(controller)
                    .map(|reason| format!(": {}", reason))
                    .unwrap_or_default();
                format!(
                    "deployment #{} failed {} ago{}{}",
                    version,
                    time_at,
                    reason,
                    pod_summary_inline(controller, false)
                )
            }
            DeploymentPhase::Complete if !test.is_empty() => {
                format!("test deployment #{} deployed {} ago", version, time_at)
            }
            DeploymentPhase::Complete => format!(
                "deployment #{} deployed {} ago{}",
                version,
                time_at,
                pod_summary_inline(controller, first)
            ),
            DeploymentPhase::Running => format!(
                "{}deployment #{} running{} for {}{}",
                test,
                version,
                cancelling,
                time_at,
                pod_summary_inline(controller, false)
            ),
            DeploymentPhase::New | DeploymentPhase::Pending | DeploymentPhase::Unknown => format!(
                "deployment #{} {}{} {} ago{}",
                version,
                phase.as_str().to_lowercase(),
                cancelling,
                time_at,
                pod_summary_inline(controller, false)
            ),
        }
    }
}

/// How a new deployment of the config would come about, and whether it
/// happens without a manual rollout.
pub fn describe_triggers(config: &DeploymentConfig) -> (&'static str, bool) {
    let has_config = config
        .spec
        .triggers
        .iter()
        .any(|trigger| matches!(trigger, DeploymentTriggerPolicy::ConfigChange));
    let has_image = config
        .spec
        .triggers
        .iter()
        .any(|trigger| matches!(trigger, DeploymentTriggerPolicy::ImageChange { .. }));

    match (has_config, has_image) {
        (true, true) => ("on image or update", true),
        (true, false) => ("on update", true),
        (false, true) => ("on image", true),
        (false, false) => ("for manual", false),
    }
}

fn pod_summary(controller: &ReplicationController, include_empty: bool) -> Option<String> {
    let actual = deployment::current_replicas(controller);
    let requested = deployment::desired_replicas(controller);
    if actual != requested {
        return Some(format!("{}/{} pods", actual, requested));
    }
    match actual {
        0 if include_empty => Some("0 pods".to_string()),
        0 => None,
        1 => Some("1 pod".to_string()),
        n => Some(format!("{} pods", n)),
    }
}

fn pod_summary_inline(controller: &ReplicationController, include_empty: bool) -> String {
    let Some(summary) = pod_summary(controller, include_empty) else {
        return String::new();
    };
    let actual = deployment::current_replicas(controller);
    let desired = deployment::desired_replicas(controller);
    let change = if desired < actual {
        format!(" reducing to {}", desired)
    } else if desired > actual {
        format!(" growing to {}", desired)
    } else {
        String::new()
    };
    format!(" - {}{}", summary, change)
}

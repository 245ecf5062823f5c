use super::{LineageGraph, NodeIndex};
use crate::models::deployment::{self, DeploymentPhase};

/// How much history to keep besides the active deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryLimit {
    Count(usize),
    /// Keep going until the most recent completed deployment, inclusive.
    UntilLastSuccess,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelevantDeployments {
    pub active: Option<NodeIndex>,
    /// Most relevant first.
    pub inactive: Vec<NodeIndex>,
}

/// Picks the deployment the config is currently driving toward and the prior
/// deployments worth showing next to it.
///
/// Membership is reachability from the config node; a trigger edge is not
/// required. Controllers sharing the active version never appear in the
/// inactive list.
pub fn relevant_deployments(
    graph: &LineageGraph,
    config_node: NodeIndex,
    limit: HistoryLimit,
) -> RelevantDeployments {
    let Some(config) = graph.config(config_node) else {
        return RelevantDeployments::default();
    };
    let latest_version = config.status.latest_version;
    let latest_name = config.latest_deployment_name();

    let mut candidates = graph.reachable_deployments(config_node);
    candidates.sort_by(|&a, &b| match (graph.deployment(a), graph.deployment(b)) {
        (Some(a), Some(b)) => a.cmp_relevance(b),
        _ => a.cmp(&b),
    });

    let is_latest = |index: &NodeIndex| {
        latest_version > 0
            && graph.deployment(*index).and_then(|node| node.version) == Some(latest_version)
    };

    let active = candidates
        .iter()
        .copied()
        .filter(is_latest)
        .find(|&index| graph.deployment(index).map(|node| node.name()) == Some(latest_name.as_str()))
        .or_else(|| candidates.iter().copied().find(is_latest));

    let history = candidates.iter().copied().filter(|index| !is_latest(index));
    let inactive = match limit {
        HistoryLimit::Count(count) => history.take(count).collect(),
        HistoryLimit::UntilLastSuccess => {
            let mut inactive = Vec::new();
            for index in history {
                inactive.push(index);
                if graph.deployment(index).map(|node| node.phase) == Some(DeploymentPhase::Complete) {
                    break;
                }
            }
            inactive
        }
    };

    RelevantDeployments { active, inactive }
}

impl RelevantDeployments {
    pub fn active_name<'a>(&self, graph: &'a LineageGraph) -> Option<&'a str> {
        self.active
            .and_then(|index| graph.deployment(index))
            .map(|node| deployment::name_of(&node.controller))
    }
}

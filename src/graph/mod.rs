//! Request-scoped graph relating a deployment config to the replication
//! controllers materialized from it.
//!
//! Nodes live in an arena and are addressed by [`NodeIndex`]. Edges are only
//! ever derived from annotations on the controllers, so a controller with
//! missing or unparseable annotations simply ends up with fewer edges.

pub mod relevancy;

use std::cmp::Ordering;
use std::collections::{BTreeMap, VecDeque};

use k8s_openapi::api::core::v1::ReplicationController;
use tracing::debug;

use crate::models::deployment::{self, DeploymentPhase};
use crate::models::DeploymentConfig;

pub use relevancy::{relevant_deployments, HistoryLimit, RelevantDeployments};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Config owns the controller.
    Deployment,
    /// Controller was created by one of the config's triggers.
    Trigger,
    /// Controller of version `v - 1` precedes the controller of version `v`.
    Lineage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: NodeIndex,
    pub to: NodeIndex,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone)]
pub struct DeploymentNode {
    pub controller: ReplicationController,
    pub version: Option<i64>,
    pub phase: DeploymentPhase,
}

impl DeploymentNode {
    pub fn new(controller: ReplicationController) -> Self {
        Self {
            version: deployment::version_for(&controller),
            phase: deployment::phase_for(&controller),
            controller,
        }
    }

    pub fn name(&self) -> &str {
        deployment::name_of(&self.controller)
    }

    /// Orders nodes from most to least relevant: higher version first, then
    /// newer creation timestamp, then name. Nodes without a version sort last.
    pub fn cmp_relevance(&self, other: &Self) -> Ordering {
        let key = |node: &Self| {
            (
                node.version,
                deployment::created_at(&node.controller),
                node.name().to_string(),
            )
        };
        key(other).cmp(&key(self))
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    DeploymentConfig(DeploymentConfig),
    Deployment(DeploymentNode),
}

#[derive(Debug, Clone, Default)]
pub struct LineageGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    outgoing: Vec<Vec<usize>>,
}

impl LineageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph for one config and the controllers supplied for it.
    /// Returns the graph together with the index of the config node.
    pub fn build(
        config: &DeploymentConfig,
        controllers: impl IntoIterator<Item = ReplicationController>,
    ) -> (Self, NodeIndex) {
        let mut graph = Self::new();
        let config_node = graph.add_node(Node::DeploymentConfig(config.clone()));
        for controller in controllers {
            graph.add_node(Node::Deployment(DeploymentNode::new(controller)));
        }

        graph.add_deployment_edges(config_node);
        graph.add_trigger_edges(config_node);
        graph.add_lineage_edges(config_node);

        debug!(
            config = config.name(),
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "built lineage graph"
        );
        (graph, config_node)
    }

    pub fn add_node(&mut self, node: Node) -> NodeIndex {
        self.nodes.push(node);
        self.outgoing.push(Vec::new());
        NodeIndex(self.nodes.len() - 1)
    }

    /// Adds an edge unless an identical one already exists.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, kind: EdgeKind) {
        if self.has_edge(from, to, kind) {
            return;
        }
        self.edges.push(Edge { from, to, kind });
        self.outgoing[from.0].push(self.edges.len() - 1);
    }

    pub fn has_edge(&self, from: NodeIndex, to: NodeIndex, kind: EdgeKind) -> bool {
        self.outgoing
            .get(from.0)
            .into_iter()
            .flatten()
            .any(|&edge| self.edges[edge].to == to && self.edges[edge].kind == kind)
    }

    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index.0)
    }

    pub fn config(&self, index: NodeIndex) -> Option<&DeploymentConfig> {
        match self.node(index)? {
            Node::DeploymentConfig(config) => Some(config),
            Node::Deployment(_) => None,
        }
    }

    pub fn deployment(&self, index: NodeIndex) -> Option<&DeploymentNode> {
        match self.node(index)? {
            Node::Deployment(deployment) => Some(deployment),
            Node::DeploymentConfig(_) => None,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edges_from(&self, index: NodeIndex) -> impl Iterator<Item = &Edge> + '_ {
        self.outgoing
            .get(index.0)
            .into_iter()
            .flatten()
            .map(move |&edge| &self.edges[edge])
    }

    /// The controller this one superseded, if it was part of the input.
    pub fn predecessor(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.edges
            .iter()
            .find(|edge| edge.kind == EdgeKind::Lineage && edge.to == index)
            .map(|edge| edge.from)
    }

    /// Every deployment node reachable from `start` over any edge kind.
    pub fn reachable_deployments(&self, start: NodeIndex) -> Vec<NodeIndex> {
        let mut seen = vec![false; self.nodes.len()];
        let mut queue = VecDeque::from([start]);
        let mut found = Vec::new();
        if let Some(flag) = seen.get_mut(start.0) {
            *flag = true;
        }

        while let Some(current) = queue.pop_front() {
            for edge in self.edges_from(current) {
                if seen[edge.to.0] {
                    continue;
                }
                seen[edge.to.0] = true;
                if self.deployment(edge.to).is_some() {
                    found.push(edge.to);
                }
                queue.push_back(edge.to);
            }
        }
        found
    }

    fn deployment_indices(&self) -> Vec<NodeIndex> {
        (0..self.nodes.len())
            .map(NodeIndex)
            .filter(|&index| self.deployment(index).is_some())
            .collect()
    }

    fn owned_by(&self, config_node: NodeIndex) -> Vec<NodeIndex> {
        let Some(config) = self.config(config_node) else {
            return Vec::new();
        };
        let name = config.name();
        self.deployment_indices()
            .into_iter()
            .filter(|&index| {
                self.deployment(index)
                    .and_then(|node| deployment::config_name_for(&node.controller))
                    == Some(name)
            })
            .collect()
    }

    fn add_deployment_edges(&mut self, config_node: NodeIndex) {
        for index in self.owned_by(config_node) {
            self.add_edge(config_node, index, EdgeKind::Deployment);
        }
    }

    fn add_trigger_edges(&mut self, config_node: NodeIndex) {
        for index in self.owned_by(config_node) {
            let triggered = self
                .deployment(index)
                .and_then(|node| deployment::cause_for(&node.controller))
                .is_some();
            if triggered {
                self.add_edge(config_node, index, EdgeKind::Trigger);
            }
        }
    }

    fn add_lineage_edges(&mut self, config_node: NodeIndex) {
        // Most relevant controller per version; it is the one later versions descend from.
        let mut by_version: BTreeMap<i64, NodeIndex> = BTreeMap::new();
        let owned = self.owned_by(config_node);
        for &index in &owned {
            let Some(node) = self.deployment(index) else {
                continue;
            };
            let Some(version) = node.version else {
                continue;
            };
            let replace = match by_version.get(&version).and_then(|&i| self.deployment(i)) {
                Some(current) => node.cmp_relevance(current) == Ordering::Less,
                None => true,
            };
            if replace {
                by_version.insert(version, index);
            }
        }

        for index in owned {
            let Some(version) = self.deployment(index).and_then(|node| node.version) else {
                continue;
            };
            let Some(previous_version) = version.checked_sub(1) else {
                continue;
            };
            if let Some(&previous) = by_version.get(&previous_version) {
                self.add_edge(previous, index, EdgeKind::Lineage);
            }
        }
    }
}

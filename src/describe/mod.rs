pub mod deployment_config;
pub mod events;
pub mod format;
pub mod latest;
pub mod pod_template;
pub mod writer;

pub use deployment_config::DeploymentConfigDescriber;
pub use latest::LatestDeploymentsDescriber;
pub use writer::PrefixWriter;

/// Knobs for [`DeploymentConfigDescriber`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriberSettings {
    pub show_events: bool,
    /// Prior deployments shown after the latest one.
    pub max_deployments: usize,
    /// Most recent events shown.
    pub max_events: usize,
    /// Render prior deployments with name, selector and pod status too.
    pub verbose_history: bool,
}

impl Default for DescriberSettings {
    fn default() -> Self {
        Self {
            show_events: true,
            max_deployments: 3,
            max_events: 8,
            verbose_history: false,
        }
    }
}

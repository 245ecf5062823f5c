pub mod deployment;
pub mod deployment_config;
pub mod selector;

pub use deployment::DeploymentPhase;
pub use deployment_config::DeploymentConfig;
pub use selector::LabelSelector;

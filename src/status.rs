use k8s_openapi::api::core::v1::ReplicationController;

use crate::error::Result;
use crate::models::deployment;
use crate::models::LabelSelector;
use crate::storage::ClusterReader;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PodPhaseCounts {
    pub running: usize,
    pub waiting: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Buckets the pods selected by the controller by phase. Query failures are
/// returned to the caller.
pub async fn pod_phase_counts<R>(reader: &R, controller: &ReplicationController) -> Result<PodPhaseCounts>
where
    R: ClusterReader + ?Sized,
{
    let mut counts = PodPhaseCounts::default();

    // An empty selector would match every pod in the namespace
    let selector = deployment::selector_for(controller);
    if selector.is_empty() {
        return Ok(counts);
    }

    let namespace = controller.metadata.namespace.as_deref().unwrap_or("default");
    let pods = reader
        .list_pods(namespace, &LabelSelector::from_map(&selector))
        .await?;

    for pod in &pods {
        match pod.status.as_ref().and_then(|status| status.phase.as_deref()) {
            Some("Running") => counts.running += 1,
            Some("Pending") => counts.waiting += 1,
            Some("Succeeded") => counts.succeeded += 1,
            Some("Failed") => counts.failed += 1,
            _ => {}
        }
    }
    Ok(counts)
}

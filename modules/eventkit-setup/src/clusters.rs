use anyhow::Result;
use eventkit_common::{sort_by_size, Cluster, Clustering};

use crate::traits::ClusterSource;

/// Clusters of one clustering, largest first.
#[derive(Debug, Clone)]
pub struct ClusterView {
    pub clustering: Clustering,
    pub clusters: Vec<Cluster>,
}

/// Load the clusters of `clustering_id`, or of the latest clustering when `None`.
/// Returns `None` when the project has no clustering yet, or the requested id is unknown.
pub async fn browse_clusters(
    source: &dyn ClusterSource,
    project_id: &str,
    clustering_id: Option<&str>,
) -> Result<Option<ClusterView>> {
    let clusterings = source.clusterings(project_id).await?;
    let clustering = match clustering_id {
        Some(id) => clusterings.into_iter().find(|c| c.id == id),
        None => clusterings.into_iter().next(),
    };
    let Some(clustering) = clustering else {
        tracing::info!(project_id, "No clustering to browse");
        return Ok(None);
    };

    let mut clusters = source.clusters(project_id, &clustering.id).await?;
    sort_by_size(&mut clusters);
    tracing::debug!(
        project_id,
        clustering = %clustering.display_name(),
        count = clusters.len(),
        "Loaded clusters"
    );

    Ok(Some(ClusterView {
        clustering,
        clusters,
    }))
}

// Collaborator boundaries for the setup flows.
//
// ProjectStore: load and persist a whole project (settings included).
// EventSink: bulk-add onboarding events.
// FeedbackSink: best-effort outcome signal for the onboarding task.
// ClusterSource: read-only clustering results.
//
// Production impls wrap the platform-client crate; tests use the doubles in
// `testing.rs`.

use anyhow::Result;
use async_trait::async_trait;

use eventkit_common::{Cluster, Clustering, EventDefinition, Project};
use platform_client::{FeedbackClient, PlatformClient, UserFeedback};

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn get_project(&self, project_id: &str) -> Result<Project>;

    /// Persist the whole project. Last write wins.
    async fn save_project(&self, project: &Project) -> Result<()>;
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn add_events(&self, project_id: &str, events: &[EventDefinition]) -> Result<()>;
}

#[async_trait]
pub trait FeedbackSink: Send + Sync {
    async fn send_feedback(&self, feedback: &UserFeedback) -> Result<()>;
}

#[async_trait]
pub trait ClusterSource: Send + Sync {
    /// Clusterings of a project, latest first.
    async fn clusterings(&self, project_id: &str) -> Result<Vec<Clustering>>;

    async fn clusters(&self, project_id: &str, clustering_id: &str) -> Result<Vec<Cluster>>;
}

// ---------------------------------------------------------------------------
// Platform-backed impls
// ---------------------------------------------------------------------------

#[async_trait]
impl ProjectStore for PlatformClient {
    async fn get_project(&self, project_id: &str) -> Result<Project> {
        Ok(PlatformClient::get_project(self, project_id).await?)
    }

    async fn save_project(&self, project: &Project) -> Result<()> {
        Ok(PlatformClient::save_project(self, project).await?)
    }
}

#[async_trait]
impl EventSink for PlatformClient {
    async fn add_events(&self, project_id: &str, events: &[EventDefinition]) -> Result<()> {
        Ok(PlatformClient::add_events(self, project_id, events).await?)
    }
}

#[async_trait]
impl ClusterSource for PlatformClient {
    async fn clusterings(&self, project_id: &str) -> Result<Vec<Clustering>> {
        Ok(self.list_clusterings(project_id).await?)
    }

    async fn clusters(&self, project_id: &str, clustering_id: &str) -> Result<Vec<Cluster>> {
        Ok(self.list_clusters(project_id, clustering_id).await?)
    }
}

#[async_trait]
impl FeedbackSink for FeedbackClient {
    async fn send_feedback(&self, feedback: &UserFeedback) -> Result<()> {
        Ok(FeedbackClient::send_feedback(self, feedback).await?)
    }
}

/// Feedback sink used when no telemetry key is configured.
pub struct NoopFeedback;

#[async_trait]
impl FeedbackSink for NoopFeedback {
    async fn send_feedback(&self, feedback: &UserFeedback) -> Result<()> {
        tracing::debug!(task_id = %feedback.task_id, "Telemetry disabled, dropping feedback");
        Ok(())
    }
}

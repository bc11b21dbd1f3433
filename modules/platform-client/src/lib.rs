pub mod error;
pub mod types;

pub use error::{PlatformError, Result};
pub use types::{
    AddEventsRequest, ClustersRequest, FeedbackFlag, FeedbackSource, UserFeedback,
    CLUSTERS_PAGE_LIMIT,
};

use eventkit_common::{
    Cluster, Clustering, Clusterings, Clusters, EventDefinition, Project, ProjectResponse,
};
use reqwest::Response;
use serde::de::DeserializeOwned;

/// Client for the platform's project and explore routes. Every call carries the
/// caller's bearer token.
pub struct PlatformClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl PlatformClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /api/projects/{id}`
    pub async fn get_project(&self, project_id: &str) -> Result<Project> {
        let url = self.url(&format!("/api/projects/{project_id}"));
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let body: ProjectResponse = read_json(resp).await?;
        Ok(body.project)
    }

    /// `POST /api/projects/{id}` with the whole project. Last write wins.
    pub async fn save_project(&self, project: &Project) -> Result<()> {
        let url = self.url(&format!("/api/projects/{}", project.id));
        tracing::debug!(project_id = %project.id, "Saving project settings");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(project)
            .send()
            .await?;

        ensure_success(resp).await?;
        Ok(())
    }

    /// `POST /api/projects/{id}/add-events`
    pub async fn add_events(&self, project_id: &str, events: &[EventDefinition]) -> Result<()> {
        let url = self.url(&format!("/api/projects/{project_id}/add-events"));
        tracing::info!(project_id, count = events.len(), "Adding events to project");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&AddEventsRequest { events })
            .send()
            .await?;

        ensure_success(resp).await?;
        Ok(())
    }

    /// `POST /api/explore/{id}/clusterings`, latest first.
    pub async fn list_clusterings(&self, project_id: &str) -> Result<Vec<Clustering>> {
        let url = self.url(&format!("/api/explore/{project_id}/clusterings"));
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let body: Clusterings = read_json(resp).await?;
        tracing::debug!(project_id, count = body.clusterings.len(), "Fetched clusterings");
        Ok(body.clusterings)
    }

    /// `POST /api/explore/{id}/clusters` for one clustering.
    pub async fn list_clusters(&self, project_id: &str, clustering_id: &str) -> Result<Vec<Cluster>> {
        let url = self.url(&format!("/api/explore/{project_id}/clusters"));
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&ClustersRequest {
                clustering_id,
                limit: CLUSTERS_PAGE_LIMIT,
            })
            .send()
            .await?;

        let body: Clusters = read_json(resp).await?;
        tracing::debug!(project_id, clustering_id, count = body.clusters.len(), "Fetched clusters");
        Ok(body.clusters)
    }
}

/// Client for the telemetry service that receives onboarding feedback.
pub struct FeedbackClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FeedbackClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn flag_url(&self, task_id: &str) -> String {
        format!("{}/tasks/{}/flag", self.base_url, task_id)
    }

    /// `POST {base}/tasks/{task_id}/flag`
    pub async fn send_feedback(&self, feedback: &UserFeedback) -> Result<()> {
        let url = self.flag_url(&feedback.task_id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(feedback)
            .send()
            .await?;

        ensure_success(resp).await?;
        Ok(())
    }
}

async fn ensure_success(resp: Response) -> Result<Response> {
    let status = resp.status();
    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        return Err(PlatformError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(resp)
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let resp = ensure_success(resp).await?;
    let text = resp.text().await?;
    Ok(serde_json::from_str(&text)?)
}

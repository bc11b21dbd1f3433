// Test doubles for the setup flows.
//
// One per trait boundary:
// - MemoryProjectStore (ProjectStore): HashMap of projects, records saves
// - RecordingEventSink (EventSink): records add-events calls
// - RecordingFeedbackSink (FeedbackSink): records feedback signals
// - MemoryClusterSource (ClusterSource): fixed clusterings and clusters
//
// Each can be switched to failing mode with `.failing()` / `.failing_saves()`.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::Map;

use eventkit_common::{Cluster, Clustering, EventDefinition, Project, ProjectSettings};
use platform_client::UserFeedback;

use crate::traits::{ClusterSource, EventSink, FeedbackSink, ProjectStore};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A project owned by org `o1` holding one event per name.
pub fn test_project(project_id: &str, event_names: &[&str]) -> Project {
    let mut settings = ProjectSettings::default();
    for name in event_names {
        settings.insert_event(EventDefinition::new(
            project_id,
            "o1",
            *name,
            format!("Description of {name}"),
        ));
    }
    Project {
        id: project_id.to_string(),
        org_id: "o1".to_string(),
        project_name: Some("Test project".to_string()),
        settings: Some(settings),
        extra: Map::new(),
    }
}

pub fn test_clustering(id: &str, created_at: i64) -> Clustering {
    Clustering {
        id: id.to_string(),
        name: None,
        created_at,
        nb_clusters: None,
        status: Some("completed".to_string()),
        extra: Map::new(),
    }
}

pub fn test_cluster(clustering_id: &str, id: &str, size: u64) -> Cluster {
    Cluster {
        id: id.to_string(),
        clustering_id: clustering_id.to_string(),
        name: format!("Cluster {id}"),
        description: format!("Users asking about topic {id}."),
        size,
        extra: Map::new(),
    }
}

// ---------------------------------------------------------------------------
// MemoryProjectStore
// ---------------------------------------------------------------------------

pub struct MemoryProjectStore {
    projects: Mutex<HashMap<String, Project>>,
    saves: Mutex<Vec<Project>>,
    fail_saves: bool,
}

impl MemoryProjectStore {
    pub fn new() -> Self {
        Self {
            projects: Mutex::new(HashMap::new()),
            saves: Mutex::new(Vec::new()),
            fail_saves: false,
        }
    }

    pub fn with_project(self, project: Project) -> Self {
        self.projects
            .lock()
            .unwrap()
            .insert(project.id.clone(), project);
        self
    }

    pub fn failing_saves(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    /// Number of save attempts, failed ones included.
    pub fn save_count(&self) -> usize {
        self.saves.lock().unwrap().len()
    }

    /// Currently stored value of a project.
    pub fn saved(&self, project_id: &str) -> Option<Project> {
        self.projects.lock().unwrap().get(project_id).cloned()
    }
}

impl Default for MemoryProjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn get_project(&self, project_id: &str) -> Result<Project> {
        self.projects
            .lock()
            .unwrap()
            .get(project_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("MemoryProjectStore: no project {project_id}"))
    }

    async fn save_project(&self, project: &Project) -> Result<()> {
        self.saves.lock().unwrap().push(project.clone());
        if self.fail_saves {
            bail!("MemoryProjectStore: save rejected");
        }
        self.projects
            .lock()
            .unwrap()
            .insert(project.id.clone(), project.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RecordingEventSink
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingEventSink {
    calls: Mutex<Vec<(String, Vec<EventDefinition>)>>,
    fail: bool,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn calls(&self) -> Vec<(String, Vec<EventDefinition>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSink for RecordingEventSink {
    async fn add_events(&self, project_id: &str, events: &[EventDefinition]) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((project_id.to_string(), events.to_vec()));
        if self.fail {
            bail!("RecordingEventSink: add-events rejected");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RecordingFeedbackSink
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingFeedbackSink {
    sent: Mutex<Vec<UserFeedback>>,
    fail: bool,
}

impl RecordingFeedbackSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn sent(&self) -> Vec<UserFeedback> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedbackSink for RecordingFeedbackSink {
    async fn send_feedback(&self, feedback: &UserFeedback) -> Result<()> {
        if self.fail {
            bail!("RecordingFeedbackSink: telemetry unavailable");
        }
        self.sent.lock().unwrap().push(feedback.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryClusterSource
// ---------------------------------------------------------------------------

/// Clusterings are returned in insertion order, so insert the latest first.
#[derive(Default)]
pub struct MemoryClusterSource {
    clusterings: Vec<Clustering>,
    clusters: HashMap<String, Vec<Cluster>>,
}

impl MemoryClusterSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clustering(mut self, clustering: Clustering, clusters: Vec<Cluster>) -> Self {
        self.clusters.insert(clustering.id.clone(), clusters);
        self.clusterings.push(clustering);
        self
    }
}

#[async_trait]
impl ClusterSource for MemoryClusterSource {
    async fn clusterings(&self, _project_id: &str) -> Result<Vec<Clustering>> {
        Ok(self.clusterings.clone())
    }

    async fn clusters(&self, _project_id: &str, clustering_id: &str) -> Result<Vec<Cluster>> {
        self.clusters
            .get(clustering_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("MemoryClusterSource: no clustering {clustering_id}"))
    }
}

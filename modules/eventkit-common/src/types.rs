use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// --- Detection settings ---

/// Mechanism used to evaluate an event definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionEngine {
    #[default]
    LlmDetection,
    KeywordDetection,
    RegexDetection,
}

/// Which part of a task or session a detector looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionScope {
    #[default]
    Task,
    Session,
    TaskInputOnly,
    TaskOutputOnly,
}

/// Output shape of an LLM detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreType {
    /// Yes/No, scored 0-1
    #[default]
    Confidence,
    /// 1-5 score
    Range,
    /// One of 1-9 labels
    Category,
}

/// Scoring shape of an `llm_detection` event. `min` and `max` are derived from
/// `score_type` (and the category count); see [`crate::score`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRangeSettings {
    pub score_type: ScoreType,
    pub min: i64,
    pub max: i64,
    #[serde(default)]
    pub categories: Vec<String>,
}

// --- Event definitions ---

/// A named detection rule attached to a project.
///
/// Only one of `keywords`, `regex_pattern` and `score_range_settings` is meaningful,
/// selected by `detection_engine`. The others may be present and are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub project_id: String,
    pub org_id: String,
    pub event_name: String,
    pub description: String,
    #[serde(default)]
    pub detection_engine: DetectionEngine,
    #[serde(default)]
    pub detection_scope: DetectionScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_range_settings: Option<ScoreRangeSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook: Option<String>,
    #[serde(default)]
    pub webhook_headers: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub is_last_task: bool,
    /// Detection job backing this event. Cleared whenever the form emits a definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    /// Server-side fields this crate does not model, kept for round-trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventDefinition {
    /// Bare definition with engine/scope defaults and no scoring.
    pub fn new(
        project_id: impl Into<String>,
        org_id: impl Into<String>,
        event_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            project_id: project_id.into(),
            org_id: org_id.into(),
            event_name: event_name.into(),
            description: description.into(),
            detection_engine: DetectionEngine::default(),
            detection_scope: DetectionScope::default(),
            keywords: None,
            regex_pattern: None,
            score_range_settings: None,
            webhook: None,
            webhook_headers: None,
            is_last_task: false,
            job_id: None,
            extra: Map::new(),
        }
    }

    pub fn with_scope(mut self, scope: DetectionScope) -> Self {
        self.detection_scope = scope;
        self
    }

    pub fn with_engine(mut self, engine: DetectionEngine) -> Self {
        self.detection_engine = engine;
        self
    }

    pub fn with_score(mut self, settings: ScoreRangeSettings) -> Self {
        self.score_range_settings = Some(settings);
        self
    }

    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = Some(keywords.into());
        self
    }

    pub fn with_regex(mut self, pattern: impl Into<String>) -> Self {
        self.regex_pattern = Some(pattern.into());
        self
    }

    pub fn last_task_only(mut self) -> Self {
        self.is_last_task = true;
        self
    }

    /// The `Authorization` entry of `webhook_headers`, if any.
    pub fn webhook_authorization(&self) -> Option<&str> {
        self.webhook_headers
            .as_ref()
            .and_then(|h| h.get("Authorization"))
            .map(String::as_str)
    }
}

// --- Projects ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectSettings {
    #[serde(default)]
    pub events: BTreeMap<String, EventDefinition>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectSettings {
    /// Remove an event by name, returning it if it was present.
    pub fn remove_event(&mut self, event_name: &str) -> Option<EventDefinition> {
        self.events.remove(event_name)
    }

    /// Insert an event under its own name. Returns the definition it replaced,
    /// so that a name collision is visible to the caller.
    pub fn insert_event(&mut self, definition: EventDefinition) -> Option<EventDefinition> {
        self.events.insert(definition.event_name.clone(), definition)
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub org_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default)]
    pub settings: Option<ProjectSettings>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Wrapper returned by `GET /api/projects/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectResponse {
    pub project: Project,
}

// --- Organizations ---

/// Billing plan of an organization. Anything that isn't `pro` gets the base quota.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OrgPlan {
    Pro,
    #[default]
    Hobby,
    Other(String),
}

impl OrgPlan {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "pro" => Self::Pro,
            "hobby" | "" => Self::Hobby,
            other => Self::Other(other.to_string()),
        }
    }
}

// --- Clustering (read-only, computed by the platform) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clustering {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Unix timestamp in seconds.
    pub created_at: i64,
    #[serde(default)]
    pub nb_clusters: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Clustering {
    /// The clustering's name, or its creation time when unnamed.
    pub fn display_name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => DateTime::<Utc>::from_timestamp(self.created_at, 0)
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| self.created_at.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: String,
    pub clustering_id: String,
    pub name: String,
    pub description: String,
    pub size: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Clusters smaller than this are not worth breaking down further.
pub const BREAK_DOWN_MIN_SIZE: u64 = 5;

impl Cluster {
    pub fn can_break_down(&self) -> bool {
        self.size > BREAK_DOWN_MIN_SIZE
    }

    /// Seed a tagger from this cluster: its name and description with a yes/no score.
    pub fn to_event_seed(&self, project_id: &str, org_id: &str) -> EventDefinition {
        EventDefinition::new(project_id, org_id, &self.name, &self.description)
            .with_score(ScoreRangeSettings::confidence())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Clusterings {
    #[serde(default)]
    pub clusterings: Vec<Clustering>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Clusters {
    #[serde(default)]
    pub clusters: Vec<Cluster>,
}

/// Sort clusters largest first.
pub fn sort_by_size(clusters: &mut [Cluster]) {
    clusters.sort_by(|a, b| b.size.cmp(&a.size));
}

use eventkit_common::EventDefinition;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/projects/{id}/add-events`.
#[derive(Debug, Clone, Serialize)]
pub struct AddEventsRequest<'a> {
    pub events: &'a [EventDefinition],
}

/// Body of `POST /api/explore/{id}/clusters`.
#[derive(Debug, Clone, Serialize)]
pub struct ClustersRequest<'a> {
    pub clustering_id: &'a str,
    pub limit: u32,
}

/// Number of clusters requested when browsing a clustering.
pub const CLUSTERS_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackFlag {
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackSource {
    User,
}

/// Outcome signal sent to the telemetry service about an onboarding task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFeedback {
    pub task_id: String,
    pub project_id: String,
    pub flag: FeedbackFlag,
    pub source: FeedbackSource,
    pub notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn feedback_uses_camel_case_wire_names() {
        let feedback = UserFeedback {
            task_id: "t1".into(),
            project_id: "p1".into(),
            flag: FeedbackFlag::Success,
            source: FeedbackSource::User,
            notes: "Selected 1 events: A".into(),
        };
        assert_eq!(
            serde_json::to_value(&feedback).unwrap(),
            json!({
                "taskId": "t1",
                "projectId": "p1",
                "flag": "success",
                "source": "user",
                "notes": "Selected 1 events: A"
            })
        );
    }

    #[test]
    fn add_events_wraps_definitions() {
        let events = vec![EventDefinition::new("p", "o", "A", "An event description")];
        let body = serde_json::to_value(AddEventsRequest { events: &events }).unwrap();
        assert_eq!(body["events"][0]["event_name"], json!("A"));
        assert_eq!(body["events"][0]["detection_scope"], json!("task"));
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use eventkit_common::{check_definition, expand_template, EventDefinition, OnboardingTemplate};
use platform_client::{FeedbackFlag, FeedbackSource, UserFeedback};
use tokio::task::JoinHandle;

use crate::error::SetupError;
use crate::traits::{EventSink, FeedbackSink};

pub const DEFAULT_REDIRECT: &str = "/onboarding/plan";

/// Onboarding step where the user picks a template and unticks the events they
/// don't want.
pub struct OnboardingFlow {
    project_id: String,
    org_id: String,
    task_id: Option<String>,
    telemetry_project_id: String,
    redirect_to: String,
    template: Option<OnboardingTemplate>,
    candidates: Vec<EventDefinition>,
    selected: HashMap<String, bool>,
}

/// Result of confirming the selection. Navigation happens whatever the save outcome.
#[derive(Debug)]
pub struct OnboardingOutcome {
    pub redirect_to: String,
    pub saved_count: usize,
    pub save_error: Option<String>,
    /// Pending feedback emission, if one was started. Never needs to be awaited.
    pub feedback: Option<JoinHandle<()>>,
}

impl OnboardingOutcome {
    /// User-facing notification text.
    pub fn notice(&self) -> String {
        match &self.save_error {
            None => "Your config has been saved! Change the config in Analytics.".to_string(),
            Some(e) => format!("Error when saving events: {e}"),
        }
    }
}

impl OnboardingFlow {
    pub fn new(
        project_id: impl Into<String>,
        org_id: impl Into<String>,
        task_id: Option<String>,
        telemetry_project_id: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            org_id: org_id.into(),
            task_id,
            telemetry_project_id: telemetry_project_id.into(),
            redirect_to: DEFAULT_REDIRECT.to_string(),
            template: None,
            candidates: Vec::new(),
            selected: HashMap::new(),
        }
    }

    pub fn redirect_to(mut self, path: impl Into<String>) -> Self {
        self.redirect_to = path.into();
        self
    }

    /// Replace the candidates with a template's events, all selected.
    pub fn select_template(&mut self, name: &str) {
        let template = OnboardingTemplate::from_name(name);
        self.template = Some(template);
        self.set_candidates(expand_template(name, &self.project_id, &self.org_id));
        tracing::debug!(template = template.name(), "Onboarding template selected");
    }

    /// Replace the candidate list. Every candidate starts selected.
    pub fn set_candidates(&mut self, candidates: Vec<EventDefinition>) {
        self.selected = candidates
            .iter()
            .map(|c| (c.event_name.clone(), true))
            .collect();
        self.candidates = candidates;
    }

    pub fn template(&self) -> Option<OnboardingTemplate> {
        self.template
    }

    pub fn candidates(&self) -> &[EventDefinition] {
        &self.candidates
    }

    pub fn is_selected(&self, event_name: &str) -> bool {
        self.selected.get(event_name).copied().unwrap_or(false)
    }

    pub fn toggle(&mut self, event_name: &str) {
        let flag = self.selected.entry(event_name.to_string()).or_insert(false);
        *flag = !*flag;
    }

    /// Selected candidates, in candidate order.
    pub fn collect_selected(&self) -> Vec<EventDefinition> {
        self.candidates
            .iter()
            .filter(|c| self.is_selected(&c.event_name))
            .cloned()
            .collect()
    }

    /// Confirming needs a candidate list to pick from.
    pub fn can_confirm(&self) -> bool {
        !self.candidates.is_empty()
    }

    pub fn skip(&self) -> String {
        self.redirect_to.clone()
    }

    /// Send the selected events, then fire the feedback signal in the background.
    ///
    /// Fails with [`SetupError::NothingToConfirm`] until a candidate list exists.
    /// Selected events that break the form constraints are rejected up front with no
    /// network call. After that, a failed save is reported in the outcome and does
    /// not stop navigation.
    pub async fn confirm(
        &self,
        events: &dyn EventSink,
        feedback: Arc<dyn FeedbackSink>,
    ) -> Result<OnboardingOutcome, SetupError> {
        if !self.can_confirm() {
            return Err(SetupError::NothingToConfirm);
        }

        let selected = self.collect_selected();
        let errors: Vec<_> = selected
            .iter()
            .filter_map(|d| check_definition(d).err())
            .flatten()
            .collect();
        if !errors.is_empty() {
            return Err(SetupError::Validation(errors));
        }

        let save_error = match events.add_events(&self.project_id, &selected).await {
            Ok(()) => {
                tracing::info!(project_id = %self.project_id, count = selected.len(), "Onboarding events saved");
                None
            }
            Err(e) => {
                tracing::error!(project_id = %self.project_id, error = %e, "Failed to save onboarding events");
                Some(e.to_string())
            }
        };

        let feedback = self.emit_feedback(&selected, feedback);

        Ok(OnboardingOutcome {
            redirect_to: self.redirect_to.clone(),
            saved_count: if save_error.is_none() { selected.len() } else { 0 },
            save_error,
            feedback,
        })
    }

    fn emit_feedback(
        &self,
        selected: &[EventDefinition],
        sink: Arc<dyn FeedbackSink>,
    ) -> Option<JoinHandle<()>> {
        let Some(task_id) = self.task_id.clone() else {
            tracing::error!("Onboarding task id is missing, skipping feedback");
            return None;
        };

        let feedback = selection_feedback(task_id, &self.telemetry_project_id, selected);
        Some(tokio::spawn(async move {
            if let Err(e) = sink.send_feedback(&feedback).await {
                tracing::warn!(task_id = %feedback.task_id, error = %e, "Error sending onboarding feedback");
            }
        }))
    }
}

/// Feedback describing an onboarding selection: success when at least one event was kept.
pub fn selection_feedback(
    task_id: String,
    telemetry_project_id: &str,
    selected: &[EventDefinition],
) -> UserFeedback {
    let names: Vec<&str> = selected.iter().map(|d| d.event_name.as_str()).collect();
    UserFeedback {
        task_id,
        project_id: telemetry_project_id.to_string(),
        flag: if selected.is_empty() {
            FeedbackFlag::Failure
        } else {
            FeedbackFlag::Success
        },
        source: FeedbackSource::User,
        notes: format!("Selected {} events: {}", selected.len(), names.join(", ")),
    }
}

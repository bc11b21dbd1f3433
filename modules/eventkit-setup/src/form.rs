//! Event form controller.
//!
//! Holds the raw form values for creating or editing one event definition,
//! hydrates them from templates, re-derives score settings, validates, and turns
//! a submission into the next project value. Persisting that value is the job of
//! [`crate::session::ProjectSession`].

use eventkit_common::quota::{can_add_event, event_quota};
use eventkit_common::{
    validate, CategoriesInput, DetectionEngine, EventDefinition, EventFormValues, FieldError,
    FormField, OrgPlan, Project, ScoreRangeInput, ScoreRangeSettings, ScoreType,
};

use crate::error::SetupError;

pub struct EventFormController {
    values: EventFormValues,
    errors: Vec<FieldError>,
    editing: Option<EventDefinition>,
}

/// Result of planning a submission: the definition and the project it produces.
#[derive(Debug, Clone)]
pub struct SubmitPlan {
    pub definition: EventDefinition,
    pub next: Project,
    /// Old name removed from the events mapping when the edit renamed the event.
    pub renamed_from: Option<String>,
    /// Existing definition overwritten under the new name.
    pub overwritten: Option<EventDefinition>,
}

impl EventFormController {
    /// Blank form. `default_score_type` picks the initial output type; confidence otherwise.
    pub fn create(default_score_type: Option<ScoreType>) -> Self {
        let initial = ScoreRangeSettings::initial(default_score_type.unwrap_or_default());
        Self {
            values: EventFormValues {
                score_range_settings: Some(ScoreRangeInput::from(&initial)),
                ..Default::default()
            },
            errors: Vec::new(),
            editing: None,
        }
    }

    /// Form prefilled from an existing definition.
    pub fn edit(existing: EventDefinition) -> Self {
        let mut values = EventFormValues::from_definition(&existing);
        if values.score_range_settings.is_none() {
            values.score_range_settings =
                Some(ScoreRangeInput::from(&ScoreRangeSettings::confidence()));
        }
        Self {
            values,
            errors: Vec::new(),
            editing: Some(existing),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn editing(&self) -> Option<&EventDefinition> {
        self.editing.as_ref()
    }

    pub fn values(&self) -> &EventFormValues {
        &self.values
    }

    /// Direct access for plain field edits (name, description, webhook...).
    pub fn values_mut(&mut self) -> &mut EventFormValues {
        &mut self.values
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn errors_for(&self, field: FormField) -> impl Iterator<Item = &FieldError> {
        self.errors.iter().filter(move |e| e.field == field)
    }

    /// Overwrite the form with a template. Not a merge: every template-owned field is
    /// replaced, the engine is reset to LLM detection, and missing score settings
    /// become confidence 0-1. Webhook fields are left alone.
    pub fn load_template(&mut self, template: &EventDefinition) {
        let score = template
            .score_range_settings
            .as_ref()
            .map(ScoreRangeInput::from)
            .unwrap_or_else(|| ScoreRangeInput::from(&ScoreRangeSettings::confidence()));

        self.values.event_name = template.event_name.clone();
        self.values.description = template.description.clone();
        self.values.detection_scope = template.detection_scope;
        self.values.keywords = template.keywords.clone();
        self.values.regex_pattern = template.regex_pattern.clone();
        self.values.detection_engine = DetectionEngine::LlmDetection;
        self.values.is_last_task = template.is_last_task;
        self.values.score_range_settings = Some(score);
        self.errors.clear();

        tracing::debug!(event_name = %template.event_name, "Loaded event template");
    }

    /// Change the output type. Categories typed so far are kept only when switching
    /// to `Category`.
    pub fn set_score_type(&mut self, score_type: ScoreType) {
        let previous = self.values.score_range_settings.take().unwrap_or_default();
        let categories = match score_type {
            ScoreType::Category => previous.categories,
            ScoreType::Confidence | ScoreType::Range => CategoriesInput::default(),
        };
        self.values.score_range_settings = Some(ScoreRangeInput {
            score_type,
            categories,
        });
    }

    pub fn set_categories(&mut self, categories: impl Into<CategoriesInput>) {
        let score = self
            .values
            .score_range_settings
            .get_or_insert_with(ScoreRangeInput::default);
        score.categories = categories.into();
    }

    /// Settings the current input would produce, for display next to the form.
    pub fn derived_score(&self) -> Option<Result<ScoreRangeSettings, eventkit_common::EventKitError>> {
        self.values
            .score_range_settings
            .as_ref()
            .map(|s| ScoreRangeSettings::derive(s.score_type, &s.categories))
    }

    /// Validate the current values, recording errors for display.
    pub fn validate(&mut self, project_id: &str, org_id: &str) -> Result<EventDefinition, Vec<FieldError>> {
        match validate(&self.values, project_id, org_id) {
            Ok(definition) => {
                self.errors.clear();
                Ok(definition)
            }
            Err(errors) => {
                tracing::debug!(count = errors.len(), "Event form has validation errors");
                self.errors = errors.clone();
                Err(errors)
            }
        }
    }

    /// Compute the project that results from submitting the form, leaving `project`
    /// untouched.
    ///
    /// A renamed edit removes the old entry first, then inserts under the new name.
    /// If the new name already belongs to another event, that event is overwritten
    /// and returned in [`SubmitPlan::overwritten`].
    pub fn plan_submit(&mut self, project: &Project, plan: &OrgPlan) -> Result<SubmitPlan, SetupError> {
        let definition = self
            .validate(&project.id, &project.org_id)
            .map_err(SetupError::Validation)?;

        let mut next = project.clone();
        let settings = next
            .settings
            .as_mut()
            .ok_or_else(|| SetupError::NoProjectSettings(project.id.clone()))?;

        if self.editing.is_none() && !can_add_event(plan, settings.event_count()) {
            return Err(SetupError::QuotaReached {
                limit: event_quota(plan),
            });
        }

        let renamed_from = match &self.editing {
            Some(existing) if existing.event_name != definition.event_name => {
                settings.remove_event(&existing.event_name);
                Some(existing.event_name.clone())
            }
            _ => None,
        };

        let overwritten = settings.insert_event(definition.clone());
        if renamed_from.is_some() && overwritten.is_some() {
            tracing::warn!(
                event_name = %definition.event_name,
                "Renamed event overwrote an existing event with the same name"
            );
        }

        Ok(SubmitPlan {
            definition,
            next,
            renamed_from,
            overwritten,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventkit_common::templates::ALL_CATEGORIES;
    use eventkit_common::{starter_templates, DetectionScope, ProjectSettings};
    use serde_json::Map;

    fn project_with(names: &[&str]) -> Project {
        let mut settings = ProjectSettings::default();
        for name in names {
            settings.insert_event(EventDefinition::new(
                "p1",
                "o1",
                *name,
                format!("Description of {name}"),
            ));
        }
        Project {
            id: "p1".into(),
            org_id: "o1".into(),
            project_name: None,
            settings: Some(settings),
            extra: Map::new(),
        }
    }

    fn fill(form: &mut EventFormController, name: &str) {
        form.values_mut().event_name = name.into();
        form.values_mut().description = "The user is frustrated with the assistant.".into();
    }

    #[test]
    fn create_uses_default_score_type() {
        let form = EventFormController::create(None);
        assert!(!form.is_editing());
        assert_eq!(
            form.derived_score().unwrap().unwrap(),
            ScoreRangeSettings::confidence()
        );

        let form = EventFormController::create(Some(ScoreType::Range));
        assert_eq!(form.derived_score().unwrap().unwrap(), ScoreRangeSettings::range());

        // no labels yet, so the derivation fails until some are entered
        let form = EventFormController::create(Some(ScoreType::Category));
        assert!(form.derived_score().unwrap().is_err());
    }

    #[test]
    fn load_template_overwrites_instead_of_merging() {
        let mut form = EventFormController::create(None);
        fill(&mut form, "Something else");
        form.values_mut().detection_engine = DetectionEngine::RegexDetection;
        form.values_mut().regex_pattern = Some("abc".into());
        form.values_mut().webhook = Some("https://hooks.example.com".into());

        let template = EventDefinition::new("p", "o", "Toxic content", "The assistant is toxic.")
            .with_scope(DetectionScope::TaskOutputOnly)
            .with_engine(DetectionEngine::KeywordDetection)
            .with_keywords("damn");
        form.load_template(&template);

        let values = form.values();
        assert_eq!(values.event_name, "Toxic content");
        assert_eq!(values.detection_scope, DetectionScope::TaskOutputOnly);
        assert_eq!(values.detection_engine, DetectionEngine::LlmDetection);
        assert_eq!(values.keywords.as_deref(), Some("damn"));
        assert!(values.regex_pattern.is_none());
        assert_eq!(values.webhook.as_deref(), Some("https://hooks.example.com"));
        assert_eq!(
            form.derived_score().unwrap().unwrap(),
            ScoreRangeSettings::confidence()
        );
    }

    #[test]
    fn load_template_keeps_template_score() {
        let mut form = EventFormController::create(None);
        let template = EventDefinition::new("p", "o", "Positive", "A warm and positive answer.")
            .with_score(ScoreRangeSettings::range());
        form.load_template(&template);
        assert_eq!(form.derived_score().unwrap().unwrap(), ScoreRangeSettings::range());
    }

    fn starter(name: &str) -> EventDefinition {
        starter_templates(ALL_CATEGORIES, "p", "o")
            .into_iter()
            .find(|d| d.event_name == name)
            .unwrap()
    }

    #[test]
    fn load_template_sets_last_task_flag_both_ways() {
        let mut form = EventFormController::create(None);
        assert!(!form.values().is_last_task);

        form.load_template(&starter("Unresolved conversation"));
        assert!(form.values().is_last_task);

        form.load_template(&starter("Sounds robotic"));
        assert!(!form.values().is_last_task);
    }

    #[test]
    fn load_template_carries_category_labels() {
        let mut form = EventFormController::create(None);
        form.load_template(&starter("User mood"));

        let score = form.derived_score().unwrap().unwrap();
        assert_eq!(score.score_type, ScoreType::Category);
        assert_eq!(score.categories, vec!["happy", "neutral", "frustrated"]);
        assert_eq!((score.min, score.max), (1, 3));
    }

    #[test]
    fn switching_score_type_drops_stale_categories() {
        let mut form = EventFormController::create(Some(ScoreType::Category));
        form.set_categories("happy, sad");
        assert_eq!(form.derived_score().unwrap().unwrap().max, 2);

        form.set_score_type(ScoreType::Range);
        assert_eq!(form.derived_score().unwrap().unwrap(), ScoreRangeSettings::range());

        // categories are gone, so going back to category needs new labels
        form.set_score_type(ScoreType::Category);
        assert!(form.derived_score().unwrap().is_err());
    }

    #[test]
    fn moving_into_category_keeps_entered_labels() {
        let mut form = EventFormController::create(Some(ScoreType::Confidence));
        form.set_categories("a,b,c");
        form.set_score_type(ScoreType::Category);
        let settings = form.derived_score().unwrap().unwrap();
        assert_eq!(settings.categories, vec!["a", "b", "c"]);
    }

    #[test]
    fn validation_errors_are_recorded_per_field() {
        let mut form = EventFormController::create(None);
        form.values_mut().event_name = "Ok name".into();
        form.values_mut().description = "short".into();

        assert!(form.validate("p", "o").is_err());
        assert_eq!(form.errors_for(FormField::Description).count(), 1);
        assert_eq!(form.errors_for(FormField::EventName).count(), 0);

        form.values_mut().description = "Long enough description".into();
        assert!(form.validate("p", "o").is_ok());
        assert!(form.errors().is_empty());
    }

    #[test]
    fn plan_submit_inserts_new_event_without_touching_input() {
        let project = project_with(&["Alpha"]);
        let mut form = EventFormController::create(None);
        fill(&mut form, "Frustration");

        let plan = form.plan_submit(&project, &OrgPlan::Hobby).unwrap();
        assert!(plan.next.settings.as_ref().unwrap().events.contains_key("Frustration"));
        assert!(!project.settings.as_ref().unwrap().events.contains_key("Frustration"));
        assert!(plan.renamed_from.is_none());
        assert!(plan.overwritten.is_none());
    }

    #[test]
    fn rename_removes_old_key_and_inserts_new_one() {
        let project = project_with(&["Alpha", "Gamma"]);
        let existing = project.settings.as_ref().unwrap().events["Alpha"].clone();
        let mut form = EventFormController::edit(existing);
        fill(&mut form, "Beta");

        let plan = form.plan_submit(&project, &OrgPlan::Hobby).unwrap();
        let events = &plan.next.settings.as_ref().unwrap().events;
        assert!(!events.contains_key("Alpha"));
        assert!(events.contains_key("Beta"));
        assert!(events.contains_key("Gamma"));
        assert_eq!(plan.renamed_from.as_deref(), Some("Alpha"));
    }

    #[test]
    fn rename_onto_existing_name_overwrites_it() {
        let project = project_with(&["Alpha", "Beta"]);
        let existing = project.settings.as_ref().unwrap().events["Alpha"].clone();
        let mut form = EventFormController::edit(existing);
        fill(&mut form, "Beta");

        let plan = form.plan_submit(&project, &OrgPlan::Hobby).unwrap();
        let events = &plan.next.settings.as_ref().unwrap().events;
        assert_eq!(events.len(), 1);
        assert_eq!(
            events["Beta"].description,
            "The user is frustrated with the assistant."
        );
        assert_eq!(plan.overwritten.unwrap().description, "Description of Beta");
    }

    #[test]
    fn submitted_definition_drops_job_identity() {
        let project = project_with(&["Alpha"]);
        let mut existing = project.settings.as_ref().unwrap().events["Alpha"].clone();
        existing.job_id = Some("job-1".into());
        existing.id = Some("evt-1".into());

        let mut form = EventFormController::edit(existing);
        fill(&mut form, "Alpha");
        let plan = form.plan_submit(&project, &OrgPlan::Hobby).unwrap();
        assert!(plan.definition.job_id.is_none());
        assert!(plan.definition.id.is_none());
        assert!(plan.renamed_from.is_none());
    }

    #[test]
    fn quota_blocks_new_events_but_not_edits() {
        let names: Vec<String> = (0..10).map(|i| format!("Event {i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let project = project_with(&refs);

        let mut form = EventFormController::create(None);
        fill(&mut form, "One too many");
        let err = form.plan_submit(&project, &OrgPlan::Hobby).unwrap_err();
        assert!(matches!(err, SetupError::QuotaReached { limit: 10 }));
        assert!(form.plan_submit(&project, &OrgPlan::Pro).is_ok());

        let existing = project.settings.as_ref().unwrap().events["Event 0"].clone();
        let mut edit = EventFormController::edit(existing);
        fill(&mut edit, "Event 0");
        assert!(edit.plan_submit(&project, &OrgPlan::Hobby).is_ok());
    }

    #[test]
    fn missing_settings_is_reported() {
        let mut project = project_with(&[]);
        project.settings = None;
        let mut form = EventFormController::create(None);
        fill(&mut form, "Frustration");
        assert!(matches!(
            form.plan_submit(&project, &OrgPlan::Hobby),
            Err(SetupError::NoProjectSettings(_))
        ));
    }
}

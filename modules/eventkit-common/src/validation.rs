use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::score::CategoriesInput;
use crate::types::{
    DetectionEngine, DetectionScope, EventDefinition, ScoreRangeSettings, ScoreType,
};

pub const EVENT_NAME_MIN: usize = 2;
pub const EVENT_NAME_MAX: usize = 32;
pub const DESCRIPTION_MIN: usize = 10;
pub const DESCRIPTION_MAX: usize = 1000;

/// Score settings as held by the form, before derivation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreRangeInput {
    pub score_type: ScoreType,
    #[serde(default)]
    pub categories: CategoriesInput,
}

impl From<&ScoreRangeSettings> for ScoreRangeInput {
    fn from(settings: &ScoreRangeSettings) -> Self {
        Self {
            score_type: settings.score_type,
            categories: CategoriesInput::List(settings.categories.clone()),
        }
    }
}

/// Raw values of the event form. A superset of the definition fields plus the
/// transient `webhook_auth_header`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventFormValues {
    pub event_name: String,
    pub description: String,
    pub webhook: Option<String>,
    pub webhook_auth_header: Option<String>,
    pub detection_engine: DetectionEngine,
    pub detection_scope: DetectionScope,
    pub keywords: Option<String>,
    pub regex_pattern: Option<String>,
    pub score_range_settings: Option<ScoreRangeInput>,
    pub is_last_task: bool,
}

impl EventFormValues {
    /// Form values describing an existing definition, as shown when it is opened for edit.
    pub fn from_definition(definition: &EventDefinition) -> Self {
        Self {
            event_name: definition.event_name.clone(),
            description: definition.description.clone(),
            webhook: definition.webhook.clone(),
            webhook_auth_header: definition.webhook_authorization().map(String::from),
            detection_engine: definition.detection_engine,
            detection_scope: definition.detection_scope,
            keywords: definition.keywords.clone(),
            regex_pattern: definition.regex_pattern.clone(),
            score_range_settings: definition.score_range_settings.as_ref().map(ScoreRangeInput::from),
            is_last_task: definition.is_last_task,
        }
    }
}

/// Run an already-built definition through the form constraints.
pub fn check_definition(definition: &EventDefinition) -> Result<(), Vec<FieldError>> {
    validate(
        &EventFormValues::from_definition(definition),
        &definition.project_id,
        &definition.org_id,
    )
    .map(|_| ())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FormField {
    EventName,
    Description,
    Categories,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EventName => "event_name",
            Self::Description => "description",
            Self::Categories => "score_range_settings.categories",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A violated constraint, scoped to the field that should display it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: FormField,
    pub message: String,
}

impl FieldError {
    fn new(field: FormField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn check_length(
    errors: &mut Vec<FieldError>,
    field: FormField,
    value: &str,
    min: usize,
    max: usize,
    too_short: &str,
    too_long: &str,
) {
    let len = value.chars().count();
    if len < min {
        errors.push(FieldError::new(field, too_short));
    } else if len > max {
        errors.push(FieldError::new(field, too_long));
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

/// Validate form values and build the definition they describe.
///
/// Errors come back in field order. The emitted definition never carries an `id`
/// or `job_id`, so the platform schedules a fresh detection job for it.
pub fn validate(
    values: &EventFormValues,
    project_id: &str,
    org_id: &str,
) -> Result<EventDefinition, Vec<FieldError>> {
    let mut errors = Vec::new();

    check_length(
        &mut errors,
        FormField::EventName,
        &values.event_name,
        EVENT_NAME_MIN,
        EVENT_NAME_MAX,
        "Event name must be at least 2 characters.",
        "Event name must be at most 32 characters.",
    );
    check_length(
        &mut errors,
        FormField::Description,
        &values.description,
        DESCRIPTION_MIN,
        DESCRIPTION_MAX,
        "Description must be at least 10 characters long.",
        "Description must be at most 1000 characters long.",
    );

    let score_range_settings = match (&values.score_range_settings, values.detection_engine) {
        (None, _) => None,
        (Some(input), DetectionEngine::LlmDetection) => {
            match ScoreRangeSettings::derive(input.score_type, &input.categories) {
                Ok(settings) => Some(settings),
                Err(e) => {
                    let message = match e {
                        crate::EventKitError::Derivation(message) => message,
                        other => other.to_string(),
                    };
                    errors.push(FieldError::new(FormField::Categories, message));
                    None
                }
            }
        }
        // Ignored by keyword/regex engines, so an incomplete category list is not an error.
        (Some(input), _) => ScoreRangeSettings::derive(input.score_type, &input.categories).ok(),
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    let webhook_headers = non_empty(&values.webhook_auth_header)
        .map(|auth| BTreeMap::from([("Authorization".to_string(), auth)]));

    let mut definition = EventDefinition::new(
        project_id,
        org_id,
        values.event_name.clone(),
        values.description.clone(),
    )
    .with_engine(values.detection_engine)
    .with_scope(values.detection_scope);
    definition.keywords = non_empty(&values.keywords);
    definition.regex_pattern = non_empty(&values.regex_pattern);
    definition.score_range_settings = score_range_settings;
    definition.webhook = non_empty(&values.webhook);
    definition.webhook_headers = webhook_headers;
    definition.is_last_task = values.is_last_task;

    Ok(definition)
}

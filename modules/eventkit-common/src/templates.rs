//! Built-in event presets.
//!
//! Two independent catalogs: the onboarding templates (one preset per product
//! domain, always four events) and the starter catalog offered by the event form.
//! Both are pure lookups. Every call builds fresh definitions with no ids.

use crate::score::CategoriesInput;
use crate::types::{DetectionScope, EventDefinition, ScoreRangeSettings, ScoreType};

/// Domain presets offered during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingTemplate {
    TextGeneration,
    CustomerSupport,
    WritingAssistant,
}

impl OnboardingTemplate {
    pub const ALL: [OnboardingTemplate; 3] = [
        Self::TextGeneration,
        Self::CustomerSupport,
        Self::WritingAssistant,
    ];

    /// Unknown names resolve to the writing assistant preset.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Text generation" => Self::TextGeneration,
            "Customer support" => Self::CustomerSupport,
            _ => Self::WritingAssistant,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::TextGeneration => "Text generation",
            Self::CustomerSupport => "Customer support",
            Self::WritingAssistant => "Writing assistant",
        }
    }

    pub fn events(&self, project_id: &str, org_id: &str) -> Vec<EventDefinition> {
        let event = |name: &str, description: &str, scope: DetectionScope| {
            EventDefinition::new(project_id, org_id, name, description).with_scope(scope)
        };

        match self {
            Self::TextGeneration => vec![
                event(
                    "Sounds robotic",
                    "The text generated by the assistant sounds robotic.",
                    DetectionScope::TaskOutputOnly,
                ),
                event(
                    "Repetitive output",
                    "The assistant has generated a repetitive text.",
                    DetectionScope::TaskOutputOnly,
                ),
                event(
                    "Positive sentiment",
                    "The assistant has generated a warm and positive response.",
                    DetectionScope::TaskOutputOnly,
                )
                .with_score(ScoreRangeSettings::range()),
                event(
                    "Toxic content",
                    "The assistant has generated curse words or toxic content.",
                    DetectionScope::TaskOutputOnly,
                ),
            ],
            Self::CustomerSupport => vec![
                event(
                    "Penetration testing",
                    "The user is trying to jailbreak the LLM app.",
                    DetectionScope::TaskInputOnly,
                ),
                event(
                    "User wants to talk to a human",
                    "The user is asking to talk to a human.",
                    DetectionScope::TaskInputOnly,
                ),
                event(
                    "Positive sentiment",
                    "The user expresses satisfaction to the assistant.",
                    DetectionScope::TaskInputOnly,
                )
                .with_score(ScoreRangeSettings::range()),
                event(
                    "Toxic response",
                    "The assistant has generated curse words or a toxic response.",
                    DetectionScope::TaskOutputOnly,
                ),
            ],
            Self::WritingAssistant => vec![
                event(
                    "Follow-up action",
                    "The assistant proposes or executes a follow-up action.",
                    DetectionScope::Session,
                ),
                event(
                    "Positive sentiment",
                    "The reponse generated by the assistant has warmth and is positive.",
                    DetectionScope::TaskOutputOnly,
                )
                .with_score(ScoreRangeSettings::range()),
                event(
                    "Toxic generation",
                    "The assistant has generated curse words or a toxic response.",
                    DetectionScope::Task,
                ),
                event(
                    "Verbose response",
                    "The assistant has generated a verbose response when the user only wanted a brief response.",
                    DetectionScope::Task,
                ),
            ],
        }
    }
}

/// Expand an onboarding template by name. Unknown names fall back to
/// "Writing assistant" rather than failing.
pub fn expand_template(name: &str, project_id: &str, org_id: &str) -> Vec<EventDefinition> {
    OnboardingTemplate::from_name(name).events(project_id, org_id)
}

// --- Starter catalog ---

/// Category filter for the starter catalog. `All` returns every entry.
pub const ALL_CATEGORIES: &str = "All";

pub const STARTER_CATEGORIES: [&str; 4] = ["Quality", "Safety", "User intent", "Sentiment"];

fn starter_table(project_id: &str, org_id: &str) -> Vec<(&'static str, EventDefinition)> {
    let event = |name: &str, description: &str, scope: DetectionScope| {
        EventDefinition::new(project_id, org_id, name, description).with_scope(scope)
    };
    let mood = ScoreRangeSettings::derive(
        ScoreType::Category,
        &CategoriesInput::from("happy,neutral,frustrated"),
    )
    .ok();

    let mut user_mood = event(
        "User mood",
        "How does the user feel during the conversation?",
        DetectionScope::TaskInputOnly,
    );
    user_mood.score_range_settings = mood;

    vec![
        (
            "Quality",
            event(
                "Sounds robotic",
                "The text generated by the assistant sounds robotic.",
                DetectionScope::TaskOutputOnly,
            ),
        ),
        (
            "Quality",
            event(
                "Verbose response",
                "The assistant has generated a verbose response when the user only wanted a brief response.",
                DetectionScope::Task,
            ),
        ),
        (
            "Quality",
            event(
                "Unsupported claim",
                "The assistant states facts that are not supported by the conversation.",
                DetectionScope::TaskOutputOnly,
            ),
        ),
        (
            "Safety",
            event(
                "Penetration testing",
                "The user is trying to jailbreak the LLM app.",
                DetectionScope::TaskInputOnly,
            ),
        ),
        (
            "Safety",
            event(
                "Toxic content",
                "The assistant has generated curse words or toxic content.",
                DetectionScope::TaskOutputOnly,
            ),
        ),
        (
            "Safety",
            event(
                "Email address in output",
                "The assistant output contains an email address.",
                DetectionScope::TaskOutputOnly,
            )
            .with_regex(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}"),
        ),
        (
            "User intent",
            event(
                "User wants to talk to a human",
                "The user is asking to talk to a human.",
                DetectionScope::TaskInputOnly,
            )
            .with_keywords("human, real person, agent, representative"),
        ),
        (
            "User intent",
            event(
                "Cancellation request",
                "The user wants to cancel a subscription or get a refund.",
                DetectionScope::TaskInputOnly,
            )
            .with_keywords("cancel, unsubscribe, refund"),
        ),
        (
            "User intent",
            event(
                "Unresolved conversation",
                "The conversation ends without the user's request being solved.",
                DetectionScope::Session,
            )
            .last_task_only(),
        ),
        (
            "Sentiment",
            event(
                "Positive sentiment",
                "The user expresses satisfaction to the assistant.",
                DetectionScope::TaskInputOnly,
            )
            .with_score(ScoreRangeSettings::confidence()),
        ),
        (
            "Sentiment",
            event(
                "User satisfaction",
                "How satisfied is the user with the answer of the assistant?",
                DetectionScope::Task,
            )
            .with_score(ScoreRangeSettings::range()),
        ),
        ("Sentiment", user_mood),
    ]
}

/// Starter templates for the event form, filtered by category.
pub fn starter_templates(category: &str, project_id: &str, org_id: &str) -> Vec<EventDefinition> {
    starter_table(project_id, org_id)
        .into_iter()
        .filter(|(c, _)| category == ALL_CATEGORIES || *c == category)
        .map(|(_, def)| def)
        .collect()
}

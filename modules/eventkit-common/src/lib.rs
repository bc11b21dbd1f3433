pub mod config;
pub mod error;
pub mod quota;
pub mod score;
pub mod templates;
pub mod types;
pub mod validation;

pub use config::Config;
pub use error::EventKitError;
pub use quota::{can_add_event, event_quota};
pub use score::CategoriesInput;
pub use templates::{expand_template, starter_templates, OnboardingTemplate};
pub use types::*;
pub use validation::{check_definition, validate, EventFormValues, FieldError, FormField, ScoreRangeInput};

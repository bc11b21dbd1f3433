use eventkit_common::FieldError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Validation error: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Validation(Vec<FieldError>),

    #[error("Event limit reached: this plan allows {limit} events")]
    QuotaReached { limit: usize },

    #[error("Project {0} has no settings")]
    NoProjectSettings(String),

    #[error("Error when saving: {0}")]
    Persistence(String),

    #[error("No onboarding template selected")]
    NothingToConfirm,
}

impl SetupError {
    /// Field-scoped messages, empty for non-validation errors.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            SetupError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

pub mod clusters;
pub mod error;
pub mod form;
pub mod onboarding;
pub mod session;
pub mod testing;
pub mod traits;

pub use clusters::{browse_clusters, ClusterView};
pub use error::SetupError;
pub use form::{EventFormController, SubmitPlan};
pub use onboarding::{OnboardingFlow, OnboardingOutcome};
pub use session::{ProjectSession, UpdatePolicy};
pub use traits::{ClusterSource, EventSink, FeedbackSink, NoopFeedback, ProjectStore};

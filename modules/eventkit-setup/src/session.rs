use std::sync::Arc;

use anyhow::Result;
use eventkit_common::{EventDefinition, OrgPlan, Project};

use crate::error::SetupError;
use crate::form::EventFormController;
use crate::traits::ProjectStore;

/// What to do with a locally computed project when persisting it fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdatePolicy {
    /// When false (the default), the new value stays canonical even though the
    /// save failed. The caller shows the error and the unsaved edit stays visible.
    pub rollback_on_failure: bool,
}

/// A project loaded for editing, plus the store it is persisted to.
///
/// Updates are two-phase: a next value is computed without touching the canonical
/// one, then [`ProjectSession::commit`] tries to persist it.
pub struct ProjectSession {
    store: Arc<dyn ProjectStore>,
    project: Project,
    policy: UpdatePolicy,
}

impl ProjectSession {
    pub fn new(store: Arc<dyn ProjectStore>, project: Project, policy: UpdatePolicy) -> Self {
        Self {
            store,
            project,
            policy,
        }
    }

    pub async fn load(
        store: Arc<dyn ProjectStore>,
        project_id: &str,
        policy: UpdatePolicy,
    ) -> Result<Self> {
        let project = store.get_project(project_id).await?;
        tracing::info!(
            project_id,
            events = project.settings.as_ref().map_or(0, |s| s.event_count()),
            "Loaded project"
        );
        Ok(Self::new(store, project, policy))
    }

    /// The canonical project value.
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Persist `next`. On success it becomes canonical. On failure it becomes
    /// canonical anyway unless the policy asks for a rollback.
    pub async fn commit(&mut self, next: Project) -> Result<(), SetupError> {
        match self.store.save_project(&next).await {
            Ok(()) => {
                tracing::info!(project_id = %next.id, "Project settings saved");
                self.project = next;
                Ok(())
            }
            Err(e) => {
                tracing::error!(project_id = %next.id, error = %e, "Failed to save project settings");
                if !self.policy.rollback_on_failure {
                    self.project = next;
                }
                Err(SetupError::Persistence(e.to_string()))
            }
        }
    }

    /// Validate and persist the form. Validation and quota failures return before
    /// any call to the store.
    pub async fn submit(
        &mut self,
        form: &mut EventFormController,
        plan: &OrgPlan,
    ) -> Result<EventDefinition, SetupError> {
        let submit = form.plan_submit(&self.project, plan)?;
        tracing::info!(
            project_id = %self.project.id,
            event_name = %submit.definition.event_name,
            renamed_from = submit.renamed_from.as_deref().unwrap_or(""),
            "Submitting event definition"
        );
        self.commit(submit.next).await?;
        Ok(submit.definition)
    }
}

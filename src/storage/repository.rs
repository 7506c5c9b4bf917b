//! Two-tier project repository
//!
//! Ties the session tier and the remote tier together. Anonymous callers
//! only touch the session tier; authenticated callers write both, and every
//! read that spans both tiers goes through [`merge_by_id`].

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::diagnostics::diagnose;
use super::remote::SharedRemote;
use super::session::SessionStorage;
use crate::reconcile::merge_by_id;
use crate::types::{
    Blueprint, ForgeError, Idea, Identified, Result, TaskStatus, UserId, ValidationError,
    ValidationErrorKind, task_index,
};

/// Idea as seen by list views, with whether it is persisted
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredIdea {
    #[serde(flatten)]
    pub idea: Idea,
    pub saved: bool,
}

impl Identified for StoredIdea {
    fn id(&self) -> &str {
        &self.idea.id
    }
}

/// A project loaded from either tier
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub idea: Idea,
    pub blueprint: Option<Blueprint>,
    pub saved: bool,
}

/// Result of a save. Warnings are secondary failures that did not block it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOutcome {
    pub idea_id: String,
    pub persisted: bool,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub remote_deleted: bool,
    pub session_cleared: bool,
}

pub struct ProjectRepository {
    session: Arc<dyn SessionStorage>,
    remote: SharedRemote,
}

impl ProjectRepository {
    pub fn new(session: Arc<dyn SessionStorage>, remote: SharedRemote) -> Self {
        Self { session, remote }
    }

    pub fn session(&self) -> &dyn SessionStorage {
        self.session.as_ref()
    }

    /// Hold a freshly generated project in the session tier, unsaved.
    pub fn stage_project(&self, idea: &Idea, mut blueprint: Blueprint) -> Result<()> {
        blueprint.idea_id = idea.id.clone();
        self.session.set_project(idea, &blueprint)
    }

    /// Save a project.
    ///
    /// The session tier is always written. For an authenticated actor the
    /// idea insert is the primary write and its failure is returned; the
    /// blueprint insert is secondary and its failure only adds a warning.
    /// Nothing is rolled back.
    pub async fn save_project(
        &self,
        actor: Option<&UserId>,
        mut idea: Idea,
        mut blueprint: Blueprint,
    ) -> Result<SaveOutcome> {
        idea.owner_id = actor.cloned();
        idea.validation_score = blueprint.validation.score;
        blueprint.idea_id = idea.id.clone();

        self.session.set_project(&idea, &blueprint)?;

        let mut outcome = SaveOutcome {
            idea_id: idea.id.clone(),
            ..Default::default()
        };

        if let Some(actor) = actor {
            if let Err(e) = self.remote.insert_idea(actor, &idea).await {
                let diagnosis = diagnose(&e);
                error!("Failed to save idea {}: {}", idea.id, diagnosis.message);
                return Err(e);
            }
            outcome.persisted = true;

            if let Err(e) = self.remote.save_blueprint(actor, &blueprint).await {
                let diagnosis = diagnose(&e);
                warn!(
                    "Idea {} saved but its blueprint was not: {}",
                    idea.id, diagnosis.message
                );
                outcome
                    .warnings
                    .push(format!("Blueprint not saved: {}", diagnosis.message));
            }
        }

        self.session.mark_saved(true)?;
        info!(
            "Saved project {} (persisted: {}, warnings: {})",
            outcome.idea_id,
            outcome.persisted,
            outcome.warnings.len()
        );
        Ok(outcome)
    }

    /// Session idea followed by the actor's persisted ideas.
    pub async fn list_ideas(&self, actor: Option<&UserId>) -> Result<Vec<StoredIdea>> {
        let saved = self.session.project_saved()?;
        let session: Vec<StoredIdea> = self
            .session
            .current_idea()?
            .map(|idea| StoredIdea { idea, saved })
            .into_iter()
            .collect();

        let remote = match actor {
            Some(actor) => self
                .remote
                .list_ideas(actor)
                .await?
                .into_iter()
                .map(|idea| StoredIdea { idea, saved: true })
                .collect(),
            None => Vec::new(),
        };

        Ok(merge_by_id(session, remote))
    }

    /// Load a project, preferring the session copy when it is the same idea.
    pub async fn load_project(
        &self,
        actor: Option<&UserId>,
        idea_id: &str,
    ) -> Result<Option<Project>> {
        if let Some(idea) = self.session.current_idea()?.filter(|i| i.id == idea_id) {
            debug!("Loaded project {} from session", idea_id);
            let blueprint = self
                .session
                .current_blueprint()?
                .filter(|b| b.idea_id == idea_id);
            return Ok(Some(Project {
                idea,
                blueprint,
                saved: self.session.project_saved()?,
            }));
        }

        let Some(actor) = actor else {
            return Ok(None);
        };
        let Some(idea) = self.remote.get_idea(actor, idea_id).await? else {
            return Ok(None);
        };
        let blueprint = self.remote.get_blueprint(actor, idea_id).await?;
        Ok(Some(Project {
            idea,
            blueprint,
            saved: true,
        }))
    }

    /// Delete a project: remote blueprint, then remote idea, then the
    /// matching session keys.
    pub async fn delete_project(
        &self,
        actor: Option<&UserId>,
        idea_id: &str,
    ) -> Result<DeleteOutcome> {
        let mut outcome = DeleteOutcome::default();

        if let Some(actor) = actor {
            let blueprint_deleted = self.remote.delete_blueprint(actor, idea_id).await?;
            let idea_deleted = self.remote.delete_idea(actor, idea_id).await?;
            debug!(
                "Remote delete of {}: blueprint={}, idea={}",
                idea_id, blueprint_deleted, idea_deleted
            );
            outcome.remote_deleted = idea_deleted;
        }

        if self
            .session
            .current_idea()?
            .is_some_and(|idea| idea.id == idea_id)
        {
            self.session.clear_project()?;
            outcome.session_cleared = true;
        }

        if !outcome.remote_deleted && !outcome.session_cleared {
            return Err(ForgeError::NotFound {
                entity: "Idea",
                id: idea_id.to_string(),
            });
        }
        info!("Deleted project {}", idea_id);
        Ok(outcome)
    }

    /// Set the status of one task, addressed by its synthetic id.
    ///
    /// Updates every tier that holds the project and returns the resulting
    /// blueprint.
    pub async fn update_task_status(
        &self,
        actor: Option<&UserId>,
        idea_id: &str,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<Blueprint> {
        let index = task_index(idea_id, task_id).ok_or_else(|| {
            ValidationError::new(
                ValidationErrorKind::Format,
                format!("'{}' is not a task of idea '{}'", task_id, idea_id),
            )
            .with_field("taskId")
        })?;

        let mut updated = None;

        if let Some(mut blueprint) = self
            .session
            .current_blueprint()?
            .filter(|b| b.idea_id == idea_id)
        {
            set_status(&mut blueprint, index, task_id, status)?;
            self.session.set_blueprint(&blueprint)?;
            updated = Some(blueprint);
        }

        if let Some(actor) = actor
            && let Some(mut blueprint) = self.remote.get_blueprint(actor, idea_id).await?
        {
            set_status(&mut blueprint, index, task_id, status)?;
            self.remote
                .update_tasks(actor, idea_id, &blueprint.tasks)
                .await?;
            updated.get_or_insert(blueprint);
        }

        updated.ok_or_else(|| ForgeError::NotFound {
            entity: "Blueprint",
            id: idea_id.to_string(),
        })
    }
}

fn set_status(
    blueprint: &mut Blueprint,
    index: usize,
    task_id: &str,
    status: TaskStatus,
) -> Result<()> {
    let task = blueprint
        .tasks
        .get_mut(index)
        .ok_or_else(|| ForgeError::NotFound {
            entity: "Task",
            id: task_id.to_string(),
        })?;
    task.status = status;
    Ok(())
}

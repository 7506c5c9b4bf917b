//! Generate Command
//!
//! Generate a blueprint for an idea, stage it in the session file and
//! optionally save it.

use tracing::info;

use super::ideas::print_project;
use super::print_json;
use crate::blueprint::BlueprintGenerator;
use crate::chart::SurfaceSize;
use crate::cli::{CommandContext, Output};
use crate::constants::generation::{MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS};
use crate::storage::Project;
use crate::types::{Idea, Result, ValidationError, ValidationErrorKind};
use crate::views::ProjectView;

pub struct GenerateOptions {
    pub title: String,
    pub description: String,
    pub save: bool,
    pub format: String,
}

fn required(value: &str, field: &str, max_chars: usize) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::missing(field).into());
    }
    if value.chars().count() > max_chars {
        return Err(ValidationError::new(
            ValidationErrorKind::Range,
            format!("must be at most {} characters", max_chars),
        )
        .with_field(field)
        .into());
    }
    Ok(value.to_string())
}

pub async fn run(ctx: &CommandContext, options: GenerateOptions) -> Result<Project> {
    let title = required(&options.title, "title", MAX_TITLE_CHARS)?;
    let description = required(&options.description, "description", MAX_DESCRIPTION_CHARS)?;
    let out = Output::new();

    let generator = BlueprintGenerator::from_config(&ctx.config.llm);
    let generated = generator.generate(&title, &description).await;
    if generated.is_mock() {
        out.warning("LLM unavailable; showing sample blueprint data");
    }

    let mut blueprint = generated.blueprint;
    let idea = Idea::new(title, description)
        .with_score(blueprint.validation.score)
        .owned_by(ctx.actor.clone());
    blueprint.idea_id = idea.id.clone();
    ctx.repository.stage_project(&idea, blueprint.clone())?;
    info!("Generated blueprint for idea {}", idea.id);

    let mut saved = false;
    if options.save {
        let outcome = ctx
            .repository
            .save_project(ctx.actor(), idea.clone(), blueprint.clone())
            .await?;
        for warning in &outcome.warnings {
            out.warning(warning);
        }
        saved = outcome.persisted;
    }

    let project = Project {
        idea,
        blueprint: Some(blueprint),
        saved,
    };

    if options.format == "json" {
        print_json(&ProjectView::from_project(
            project.clone(),
            SurfaceSize::from_config(&ctx.config.chart),
        ))?;
    } else {
        print_project(&project);
        if options.save && saved {
            out.success(&format!("Saved idea {}", project.idea.id));
        } else if options.save {
            out.info("Kept in session only (no --user given)");
        } else {
            out.info("Staged in session. Save with 'ideaforge ideas save' or rerun with --save");
        }
    }
    Ok(project)
}

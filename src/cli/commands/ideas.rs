//! Ideas Command
//!
//! List, show, save and delete projects across the session file and the
//! database.
//!
//! Usage:
//!   ideaforge [--user ID] ideas list [-f json]
//!   ideaforge [--user ID] ideas show <id> [-f json]
//!   ideaforge [--user ID] ideas save
//!   ideaforge [--user ID] ideas delete <id>

use super::print_json;
use crate::chart::{ScoreBand, SurfaceSize};
use crate::cli::ui::banded;
use crate::cli::{CommandContext, Output};
use crate::storage::{DeleteOutcome, Project, SaveOutcome};
use crate::types::{ForgeError, Result};
use crate::views::{IdeaCard, ProjectView, dashboard};

pub async fn list(ctx: &CommandContext, format: &str) -> Result<Vec<IdeaCard>> {
    let cards = dashboard(&ctx.repository.list_ideas(ctx.actor()).await?);

    if format == "json" {
        print_json(&cards)?;
        return Ok(cards);
    }

    let out = Output::new();
    out.header("Ideas");
    if cards.is_empty() {
        println!("No ideas yet. Run 'ideaforge generate <title> <description>'.");
        return Ok(cards);
    }
    for card in &cards {
        println!(
            "  {} {:<40} {}{}",
            banded(format!("{:>4.1}", card.score), card.band),
            card.title,
            card.id,
            if card.saved { "" } else { "  (unsaved)" }
        );
    }
    Ok(cards)
}

pub async fn show(ctx: &CommandContext, id: &str, format: &str) -> Result<ProjectView> {
    let project = ctx
        .repository
        .load_project(ctx.actor(), id)
        .await?
        .ok_or_else(|| ForgeError::NotFound {
            entity: "Idea",
            id: id.to_string(),
        })?;

    let view = ProjectView::from_project(project.clone(), SurfaceSize::from_config(&ctx.config.chart));
    if format == "json" {
        print_json(&view)?;
    } else {
        print_project(&project);
        Output::new().field(
            "Tasks",
            &format!(
                "{} todo, {} in progress, {} done ({}%)",
                view.tasks.todo, view.tasks.in_progress, view.tasks.done, view.tasks.completion
            ),
        );
    }
    Ok(view)
}

/// Human-readable project summary
pub fn print_project(project: &Project) {
    let out = Output::new();
    let idea = &project.idea;
    out.header(&idea.title);
    out.field("Id", &idea.id);
    out.field("Created", &idea.created_at.format("%Y-%m-%d %H:%M").to_string());
    out.field("Saved", if project.saved { "yes" } else { "no" });

    let Some(blueprint) = &project.blueprint else {
        out.warning("No blueprint stored for this idea");
        return;
    };
    let validation = &blueprint.validation;

    out.section("Validation");
    out.score("Overall", validation.score);
    for (pillar, score) in &validation.pillars {
        out.score(pillar, *score);
    }
    if !validation.feedback.is_empty() {
        println!("\n  {}", validation.feedback);
    }

    if !validation.strengths.is_empty() {
        out.section("Strengths");
        validation.strengths.iter().for_each(|s| out.bullet(s));
    }
    if !validation.weaknesses.is_empty() {
        out.section("Weaknesses");
        validation.weaknesses.iter().for_each(|w| out.bullet(w));
    }
    if !blueprint.features.core.is_empty() {
        out.section("Core Features");
        blueprint.features.core.iter().for_each(|f| out.bullet(f));
    }

    let band = ScoreBand::for_score(validation.score);
    println!(
        "\n  Verdict: {}",
        banded(band.as_str().to_uppercase(), band).bold()
    );
}

/// Save the project currently staged in the session file
pub async fn save(ctx: &CommandContext) -> Result<SaveOutcome> {
    let session = ctx.repository.session();
    let idea = session.current_idea()?.ok_or_else(|| ForgeError::NotFound {
        entity: "Session project",
        id: ctx.config.storage.session_path.display().to_string(),
    })?;
    let blueprint = session
        .current_blueprint()?
        .filter(|b| b.idea_id == idea.id)
        .ok_or_else(|| ForgeError::NotFound {
            entity: "Blueprint",
            id: idea.id.clone(),
        })?;

    let outcome = ctx.repository.save_project(ctx.actor(), idea, blueprint).await?;
    let out = Output::new();
    for warning in &outcome.warnings {
        out.warning(warning);
    }
    if outcome.persisted {
        out.success(&format!("Saved idea {}", outcome.idea_id));
    } else {
        out.info("Kept in session only (no --user given)");
    }
    Ok(outcome)
}

pub async fn delete(ctx: &CommandContext, id: &str) -> Result<DeleteOutcome> {
    let outcome = ctx.repository.delete_project(ctx.actor(), id).await?;
    Output::new().success(&format!("Deleted idea {}", id));
    Ok(outcome)
}

//! Tasks Command
//!
//! Usage:
//!   ideaforge [--user ID] tasks list <idea-id> [-f json]
//!   ideaforge [--user ID] tasks set <idea-id> <task-id> <status>

use console::style;

use super::print_json;
use crate::cli::{CommandContext, Output};
use crate::types::{ForgeError, Priority, Result, TaskStatus, ValidationError, ValidationErrorKind};
use crate::views::TaskBoard;

pub async fn list(ctx: &CommandContext, idea_id: &str, format: &str) -> Result<TaskBoard> {
    let blueprint = ctx
        .repository
        .load_project(ctx.actor(), idea_id)
        .await?
        .and_then(|p| p.blueprint)
        .ok_or_else(|| ForgeError::NotFound {
            entity: "Blueprint",
            id: idea_id.to_string(),
        })?;
    let board = TaskBoard::from_blueprint(&blueprint);

    if format == "json" {
        print_json(&board)?;
    } else {
        print_board(&board);
    }
    Ok(board)
}

fn print_board(board: &TaskBoard) {
    let out = Output::new();
    for column in &board.columns {
        out.section(&format!("{} ({})", column.status, column.count));
        for task in &column.tasks {
            let priority = match task.priority {
                Priority::High => style(task.priority.as_str()).red(),
                Priority::Medium => style(task.priority.as_str()).yellow(),
                Priority::Low => style(task.priority.as_str()).dim(),
            };
            println!("  [{:<6}] {}  {}", priority, task.title, style(&task.id).dim());
        }
    }
    println!(
        "\n{}/{} done ({}%)",
        board.done, board.total, board.completion
    );
}

pub async fn set(
    ctx: &CommandContext,
    idea_id: &str,
    task_id: &str,
    status: &str,
) -> Result<TaskBoard> {
    let status: TaskStatus = status.parse().map_err(|e: String| {
        ForgeError::from(ValidationError::new(ValidationErrorKind::Format, e).with_field("status"))
    })?;

    let blueprint = ctx
        .repository
        .update_task_status(ctx.actor(), idea_id, task_id, status)
        .await?;
    Output::new().success(&format!("Task {} is now {}", task_id, status));
    Ok(TaskBoard::from_blueprint(&blueprint))
}

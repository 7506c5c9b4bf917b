//! Project detail

use serde::Serialize;

use super::tasks::TaskBoard;
use crate::chart::{LegendEntry, RadarChart, ScoreBand, SurfaceSize};
use crate::storage::Project;
use crate::types::{Blueprint, Idea, TaskStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    pub total: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
    pub completion: u8,
}

impl TaskSummary {
    fn from_board(board: &TaskBoard) -> Self {
        let count = |status| board.column(status).map_or(0, |c| c.count);
        Self {
            total: board.total,
            todo: count(TaskStatus::Todo),
            in_progress: count(TaskStatus::InProgress),
            done: board.done,
            completion: board.completion,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub idea: Idea,
    pub blueprint: Option<Blueprint>,
    pub saved: bool,
    pub score: f64,
    pub band: ScoreBand,
    pub pillars: Vec<LegendEntry>,
    pub tasks: TaskSummary,
}

impl ProjectView {
    pub fn from_project(project: Project, size: SurfaceSize) -> Self {
        let score = project
            .blueprint
            .as_ref()
            .map_or(project.idea.validation_score, |b| b.validation.score);

        let (pillars, board) = match &project.blueprint {
            Some(blueprint) => (
                RadarChart::new(&blueprint.validation.pillars, size).legend(),
                TaskBoard::from_blueprint(blueprint),
            ),
            None => (Vec::new(), TaskBoard::from_blueprint(&Blueprint::default())),
        };

        Self {
            score,
            band: ScoreBand::for_score(score),
            pillars,
            tasks: TaskSummary::from_board(&board),
            idea: project.idea,
            blueprint: project.blueprint,
            saved: project.saved,
        }
    }
}

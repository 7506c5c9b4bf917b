//! Task board
//!
//! Tasks live embedded in the blueprint; the board addresses them by their
//! synthetic id and groups them into the three status columns.

use serde::Serialize;

use crate::types::{Blueprint, BlueprintTask, Priority, TaskStatus, task_id};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCard {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category: String,
    pub status: TaskStatus,
}

impl TaskCard {
    fn new(idea_id: &str, index: usize, task: &BlueprintTask) -> Self {
        Self {
            id: task_id(idea_id, index),
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority,
            category: task.category.clone(),
            status: task.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskColumn {
    pub status: TaskStatus,
    pub count: usize,
    pub tasks: Vec<TaskCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskBoard {
    pub idea_id: String,
    pub columns: Vec<TaskColumn>,
    pub total: usize,
    pub done: usize,
    /// Whole percent of tasks done; 0 for an empty board
    pub completion: u8,
}

impl TaskBoard {
    pub fn from_blueprint(blueprint: &Blueprint) -> Self {
        let idea_id = blueprint.idea_id.as_str();
        let cards: Vec<TaskCard> = blueprint
            .tasks
            .iter()
            .enumerate()
            .map(|(i, task)| TaskCard::new(idea_id, i, task))
            .collect();

        let columns: Vec<TaskColumn> = TaskStatus::ALL
            .iter()
            .map(|status| {
                let tasks: Vec<TaskCard> = cards
                    .iter()
                    .filter(|c| c.status == *status)
                    .cloned()
                    .collect();
                TaskColumn {
                    status: *status,
                    count: tasks.len(),
                    tasks,
                }
            })
            .collect();

        let total = cards.len();
        let done = cards.iter().filter(|c| c.status == TaskStatus::Done).count();
        Self {
            idea_id: idea_id.to_string(),
            columns,
            total,
            done,
            completion: completion_percent(done, total),
        }
    }

    pub fn column(&self, status: TaskStatus) -> Option<&TaskColumn> {
        self.columns.iter().find(|c| c.status == status)
    }

    pub fn card(&self, id: &str) -> Option<&TaskCard> {
        self.columns
            .iter()
            .flat_map(|c| c.tasks.iter())
            .find(|t| t.id == id)
    }
}

fn completion_percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((done as f64 / total as f64) * 100.0).round() as u8
}

//! View models consumed by the HTTP routes and the CLI

pub mod dashboard;
pub mod project;
pub mod tasks;

pub use dashboard::{IdeaCard, dashboard};
pub use project::{ProjectView, TaskSummary};
pub use tasks::{TaskBoard, TaskCard, TaskColumn};

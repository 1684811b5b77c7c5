//! Task data structures.
//!
//! A `Task` only ever lives inside the `tasks` list of its owning project. The
//! `BoardTask` view attaches the owning project's id and name when tasks are
//! flattened across projects for the Kanban board.

use crate::fields::TaskStatus;

/// A unit of work belonging to exactly one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub assigned_user: String,
    pub status: TaskStatus,
    pub created_at_utc: i64,
}

/// Validated input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInput {
    pub name: String,
    pub description: Option<String>,
    pub assigned_user: String,
    pub status: TaskStatus,
}

impl TaskInput {
    pub fn new(name: &str, assigned_user: &str, status: TaskStatus) -> Self {
        TaskInput {
            name: name.to_string(),
            description: None,
            assigned_user: assigned_user.to_string(),
            status,
        }
    }
}

/// A task tagged with its owning project, produced for cross-project views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardTask {
    pub project_id: u64,
    pub project_name: String,
    pub task: Task,
}

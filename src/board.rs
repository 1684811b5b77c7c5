//! Cross-project task board.
//!
//! Flattens every project's tasks into one list tagged with the owning
//! project, filters it, and partitions it into Todo / In Progress / Done
//! columns. Nothing here is stored; the board is rebuilt on every read.

use crate::fields::TaskStatus;
use crate::project::Project;
use crate::task::BoardTask;

/// Filters offered on the board. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub search: String,
    pub status: Option<TaskStatus>,
    pub project_id: Option<u64>,
}

impl TaskFilter {
    /// Number of dropdown filters that are narrowing the view.
    pub fn active_count(&self) -> usize {
        self.status.is_some() as usize + self.project_id.is_some() as usize
    }

    /// Reset the dropdown filters; the search text is kept.
    pub fn clear(&mut self) {
        self.status = None;
        self.project_id = None;
    }

    /// Whether a task passes the search text and both dropdown filters.
    /// The search matches task name or assigned user, case-insensitively.
    pub fn matches(&self, task: &BoardTask) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = task.task.name.to_lowercase().contains(&needle)
            || task.task.assigned_user.to_lowercase().contains(&needle);
        let matches_status = self.status.map_or(true, |s| task.task.status == s);
        let matches_project = self.project_id.map_or(true, |id| task.project_id == id);
        matches_search && matches_status && matches_project
    }
}

/// Every task of every project, in project order then task order.
pub fn flatten(projects: &[Project]) -> Vec<BoardTask> {
    projects
        .iter()
        .flat_map(|project| {
            project.tasks.iter().map(move |task| BoardTask {
                project_id: project.id,
                project_name: project.name.clone(),
                task: task.clone(),
            })
        })
        .collect()
}

/// Tasks grouped by status for the Kanban view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    pub todo: Vec<BoardTask>,
    pub in_progress: Vec<BoardTask>,
    pub done: Vec<BoardTask>,
    /// Tasks across all projects before filtering.
    pub total: usize,
}

impl Board {
    /// Build the board from the current projects, applying `filter`.
    pub fn build(projects: &[Project], filter: &TaskFilter) -> Self {
        let all = flatten(projects);
        let total = all.len();
        let mut board = Board::partition(all.into_iter().filter(|t| filter.matches(t)));
        board.total = total;
        board
    }

    /// Split tasks into status columns, keeping their relative order.
    pub fn partition(tasks: impl IntoIterator<Item = BoardTask>) -> Self {
        let mut board = Board::default();
        for task in tasks {
            board.total += 1;
            match task.task.status {
                TaskStatus::Todo => board.todo.push(task),
                TaskStatus::InProgress => board.in_progress.push(task),
                TaskStatus::Done => board.done.push(task),
            }
        }
        board
    }

    pub fn column(&self, status: TaskStatus) -> &[BoardTask] {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Done => &self.done,
        }
    }

    /// Tasks shown after filtering.
    pub fn shown(&self) -> usize {
        self.todo.len() + self.in_progress.len() + self.done.len()
    }
}

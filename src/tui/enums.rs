//! Enumerations for TUI state management.

/// Screen or dialog the dashboard is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Dashboard,
    ProjectList,
    ProjectDetail,
    AddProject,
    EditProject,
    AddTask,
    TaskBoard,
    Help,
    Confirm,
}

impl AppState {
    /// Top-level screens reachable from the navigation bar.
    pub const NAV: [AppState; 3] = [AppState::Dashboard, AppState::ProjectList, AppState::TaskBoard];

    pub fn title(self) -> &'static str {
        match self {
            AppState::Dashboard => "Dashboard",
            AppState::ProjectList => "Projects",
            AppState::ProjectDetail => "Project Details",
            AppState::AddProject => "Create Project",
            AppState::EditProject => "Edit Project",
            AppState::AddTask => "Add Task",
            AppState::TaskBoard => "Tasks",
            AppState::Help => "Help",
            AppState::Confirm => "Confirm Action",
        }
    }
}

/// Input mode for the search/filter line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    None,
    Search,
}

/// A destructive action waiting for confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteProject(u64),
    DeleteTask { project_id: u64, task_id: u64 },
}

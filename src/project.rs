//! Project data structures and the fixed seed data.
//!
//! A project owns its tasks exclusively. Its `total_tasks` and
//! `completed_tasks` counters start out as manually entered values and switch
//! to being derived from the task list the first time a task is added,
//! re-statused or removed (see [`CounterSource`]).

use chrono::NaiveDate;

use crate::fields::{Priority, ProjectStatus, TaskStatus};
use crate::task::Task;

/// Team members offered by the project form.
pub const TEAM_MEMBERS: [&str; 6] = ["Alice", "Bob", "Charlie", "David", "Emma", "Frank"];

/// Managers offered by the project form.
pub const MANAGERS: [&str; 3] = ["Manager A", "Manager B", "Manager C"];

/// Which policy currently governs a project's task counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CounterSource {
    /// Counters hold values entered by hand; the task list has never been touched.
    Manual,
    /// Counters always mirror the task list.
    #[default]
    Derived,
}

/// A unit of work with a schedule, a team and its own tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub assignees: Vec<String>,
    pub manager: Option<String>,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub counters: CounterSource,
    pub tasks: Vec<Task>,
}

impl Project {
    /// Completion percentage for display, `0` when there are no tasks.
    pub fn completion(&self) -> u32 {
        completion_percentage(self.completed_tasks, self.total_tasks)
    }

    /// Tasks not yet done.
    pub fn remaining_tasks(&self) -> u32 {
        self.total_tasks.saturating_sub(self.completed_tasks)
    }

    /// Get a task by ID.
    pub fn task(&self, task_id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Generate the next available task ID within this project.
    pub fn next_task_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    /// Recompute both counters from the task list and pin them as derived.
    pub fn recompute_counters(&mut self) {
        self.total_tasks = self.tasks.len() as u32;
        self.completed_tasks = self
            .tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Done)
            .count() as u32;
        self.counters = CounterSource::Derived;
    }
}

/// Validated input for creating or editing a project.
///
/// Assignees are full names; the store turns them into two-letter codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInput {
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub assignees: Vec<String>,
    pub manager: Option<String>,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub total_tasks: Option<u32>,
    pub completed_tasks: Option<u32>,
}

impl ProjectInput {
    /// Minimal input with the form's defaults for everything optional.
    pub fn new(name: &str, assignees: &[&str], status: ProjectStatus, priority: Priority) -> Self {
        ProjectInput {
            name: name.to_string(),
            description: None,
            start_date: None,
            due_date: None,
            assignees: assignees.iter().map(|a| a.to_string()).collect(),
            manager: None,
            status,
            priority,
            total_tasks: None,
            completed_tasks: None,
        }
    }
}

/// Two-letter uppercase code for a team member ("Alice" -> "AL").
pub fn assignee_code(name: &str) -> String {
    name.chars().take(2).collect::<String>().to_uppercase()
}

/// `round(completed / total * 100)`, or `0` when `total` is `0`.
pub fn completion_percentage(completed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u32
}

/// The three example projects the store is bootstrapped with.
pub fn seed_projects() -> Vec<Project> {
    fn seed(
        id: u64,
        name: &str,
        completed: u32,
        total: u32,
        due: (i32, u32, u32),
        assignees: &[&str],
        status: ProjectStatus,
        priority: Priority,
    ) -> Project {
        Project {
            id,
            name: name.to_string(),
            description: None,
            start_date: None,
            due_date: NaiveDate::from_ymd_opt(due.0, due.1, due.2),
            assignees: assignees.iter().map(|a| a.to_string()).collect(),
            manager: None,
            status,
            priority,
            total_tasks: total,
            completed_tasks: completed,
            counters: CounterSource::Manual,
            tasks: Vec::new(),
        }
    }

    vec![
        seed(
            1,
            "Website Redesign",
            6,
            10,
            (2026, 2, 20),
            &["SS", "AK", "RM", "JP"],
            ProjectStatus::InProgress,
            Priority::High,
        ),
        seed(
            2,
            "Mobile App",
            12,
            12,
            (2026, 1, 30),
            &["SS", "AK"],
            ProjectStatus::Completed,
            Priority::Medium,
        ),
        seed(
            3,
            "CRM Dashboard",
            2,
            8,
            (2026, 3, 10),
            &["SS", "RM", "JP"],
            ProjectStatus::Planned,
            Priority::Low,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignee_code() {
        assert_eq!(assignee_code("Alice"), "AL");
        assert_eq!(assignee_code("bob"), "BO");
        assert_eq!(assignee_code("SS"), "SS");
        assert_eq!(assignee_code("J"), "J");
        assert_eq!(assignee_code(""), "");
    }

    #[test]
    fn test_completion_percentage() {
        assert_eq!(completion_percentage(0, 0), 0);
        assert_eq!(completion_percentage(5, 10), 50);
        assert_eq!(completion_percentage(10, 10), 100);
        assert_eq!(completion_percentage(2, 8), 25);
        assert_eq!(completion_percentage(1, 3), 33);
        assert_eq!(completion_percentage(2, 3), 67);
    }

    #[test]
    fn test_seed_projects() {
        let seeds = seed_projects();
        assert_eq!(seeds.len(), 3);
        assert_eq!(seeds.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(seeds.iter().all(|p| p.counters == CounterSource::Manual && p.tasks.is_empty()));
        assert_eq!(seeds[0].completion(), 60);
        assert_eq!(seeds[1].completion(), 100);
        assert_eq!(seeds[2].remaining_tasks(), 6);
        assert_eq!(seeds[0].due_date, NaiveDate::from_ymd_opt(2026, 2, 20));
    }

    #[test]
    fn test_recompute_counters_on_empty_list() {
        let mut project = seed_projects().remove(0);
        project.recompute_counters();
        assert_eq!(project.total_tasks, 0);
        assert_eq!(project.completed_tasks, 0);
        assert_eq!(project.counters, CounterSource::Derived);
        assert_eq!(project.next_task_id(), 1);
    }
}

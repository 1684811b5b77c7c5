//! Enumerations and field types for projects and tasks.
//!
//! This module defines the closed value sets the dashboard works with: project
//! lifecycle status, project priority, task status and the colour theme.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[serde(alias = "Planned")]
    Planned,
    #[serde(alias = "In Progress")]
    InProgress,
    #[serde(alias = "On Hold")]
    OnHold,
    #[serde(alias = "Completed")]
    Completed,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Planned,
        ProjectStatus::InProgress,
        ProjectStatus::OnHold,
        ProjectStatus::Completed,
    ];
}

/// Relative importance of a project.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    #[serde(alias = "Low")]
    Low,
    #[serde(alias = "Medium")]
    Medium,
    #[serde(alias = "High")]
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];
}

/// Task status. Any status may move to any other; there is no terminal state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[serde(alias = "Todo")]
    Todo,
    #[serde(alias = "In Progress")]
    InProgress,
    #[serde(alias = "Done")]
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    /// Next status in display order, wrapping from Done back to Todo.
    pub fn cycle(self) -> TaskStatus {
        match self {
            TaskStatus::Todo => TaskStatus::InProgress,
            TaskStatus::InProgress => TaskStatus::Done,
            TaskStatus::Done => TaskStatus::Todo,
        }
    }
}

/// Colour theme preference persisted between runs.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_cycle_visits_every_state() {
        let mut status = TaskStatus::Todo;
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(status);
            status = status.cycle();
        }
        assert_eq!(seen, TaskStatus::ALL.to_vec());
        assert_eq!(status, TaskStatus::Todo);
    }

    #[test]
    fn test_status_deserialises_display_labels() {
        let s: ProjectStatus = serde_json::from_str("\"In Progress\"").unwrap();
        assert_eq!(s, ProjectStatus::InProgress);
        let s: ProjectStatus = serde_json::from_str("\"on-hold\"").unwrap();
        assert_eq!(s, ProjectStatus::OnHold);
        let t: TaskStatus = serde_json::from_str("\"Done\"").unwrap();
        assert_eq!(t, TaskStatus::Done);
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::default(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled().as_str(), "light");
    }
}

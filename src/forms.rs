//! Project and task forms.
//!
//! Forms hold raw user input as typed in, validate it into a field -> message
//! map, and only hand the store a well-formed `ProjectInput` / `TaskInput`.
//! The store trusts its callers, so every creation or edit path goes through
//! one of these forms first.

use chrono::{Local, NaiveDate};

use crate::dates::parse_date_input;
use crate::errors::{AppError, FieldErrors};
use crate::fields::{Priority, ProjectStatus, TaskStatus};
use crate::project::{assignee_code, Project, ProjectInput};
use crate::task::TaskInput;

/// Raw state of the create/edit project form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectForm {
    pub name: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub assignees: Vec<String>,
    pub manager: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub total_tasks: String,
    pub completed_tasks: String,
}

impl Default for ProjectForm {
    fn default() -> Self {
        ProjectForm {
            name: String::new(),
            description: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            assignees: Vec::new(),
            manager: String::new(),
            status: ProjectStatus::Planned,
            priority: Priority::Medium,
            total_tasks: String::new(),
            completed_tasks: String::new(),
        }
    }
}

impl ProjectForm {
    /// Pre-fill the form from an existing project for editing.
    pub fn from_project(project: &Project) -> Self {
        ProjectForm {
            name: project.name.clone(),
            description: project.description.clone().unwrap_or_default(),
            start_date: project.start_date.map(|d| d.to_string()).unwrap_or_default(),
            end_date: project.due_date.map(|d| d.to_string()).unwrap_or_default(),
            assignees: project.assignees.clone(),
            manager: project.manager.clone().unwrap_or_default(),
            status: project.status,
            priority: project.priority,
            total_tasks: project.total_tasks.to_string(),
            completed_tasks: project.completed_tasks.to_string(),
        }
    }

    /// Whether a team member is selected, by full name or by code.
    pub fn has_assignee(&self, name: &str) -> bool {
        let code = assignee_code(name);
        self.assignees.iter().any(|a| a == name || *a == code)
    }

    /// Select or deselect a team member.
    pub fn toggle_assignee(&mut self, name: &str) {
        if self.has_assignee(name) {
            let code = assignee_code(name);
            self.assignees.retain(|a| a != name && *a != code);
        } else {
            self.assignees.push(name.to_string());
        }
    }

    /// Check every field, returning one message per offending field.
    pub fn validate(&self) -> FieldErrors {
        self.validate_on(Local::now().date_naive())
    }

    fn validate_on(&self, today: NaiveDate) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if self.name.trim().is_empty() {
            errors.insert("name", "Project name is required".to_string());
        }

        let start = parse_optional_date(&self.start_date, today, "start_date", &mut errors);
        let end = parse_optional_date(&self.end_date, today, "end_date", &mut errors);
        if let (Some(start), Some(end)) = (start, end) {
            if end <= start {
                errors.insert("end_date", "End date must be after start date".to_string());
            }
        }

        if self.assignees.is_empty() {
            errors.insert("assignees", "Select at least one team member".to_string());
        }

        let total = parse_optional_count(&self.total_tasks, "total_tasks", "Total tasks", &mut errors);
        let completed =
            parse_optional_count(&self.completed_tasks, "completed_tasks", "Completed tasks", &mut errors);
        // A blank total counts as 0 once completed tasks are given.
        let total = if self.total_tasks.trim().is_empty() { Some(0) } else { total };
        if let (Some(total), Some(completed)) = (total, completed) {
            if total >= 0 && completed > total {
                errors.insert("completed_tasks", "Completed tasks cannot exceed total tasks".to_string());
            }
        }

        errors
    }

    /// Validate and convert into store input.
    pub fn submit(&self) -> Result<ProjectInput, AppError> {
        self.submit_on(Local::now().date_naive())
    }

    fn submit_on(&self, today: NaiveDate) -> Result<ProjectInput, AppError> {
        let errors = self.validate_on(today);
        if !errors.is_empty() {
            return Err(AppError::Validation { errors });
        }

        let count = |s: &str| s.trim().parse::<u32>().ok();
        Ok(ProjectInput {
            name: self.name.trim().to_string(),
            description: non_empty(&self.description),
            start_date: parse_date_input(&self.start_date, today),
            due_date: parse_date_input(&self.end_date, today),
            assignees: self.assignees.clone(),
            manager: non_empty(&self.manager),
            status: self.status,
            priority: self.priority,
            total_tasks: count(&self.total_tasks),
            completed_tasks: count(&self.completed_tasks),
        })
    }
}

/// Raw state of the add-task modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    pub name: String,
    pub description: String,
    pub assigned_user: String,
    pub status: TaskStatus,
}

impl Default for TaskForm {
    fn default() -> Self {
        TaskForm {
            name: String::new(),
            description: String::new(),
            assigned_user: String::new(),
            status: TaskStatus::Todo,
        }
    }
}

impl TaskForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.insert("name", "Task name is required".to_string());
        }
        if self.assigned_user.trim().is_empty() {
            errors.insert("assigned_user", "Please assign a user".to_string());
        }
        errors
    }

    /// Validate and convert into store input.
    pub fn submit(&self) -> Result<TaskInput, AppError> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(AppError::Validation { errors });
        }
        Ok(TaskInput {
            name: self.name.trim().to_string(),
            description: non_empty(&self.description),
            assigned_user: self.assigned_user.trim().to_string(),
            status: self.status,
        })
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() { None } else { Some(s.to_string()) }
}

fn parse_optional_date(
    raw: &str,
    today: NaiveDate,
    field: &'static str,
    errors: &mut FieldErrors,
) -> Option<NaiveDate> {
    if raw.trim().is_empty() {
        return None;
    }
    let date = parse_date_input(raw, today);
    if date.is_none() {
        errors.insert(field, "Invalid date".to_string());
    }
    date
}

fn parse_optional_count(
    raw: &str,
    field: &'static str,
    label: &str,
    errors: &mut FieldErrors,
) -> Option<i64> {
    if raw.trim().is_empty() {
        return None;
    }
    match raw.trim().parse::<i64>() {
        Ok(n) if n < 0 => {
            errors.insert(field, format!("{label} must be 0 or greater"));
            Some(n)
        }
        Ok(n) if n > u32::MAX as i64 => {
            errors.insert(field, "Must be a whole number".to_string());
            None
        }
        Ok(n) => Some(n),
        Err(_) => {
            errors.insert(field, "Must be a whole number".to_string());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::seed_projects;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
    }

    fn valid_form() -> ProjectForm {
        ProjectForm {
            name: "Demo".to_string(),
            assignees: vec!["Alice".to_string(), "Bob".to_string()],
            status: ProjectStatus::Planned,
            priority: Priority::Low,
            ..ProjectForm::default()
        }
    }

    #[test]
    fn test_defaults_match_new_project_form() {
        let form = ProjectForm::default();
        assert_eq!(form.status, ProjectStatus::Planned);
        assert_eq!(form.priority, Priority::Medium);
        assert_eq!(TaskForm::default().status, TaskStatus::Todo);
    }

    #[test]
    fn test_empty_form_reports_required_fields() {
        let errors = ProjectForm::default().validate_on(today());
        assert_eq!(errors.get("name").map(String::as_str), Some("Project name is required"));
        assert_eq!(errors.get("assignees").map(String::as_str), Some("Select at least one team member"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_whitespace_name_is_rejected() {
        let mut form = valid_form();
        form.name = "   ".to_string();
        assert!(form.validate_on(today()).contains_key("name"));
    }

    #[test]
    fn test_end_date_must_follow_start_date() {
        let mut form = valid_form();
        form.start_date = "2026-03-01".to_string();
        form.end_date = "2026-03-01".to_string();
        assert_eq!(
            form.validate_on(today()).get("end_date").map(String::as_str),
            Some("End date must be after start date")
        );

        form.end_date = "2026-03-02".to_string();
        assert!(form.validate_on(today()).is_empty());
    }

    #[test]
    fn test_unparsable_date() {
        let mut form = valid_form();
        form.start_date = "soonish".to_string();
        assert_eq!(form.validate_on(today()).get("start_date").map(String::as_str), Some("Invalid date"));
    }

    #[test]
    fn test_task_count_rules() {
        let mut form = valid_form();
        form.total_tasks = "-1".to_string();
        assert_eq!(
            form.validate_on(today()).get("total_tasks").map(String::as_str),
            Some("Total tasks must be 0 or greater")
        );

        form.total_tasks = "5".to_string();
        form.completed_tasks = "-2".to_string();
        assert_eq!(
            form.validate_on(today()).get("completed_tasks").map(String::as_str),
            Some("Completed tasks must be 0 or greater")
        );

        form.completed_tasks = "6".to_string();
        assert_eq!(
            form.validate_on(today()).get("completed_tasks").map(String::as_str),
            Some("Completed tasks cannot exceed total tasks")
        );

        form.completed_tasks = "abc".to_string();
        assert_eq!(
            form.validate_on(today()).get("completed_tasks").map(String::as_str),
            Some("Must be a whole number")
        );

        form.completed_tasks = "5".to_string();
        assert!(form.validate_on(today()).is_empty());
    }

    #[test]
    fn test_completed_without_total_is_rejected() {
        let mut form = valid_form();
        form.completed_tasks = "5".to_string();
        assert_eq!(
            form.validate_on(today()).get("completed_tasks").map(String::as_str),
            Some("Completed tasks cannot exceed total tasks")
        );
        assert!(form.submit_on(today()).is_err());

        form.completed_tasks = "0".to_string();
        assert!(form.validate_on(today()).is_empty());
    }

    #[test]
    fn test_submit_builds_input() {
        let mut form = valid_form();
        form.description = "  ".to_string();
        form.manager = "Manager A".to_string();
        form.end_date = "in 3d".to_string();
        form.total_tasks = "4".to_string();

        let input = form.submit_on(today()).unwrap();
        assert_eq!(input.name, "Demo");
        assert_eq!(input.description, None);
        assert_eq!(input.manager.as_deref(), Some("Manager A"));
        assert_eq!(input.due_date, NaiveDate::from_ymd_opt(2026, 1, 4));
        assert_eq!(input.start_date, None);
        assert_eq!(input.total_tasks, Some(4));
        assert_eq!(input.completed_tasks, None);
        assert_eq!(input.assignees, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_submit_rejects_invalid_form() {
        let err = ProjectForm::default().submit_on(today()).unwrap_err();
        match err {
            AppError::Validation { errors } => assert!(errors.contains_key("name")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_edit_form_round_trips_codes() {
        let project = &seed_projects()[0];
        let form = ProjectForm::from_project(project);
        assert_eq!(form.end_date, "2026-02-20");
        assert_eq!(form.start_date, "");
        assert_eq!(form.total_tasks, "10");
        assert_eq!(form.completed_tasks, "6");
        assert!(form.validate_on(today()).is_empty());
        let input = form.submit_on(today()).unwrap();
        let codes: Vec<String> = input.assignees.iter().map(|a| assignee_code(a)).collect();
        assert_eq!(codes, project.assignees);
    }

    #[test]
    fn test_toggle_assignee_matches_name_or_code() {
        let mut form = valid_form();
        form.toggle_assignee("Alice");
        assert_eq!(form.assignees, vec!["Bob"]);
        form.toggle_assignee("Charlie");
        assert!(form.has_assignee("Charlie"));

        form.assignees = vec!["EM".to_string()];
        assert!(form.has_assignee("Emma"));
        form.toggle_assignee("Emma");
        assert!(form.assignees.is_empty());
    }

    #[test]
    fn test_task_form_validation() {
        let errors = TaskForm::default().validate();
        assert_eq!(errors.get("name").map(String::as_str), Some("Task name is required"));
        assert_eq!(errors.get("assigned_user").map(String::as_str), Some("Please assign a user"));

        let form = TaskForm {
            name: " Design ".to_string(),
            assigned_user: "Alice".to_string(),
            ..TaskForm::default()
        };
        let input = form.submit().unwrap();
        assert_eq!(input.name, "Design");
        assert_eq!(input.status, TaskStatus::Todo);
        assert_eq!(input.description, None);
    }
}

//! Project form handling for the terminal user interface.
//!
//! Text fields are edited through `InputField`s; the team, manager, status and
//! priority are selectors. Validation and conversion are delegated to
//! `forms::ProjectForm` so the dashboard and the shell apply the same rules.

use crate::errors::{AppError, FieldErrors};
use crate::fields::{Priority, ProjectStatus};
use crate::forms::ProjectForm;
use crate::project::{assignee_code, Project, ProjectInput, MANAGERS, TEAM_MEMBERS};
use crate::tui::input::InputField;
use crate::tui::utils::cycle_index;

/// Global order constants for the project form fields.
pub const NAME_GLOBAL_ORDER: usize = 0;
pub const DESCRIPTION_GLOBAL_ORDER: usize = 1;
pub const START_DATE_GLOBAL_ORDER: usize = 2;
pub const END_DATE_GLOBAL_ORDER: usize = 3;
pub const TEAM_GLOBAL_ORDER: usize = 4;
pub const MANAGER_GLOBAL_ORDER: usize = 5;
pub const STATUS_GLOBAL_ORDER: usize = 6;
pub const PRIORITY_GLOBAL_ORDER: usize = 7;
pub const TOTAL_TASKS_GLOBAL_ORDER: usize = 8;
pub const COMPLETED_TASKS_GLOBAL_ORDER: usize = 9;
const FIELD_COUNT: usize = 10;

/// Form error key for each field, as produced by `ProjectForm::validate`.
pub fn error_key(field: usize) -> Option<&'static str> {
    match field {
        NAME_GLOBAL_ORDER => Some("name"),
        START_DATE_GLOBAL_ORDER => Some("start_date"),
        END_DATE_GLOBAL_ORDER => Some("end_date"),
        TEAM_GLOBAL_ORDER => Some("assignees"),
        TOTAL_TASKS_GLOBAL_ORDER => Some("total_tasks"),
        COMPLETED_TASKS_GLOBAL_ORDER => Some("completed_tasks"),
        _ => None,
    }
}

/// Create/edit project form state.
pub struct ProjectFormState {
    pub editing: Option<u64>,
    pub name: InputField,
    pub description: InputField,
    pub start_date: InputField,
    pub end_date: InputField,
    pub total_tasks: InputField,
    pub completed_tasks: InputField,
    /// Selected team members, as full names or codes.
    pub assignees: Vec<String>,
    /// Highlighted entry in the team member list.
    pub team_cursor: usize,
    /// 0 is "no manager", then one entry per `MANAGERS`.
    pub manager: usize,
    pub status: usize,
    pub priority: usize,
    pub current_field: usize,
    pub errors: FieldErrors,
}

impl ProjectFormState {
    /// Empty form for a new project.
    pub fn new() -> Self {
        let defaults = ProjectForm::default();
        let mut state = Self {
            editing: None,
            name: InputField::new(),
            description: InputField::new(),
            start_date: InputField::new(),
            end_date: InputField::new(),
            total_tasks: InputField::new(),
            completed_tasks: InputField::new(),
            assignees: Vec::new(),
            team_cursor: 0,
            manager: 0,
            status: index_of(&ProjectStatus::ALL, defaults.status),
            priority: index_of(&Priority::ALL, defaults.priority),
            current_field: NAME_GLOBAL_ORDER,
            errors: FieldErrors::new(),
        };
        state.update_active_field();
        state
    }

    /// Form pre-filled from an existing project.
    pub fn from_project(project: &Project) -> Self {
        let form = ProjectForm::from_project(project);
        let mut state = Self::new();
        state.editing = Some(project.id);
        state.name = InputField::with_value(&form.name);
        state.description = InputField::with_value(&form.description);
        state.start_date = InputField::with_value(&form.start_date);
        state.end_date = InputField::with_value(&form.end_date);
        state.total_tasks = InputField::with_value(&form.total_tasks);
        state.completed_tasks = InputField::with_value(&form.completed_tasks);
        state.assignees = form.assignees;
        state.manager = MANAGERS
            .iter()
            .position(|m| *m == form.manager)
            .map(|i| i + 1)
            .unwrap_or(0);
        state.status = index_of(&ProjectStatus::ALL, form.status);
        state.priority = index_of(&Priority::ALL, form.priority);
        state.update_active_field();
        state
    }

    /// Collect the raw values into a `ProjectForm`.
    pub fn to_form(&self) -> ProjectForm {
        ProjectForm {
            name: self.name.value.clone(),
            description: self.description.value.clone(),
            start_date: self.start_date.value.clone(),
            end_date: self.end_date.value.clone(),
            assignees: self.assignees.clone(),
            manager: self.manager_name().unwrap_or_default().to_string(),
            status: ProjectStatus::ALL[self.status],
            priority: Priority::ALL[self.priority],
            total_tasks: self.total_tasks.value.clone(),
            completed_tasks: self.completed_tasks.value.clone(),
        }
    }

    /// Validate the form. Field errors are kept for display.
    pub fn submit(&mut self) -> Result<ProjectInput, AppError> {
        let result = self.to_form().submit();
        self.errors = match &result {
            Err(AppError::Validation { errors }) => errors.clone(),
            _ => FieldErrors::new(),
        };
        result
    }

    pub fn manager_name(&self) -> Option<&'static str> {
        self.manager.checked_sub(1).and_then(|i| MANAGERS.get(i).copied())
    }

    pub fn status_value(&self) -> ProjectStatus {
        ProjectStatus::ALL[self.status]
    }

    pub fn priority_value(&self) -> Priority {
        Priority::ALL[self.priority]
    }

    /// Whether the team member at `index` of `TEAM_MEMBERS` is selected.
    pub fn is_selected(&self, index: usize) -> bool {
        let Some(name) = TEAM_MEMBERS.get(index) else {
            return false;
        };
        let code = assignee_code(name);
        self.assignees.iter().any(|a| a == name || *a == code)
    }

    /// Assignees that are not one of the listed team members, such as the
    /// codes carried by the example projects.
    pub fn other_assignees(&self) -> Vec<&str> {
        self.assignees
            .iter()
            .filter(|a| {
                !TEAM_MEMBERS
                    .iter()
                    .any(|m| *m == a.as_str() || assignee_code(m) == **a)
            })
            .map(String::as_str)
            .collect()
    }

    /// Toggle the highlighted team member.
    pub fn toggle_team_member(&mut self) {
        let mut form = self.to_form();
        form.toggle_assignee(TEAM_MEMBERS[self.team_cursor]);
        self.assignees = form.assignees;
    }

    /// Move to the next field in the form.
    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_COUNT;
        self.update_active_field();
    }

    /// Move to the previous field in the form.
    pub fn prev_field(&mut self) {
        self.current_field = cycle_index(self.current_field, FIELD_COUNT, false);
        self.update_active_field();
    }

    fn update_active_field(&mut self) {
        let current = self.current_field;
        for (order, field) in self.text_fields_mut() {
            field.active = order == current;
        }
    }

    fn text_fields_mut(&mut self) -> [(usize, &mut InputField); 6] {
        [
            (NAME_GLOBAL_ORDER, &mut self.name),
            (DESCRIPTION_GLOBAL_ORDER, &mut self.description),
            (START_DATE_GLOBAL_ORDER, &mut self.start_date),
            (END_DATE_GLOBAL_ORDER, &mut self.end_date),
            (TOTAL_TASKS_GLOBAL_ORDER, &mut self.total_tasks),
            (COMPLETED_TASKS_GLOBAL_ORDER, &mut self.completed_tasks),
        ]
    }

    fn current_input(&mut self) -> Option<&mut InputField> {
        match self.current_field {
            NAME_GLOBAL_ORDER => Some(&mut self.name),
            DESCRIPTION_GLOBAL_ORDER => Some(&mut self.description),
            START_DATE_GLOBAL_ORDER => Some(&mut self.start_date),
            END_DATE_GLOBAL_ORDER => Some(&mut self.end_date),
            TOTAL_TASKS_GLOBAL_ORDER => Some(&mut self.total_tasks),
            COMPLETED_TASKS_GLOBAL_ORDER => Some(&mut self.completed_tasks),
            _ => None,
        }
    }

    /// Handle character input for the current field. Space toggles a team member.
    pub fn handle_char(&mut self, c: char) {
        if self.current_field == TEAM_GLOBAL_ORDER {
            if c == ' ' {
                self.toggle_team_member();
            }
            return;
        }
        if let Some(field) = self.current_input() {
            field.handle_char(c);
        }
    }

    pub fn handle_backspace(&mut self) {
        if let Some(field) = self.current_input() {
            field.handle_backspace();
        }
    }

    pub fn handle_delete(&mut self) {
        if let Some(field) = self.current_input() {
            field.handle_delete();
        }
    }

    /// Handle left/right arrow keys for cursor movement or selector changes.
    pub fn handle_left_right(&mut self, right: bool) {
        match self.current_field {
            TEAM_GLOBAL_ORDER => self.team_cursor = cycle_index(self.team_cursor, TEAM_MEMBERS.len(), right),
            MANAGER_GLOBAL_ORDER => self.manager = cycle_index(self.manager, MANAGERS.len() + 1, right),
            STATUS_GLOBAL_ORDER => self.status = cycle_index(self.status, ProjectStatus::ALL.len(), right),
            PRIORITY_GLOBAL_ORDER => self.priority = cycle_index(self.priority, Priority::ALL.len(), right),
            _ => {
                if let Some(field) = self.current_input() {
                    if right {
                        field.move_cursor_right()
                    } else {
                        field.move_cursor_left()
                    }
                }
            }
        }
    }

    /// Error message for a field, if the last submit rejected it.
    pub fn error_for(&self, field: usize) -> Option<&str> {
        error_key(field).and_then(|key| self.errors.get(key)).map(String::as_str)
    }
}

impl Default for ProjectFormState {
    fn default() -> Self {
        Self::new()
    }
}

fn index_of<T: PartialEq>(options: &[T], value: T) -> usize {
    options.iter().position(|o| *o == value).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::seed_projects;

    fn type_text(form: &mut ProjectFormState, text: &str) {
        for c in text.chars() {
            form.handle_char(c);
        }
    }

    #[test]
    fn test_new_form_defaults() {
        let form = ProjectFormState::new();
        assert_eq!(form.status_value(), ProjectStatus::Planned);
        assert_eq!(form.priority_value(), Priority::Medium);
        assert_eq!(form.manager_name(), None);
        assert!(form.name.active);
    }

    #[test]
    fn test_fill_and_submit() {
        let mut form = ProjectFormState::new();
        type_text(&mut form, "Demo");

        form.current_field = TEAM_GLOBAL_ORDER;
        form.handle_char(' ');
        form.handle_left_right(true);
        form.handle_char(' ');
        assert_eq!(form.assignees, vec!["Alice", "Bob"]);

        form.current_field = MANAGER_GLOBAL_ORDER;
        form.handle_left_right(true);
        form.current_field = PRIORITY_GLOBAL_ORDER;
        form.handle_left_right(false);

        let input = form.submit().unwrap();
        assert_eq!(input.name, "Demo");
        assert_eq!(input.manager.as_deref(), Some("Manager A"));
        assert_eq!(input.priority, Priority::Low);
        assert!(form.errors.is_empty());
    }

    #[test]
    fn test_submit_keeps_field_errors() {
        let mut form = ProjectFormState::new();
        assert!(form.submit().is_err());
        assert_eq!(form.error_for(NAME_GLOBAL_ORDER), Some("Project name is required"));
        assert_eq!(form.error_for(TEAM_GLOBAL_ORDER), Some("Select at least one team member"));
        assert_eq!(form.error_for(STATUS_GLOBAL_ORDER), None);
    }

    #[test]
    fn test_edit_form_prefills_project() {
        let project = &seed_projects()[0];
        let form = ProjectFormState::from_project(project);
        assert_eq!(form.editing, Some(1));
        assert_eq!(form.name.value, "Website Redesign");
        assert_eq!(form.end_date.value, "2026-02-20");
        assert_eq!(form.status_value(), ProjectStatus::InProgress);
        assert_eq!(form.priority_value(), Priority::High);
        assert_eq!(form.total_tasks.value, "10");
        assert_eq!(form.other_assignees(), vec!["SS", "AK", "RM", "JP"]);
    }

    #[test]
    fn test_codes_match_team_members() {
        let mut form = ProjectFormState::new();
        form.assignees = vec!["AL".to_string(), "ZZ".to_string()];
        assert!(form.is_selected(0));
        assert!(!form.is_selected(1));
        assert_eq!(form.other_assignees(), vec!["ZZ"]);

        form.current_field = TEAM_GLOBAL_ORDER;
        form.handle_char(' ');
        assert_eq!(form.assignees, vec!["ZZ"]);
    }

    #[test]
    fn test_field_navigation_wraps() {
        let mut form = ProjectFormState::new();
        form.prev_field();
        assert_eq!(form.current_field, COMPLETED_TASKS_GLOBAL_ORDER);
        assert!(form.completed_tasks.active);
        assert!(!form.name.active);
        form.next_field();
        assert_eq!(form.current_field, NAME_GLOBAL_ORDER);
    }
}

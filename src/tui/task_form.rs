//! Task modal handling for the terminal user interface.

use crate::errors::{AppError, FieldErrors};
use crate::fields::TaskStatus;
use crate::forms::TaskForm;
use crate::project::{assignee_code, Project, TEAM_MEMBERS};
use crate::task::TaskInput;
use crate::tui::input::InputField;
use crate::tui::utils::cycle_index;

pub const NAME_GLOBAL_ORDER: usize = 0;
pub const DESCRIPTION_GLOBAL_ORDER: usize = 1;
pub const ASSIGNEE_GLOBAL_ORDER: usize = 2;
pub const STATUS_GLOBAL_ORDER: usize = 3;
const FIELD_COUNT: usize = 4;

/// Add-task modal state for one project.
pub struct TaskFormState {
    pub project_id: u64,
    pub name: InputField,
    pub description: InputField,
    /// Users offered for assignment. Index 0 of `assignee` means none chosen.
    pub users: Vec<String>,
    pub assignee: usize,
    pub status: usize,
    pub current_field: usize,
    pub errors: FieldErrors,
}

impl TaskFormState {
    pub fn for_project(project: &Project) -> Self {
        let mut name = InputField::new();
        name.active = true;
        Self {
            project_id: project.id,
            name,
            description: InputField::new(),
            users: assignable_users(project),
            assignee: 0,
            status: 0,
            current_field: NAME_GLOBAL_ORDER,
            errors: FieldErrors::new(),
        }
    }

    pub fn selected_user(&self) -> Option<&str> {
        self.assignee
            .checked_sub(1)
            .and_then(|i| self.users.get(i))
            .map(String::as_str)
    }

    pub fn status_value(&self) -> TaskStatus {
        TaskStatus::ALL[self.status]
    }

    pub fn to_form(&self) -> TaskForm {
        TaskForm {
            name: self.name.value.clone(),
            description: self.description.value.clone(),
            assigned_user: self.selected_user().unwrap_or_default().to_string(),
            status: self.status_value(),
        }
    }

    /// Validate the modal. Field errors are kept for display.
    pub fn submit(&mut self) -> Result<TaskInput, AppError> {
        let result = self.to_form().submit();
        self.errors = match &result {
            Err(AppError::Validation { errors }) => errors.clone(),
            _ => FieldErrors::new(),
        };
        result
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_COUNT;
        self.update_active_field();
    }

    pub fn prev_field(&mut self) {
        self.current_field = cycle_index(self.current_field, FIELD_COUNT, false);
        self.update_active_field();
    }

    fn update_active_field(&mut self) {
        self.name.active = self.current_field == NAME_GLOBAL_ORDER;
        self.description.active = self.current_field == DESCRIPTION_GLOBAL_ORDER;
    }

    fn current_input(&mut self) -> Option<&mut InputField> {
        match self.current_field {
            NAME_GLOBAL_ORDER => Some(&mut self.name),
            DESCRIPTION_GLOBAL_ORDER => Some(&mut self.description),
            _ => None,
        }
    }

    pub fn handle_char(&mut self, c: char) {
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
            ASSIGNEE_GLOBAL_ORDER => self.assignee = cycle_index(self.assignee, self.users.len() + 1, right),
            STATUS_GLOBAL_ORDER => self.status = cycle_index(self.status, TaskStatus::ALL.len(), right),
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

    pub fn error_for(&self, field: usize) -> Option<&str> {
        let key = match field {
            NAME_GLOBAL_ORDER => "name",
            ASSIGNEE_GLOBAL_ORDER => "assigned_user",
            _ => return None,
        };
        self.errors.get(key).map(String::as_str)
    }
}

/// Users offered in the modal: the project's assignees, shown by full name
/// where the code belongs to a known team member.
pub fn assignable_users(project: &Project) -> Vec<String> {
    if project.assignees.is_empty() {
        return TEAM_MEMBERS.iter().map(|m| m.to_string()).collect();
    }
    project
        .assignees
        .iter()
        .map(|code| {
            TEAM_MEMBERS
                .iter()
                .find(|m| assignee_code(m) == *code)
                .map(|m| m.to_string())
                .unwrap_or_else(|| code.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{Priority, ProjectStatus};
    use crate::project::{seed_projects, ProjectInput};
    use crate::store::ProjectStore;

    #[test]
    fn test_assignable_users_prefer_full_names() {
        let mut store = ProjectStore::new(Vec::new());
        let project = store.create(ProjectInput::new(
            "Demo",
            &["Alice", "Frank"],
            ProjectStatus::Planned,
            Priority::Low,
        ));
        assert_eq!(assignable_users(&project), vec!["Alice", "Frank"]);
        assert_eq!(assignable_users(&seed_projects()[1]), vec!["SS", "AK"]);
    }

    #[test]
    fn test_user_is_required() {
        let project = &seed_projects()[0];
        let mut form = TaskFormState::for_project(project);
        for c in "Design".chars() {
            form.handle_char(c);
        }
        assert!(form.submit().is_err());
        assert_eq!(form.error_for(ASSIGNEE_GLOBAL_ORDER), Some("Please assign a user"));
        assert_eq!(form.error_for(NAME_GLOBAL_ORDER), None);

        form.current_field = ASSIGNEE_GLOBAL_ORDER;
        form.handle_left_right(true);
        form.current_field = STATUS_GLOBAL_ORDER;
        form.handle_left_right(false);

        let input = form.submit().unwrap();
        assert_eq!(input.name, "Design");
        assert_eq!(input.assigned_user, "SS");
        assert_eq!(input.status, TaskStatus::Done);
        assert!(form.errors.is_empty());
    }

    #[test]
    fn test_selector_wraps_through_none() {
        let project = &seed_projects()[1];
        let mut form = TaskFormState::for_project(project);
        form.current_field = ASSIGNEE_GLOBAL_ORDER;
        form.handle_left_right(false);
        assert_eq!(form.selected_user(), Some("AK"));
        form.handle_left_right(true);
        assert_eq!(form.selected_user(), None);
    }
}

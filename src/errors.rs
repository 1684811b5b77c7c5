//! Error types for the collaborators around the store.
//!
//! The store itself never fails: lookups that miss return `None`/`false`.
//! Errors only arise at the edges: user-typed identifiers, form submission,
//! the settings file and terminal I/O.

use std::collections::BTreeMap;

/// Field name -> message, as produced by form validation.
pub type FieldErrors = BTreeMap<&'static str, String>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No project found matching '{identifier}'")]
    ProjectNotFound { identifier: String },

    #[error("Multiple projects named '{identifier}': ids {ids}. Please use the id instead.")]
    AmbiguousProject { identifier: String, ids: String },

    #[error("Task {task_id} not found in project {project_id}")]
    TaskNotFound { project_id: u64, task_id: u64 },

    #[error("Invalid input: {}", format_field_errors(.errors))]
    Validation { errors: FieldErrors },

    #[error("{message}")]
    Command { message: String },

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl AppError {
    /// Error code for programmatic handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::ProjectNotFound { .. } => "PROJECT_NOT_FOUND",
            AppError::AmbiguousProject { .. } => "PROJECT_AMBIGUOUS",
            AppError::TaskNotFound { .. } => "TASK_NOT_FOUND",
            AppError::Validation { .. } => "VALIDATION_FAILED",
            AppError::Command { .. } => "COMMAND_INVALID",
            AppError::Settings(e) => e.error_code(),
            AppError::Io { .. } => "IO_ERROR",
        }
    }

    /// Whether the error was caused by what the user typed.
    pub fn is_user_error(&self) -> bool {
        match self {
            AppError::ProjectNotFound { .. }
            | AppError::AmbiguousProject { .. }
            | AppError::TaskNotFound { .. }
            | AppError::Validation { .. }
            | AppError::Command { .. } => true,

            AppError::Settings(_) | AppError::Io { .. } => false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to parse settings file '{path}': {message}")]
    Parse { path: String, message: String },

    #[error("Failed to write settings file '{path}': {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

impl SettingsError {
    pub fn error_code(&self) -> &'static str {
        match self {
            SettingsError::Parse { .. } => "SETTINGS_PARSE_ERROR",
            SettingsError::Write { .. } => "SETTINGS_WRITE_ERROR",
        }
    }
}

/// Render field errors as `field: message; field: message`.
pub fn format_field_errors(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let mut errors = FieldErrors::new();
        errors.insert("name", "Project name is required".to_string());
        errors.insert("assignees", "Select at least one team member".to_string());
        let error = AppError::Validation { errors };
        assert_eq!(
            error.to_string(),
            "Invalid input: assignees: Select at least one team member; name: Project name is required"
        );
        assert_eq!(error.error_code(), "VALIDATION_FAILED");
        assert!(error.is_user_error());
    }

    #[test]
    fn test_project_not_found_display() {
        let error = AppError::ProjectNotFound { identifier: "42".to_string() };
        assert_eq!(error.to_string(), "No project found matching '42'");
        assert_eq!(error.error_code(), "PROJECT_NOT_FOUND");
    }

    #[test]
    fn test_settings_error_is_not_user_error() {
        let error: AppError = SettingsError::Parse {
            path: "settings.json".to_string(),
            message: "expected value".to_string(),
        }
        .into();
        assert_eq!(error.error_code(), "SETTINGS_PARSE_ERROR");
        assert!(!error.is_user_error());
    }
}

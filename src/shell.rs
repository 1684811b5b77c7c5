//! Line-oriented command shell over the in-memory store.
//!
//! Each input line is split into words (single or double quotes group words)
//! and parsed with clap, so the shell gets the same argument handling and help
//! output as the top-level CLI. State lives only as long as the shell session.

use std::io::{BufRead, Write};

use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::board::{Board, TaskFilter};
use crate::display::*;
use crate::errors::AppError;
use crate::fields::{Priority, ProjectStatus, TaskStatus};
use crate::forms::{ProjectForm, TaskForm};
use crate::settings::{Preferences, ThemeAction};
use crate::stats::{ProjectFilter, Stats};
use crate::store::ProjectStore;

const PROMPT: &str = "pd> ";

#[derive(Parser)]
#[command(name = "", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand)]
pub enum ShellCommand {
    /// List projects with optional filters.
    Projects {
        /// Case-insensitive search on the project name.
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum)]
        status: Option<ProjectStatus>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
    },

    /// View a single project by ID or name.
    View {
        project: String,
    },

    /// Create a new project.
    AddProject {
        name: String,
        /// Team member full name. May be repeated.
        #[arg(long = "assignee")]
        assignees: Vec<String>,
        #[arg(long)]
        desc: Option<String>,
        /// Start date: YYYY-MM-DD, "today", "tomorrow", or "in Nd".
        #[arg(long)]
        start: Option<String>,
        /// End date: YYYY-MM-DD, "today", "tomorrow", or "in Nd".
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        manager: Option<String>,
        #[arg(long, value_enum, default_value_t = ProjectStatus::Planned)]
        status: ProjectStatus,
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Initial total task count, kept until the first task is added.
        #[arg(long, allow_hyphen_values = true)]
        total: Option<String>,
        /// Initial completed task count, kept until the first task is added.
        #[arg(long, allow_hyphen_values = true)]
        completed: Option<String>,
    },

    /// Edit a project. Fields not given keep their current value.
    EditProject {
        project: String,
        #[arg(long)]
        name: Option<String>,
        /// Replace the team. May be repeated.
        #[arg(long = "assignee")]
        assignees: Vec<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        manager: Option<String>,
        #[arg(long, value_enum)]
        status: Option<ProjectStatus>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        #[arg(long, allow_hyphen_values = true)]
        total: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        completed: Option<String>,
    },

    /// Delete a project by ID or name.
    DeleteProject {
        project: String,
    },

    /// Add a task to a project.
    AddTask {
        project: String,
        name: String,
        /// Full name of the assigned user.
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, value_enum, default_value_t = TaskStatus::Todo)]
        status: TaskStatus,
    },

    /// Change the status of a task.
    SetStatus {
        project: String,
        task: u64,
        #[arg(value_enum)]
        status: TaskStatus,
    },

    /// Delete a task from a project.
    DeleteTask {
        project: String,
        task: u64,
    },

    /// Show every task on a board grouped by status.
    Tasks {
        /// Case-insensitive search on task name or assigned user.
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum)]
        status: Option<TaskStatus>,
        /// Only tasks of this project (ID or name).
        #[arg(long)]
        project: Option<String>,
    },

    /// Show dashboard statistics.
    Stats,

    /// Show the progress chart and status distribution.
    Chart,

    /// Show or change the colour theme.
    Theme {
        #[arg(value_enum, default_value_t = ThemeAction::Show)]
        action: ThemeAction,
    },

    /// Leave the shell.
    #[command(alias = "exit")]
    Quit,
}

/// Whether the shell should keep reading lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Split a command line into words. Quotes group words; `#` starts a comment.
pub fn split_words(line: &str) -> Result<Vec<String>, AppError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    in_word = true;
                }
                '#' if !in_word => break,
                c if c.is_whitespace() => {
                    if in_word {
                        words.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                c => {
                    current.push(c);
                    in_word = true;
                }
            },
        }
    }

    if quote.is_some() {
        return Err(AppError::Command { message: "Unterminated quote".to_string() });
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// Parse and execute one line, writing its output to `out`.
pub fn run_line(
    store: &mut ProjectStore,
    prefs: &mut Preferences,
    line: &str,
    out: &mut dyn Write,
) -> Result<Flow, AppError> {
    let words = split_words(line)?;
    if words.is_empty() {
        return Ok(Flow::Continue);
    }
    debug!(event = "shell.command", command = %words[0]);

    let parsed = match ShellLine::try_parse_from(&words) {
        Ok(parsed) => parsed,
        Err(e) => {
            use clap::error::ErrorKind;
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand) {
                write!(out, "{}", e.render())?;
                return Ok(Flow::Continue);
            }
            return Err(AppError::Command { message: e.render().to_string().trim_end().to_string() });
        }
    };

    execute(store, prefs, parsed.command, out)
}

/// Execute a parsed shell command.
pub fn execute(
    store: &mut ProjectStore,
    prefs: &mut Preferences,
    command: ShellCommand,
    out: &mut dyn Write,
) -> Result<Flow, AppError> {
    let today = Local::now().date_naive();

    match command {
        ShellCommand::Projects { search, status, priority } => {
            let filter = ProjectFilter { search: search.unwrap_or_default(), status, priority };
            let shown = filter.apply(store.projects());
            writeln!(out, "Showing {} of {} projects", shown.len(), store.projects().len())?;
            write!(out, "{}", render_project_table(&shown, today))?;
        }

        ShellCommand::View { project } => {
            let id = store.resolve(&project)?;
            if let Some(project) = store.get(id) {
                write!(out, "{}", render_project_detail(project))?;
            }
        }

        ShellCommand::AddProject {
            name,
            assignees,
            desc,
            start,
            end,
            manager,
            status,
            priority,
            total,
            completed,
        } => {
            let form = ProjectForm {
                name,
                description: desc.unwrap_or_default(),
                start_date: start.unwrap_or_default(),
                end_date: end.unwrap_or_default(),
                assignees,
                manager: manager.unwrap_or_default(),
                status,
                priority,
                total_tasks: total.unwrap_or_default(),
                completed_tasks: completed.unwrap_or_default(),
            };
            let project = store.create(form.submit()?);
            writeln!(out, "Created project {} ({})", project.id, project.name)?;
        }

        ShellCommand::EditProject {
            project,
            name,
            assignees,
            desc,
            start,
            end,
            manager,
            status,
            priority,
            total,
            completed,
        } => {
            let id = store.resolve(&project)?;
            let Some(current) = store.get(id) else {
                return Err(AppError::ProjectNotFound { identifier: project });
            };
            let mut form = ProjectForm::from_project(current);
            if let Some(v) = name {
                form.name = v;
            }
            if !assignees.is_empty() {
                form.assignees = assignees;
            }
            if let Some(v) = desc {
                form.description = v;
            }
            if let Some(v) = start {
                form.start_date = v;
            }
            if let Some(v) = end {
                form.end_date = v;
            }
            if let Some(v) = manager {
                form.manager = v;
            }
            if let Some(v) = status {
                form.status = v;
            }
            if let Some(v) = priority {
                form.priority = v;
            }
            if let Some(v) = total {
                form.total_tasks = v;
            }
            if let Some(v) = completed {
                form.completed_tasks = v;
            }

            let input = form.submit()?;
            store.update(id, input);
            writeln!(out, "Updated project {}", id)?;
        }

        ShellCommand::DeleteProject { project } => {
            let id = store.resolve(&project)?;
            store.delete(id);
            writeln!(out, "Deleted project {}", id)?;
        }

        ShellCommand::AddTask { project, name, user, desc, status } => {
            let id = store.resolve(&project)?;
            let form = TaskForm {
                name,
                description: desc.unwrap_or_default(),
                assigned_user: user.unwrap_or_default(),
                status,
            };
            let input = form.submit()?;
            if let Some(task_id) = store.add_task(id, input) {
                writeln!(out, "Added task {} to project {}", task_id, id)?;
            }
        }

        ShellCommand::SetStatus { project, task, status } => {
            let id = store.resolve(&project)?;
            if !store.update_task_status(id, task, status) {
                return Err(AppError::TaskNotFound { project_id: id, task_id: task });
            }
            writeln!(out, "Task {} is now {}", task, format_task_status(status))?;
        }

        ShellCommand::DeleteTask { project, task } => {
            let id = store.resolve(&project)?;
            if !store.delete_task(id, task) {
                return Err(AppError::TaskNotFound { project_id: id, task_id: task });
            }
            writeln!(out, "Deleted task {} from project {}", task, id)?;
        }

        ShellCommand::Tasks { search, status, project } => {
            let project_id = match project {
                Some(p) => Some(store.resolve(&p)?),
                None => None,
            };
            let filter = TaskFilter { search: search.unwrap_or_default(), status, project_id };
            let board = Board::build(store.projects(), &filter);
            write!(out, "{}", render_board(&board))?;
        }

        ShellCommand::Stats => {
            write!(out, "{}", render_stats(&Stats::compute(store.projects())))?;
        }

        ShellCommand::Chart => {
            write!(out, "{}", render_charts(store.projects()))?;
        }

        ShellCommand::Theme { action } => {
            let theme = prefs.apply(action)?;
            writeln!(out, "Theme: {}", theme.as_str())?;
        }

        ShellCommand::Quit => return Ok(Flow::Quit),
    }

    Ok(Flow::Continue)
}

/// Read lines from `input` until it ends or `quit` is entered.
///
/// Interactive sessions print a prompt and report errors without stopping;
/// scripts stop at the first failing line.
pub fn run_shell<R: BufRead, W: Write>(
    store: &mut ProjectStore,
    prefs: &mut Preferences,
    input: R,
    out: &mut W,
    interactive: bool,
) -> Result<(), AppError> {
    if interactive {
        write!(out, "{PROMPT}")?;
        out.flush()?;
    }

    for (number, line) in input.lines().enumerate() {
        let line = line?;
        match run_line(store, prefs, &line, out) {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(e) if interactive && e.is_user_error() => {
                writeln!(out, "Error: {e}")?;
            }
            Err(e) => {
                debug!(event = "shell.line_failed", line = number + 1, code = e.error_code());
                return Err(e);
            }
        }
        if interactive {
            write!(out, "{PROMPT}")?;
            out.flush()?;
        }
    }
    Ok(())
}

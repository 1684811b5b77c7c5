//! Text formatting for the command shell.
//!
//! Every renderer returns a `String` so the shell can write it to any sink.

use std::fmt::Write;

use chrono::{Local, NaiveDate, TimeZone, Utc};

use crate::board::Board;
use crate::dates::{format_date, format_due_relative};
use crate::fields::{Priority, ProjectStatus, TaskStatus};
use crate::project::Project;
use crate::stats::{progress_series, status_distribution, Stats};

/// Format a project status for display.
pub fn format_project_status(s: ProjectStatus) -> &'static str {
    match s {
        ProjectStatus::Planned => "Planned",
        ProjectStatus::InProgress => "In Progress",
        ProjectStatus::OnHold => "On Hold",
        ProjectStatus::Completed => "Completed",
    }
}

/// Format a priority for display.
pub fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::Low => "Low",
        Priority::Medium => "Medium",
        Priority::High => "High",
    }
}

/// Format a task status for display.
pub fn format_task_status(s: TaskStatus) -> &'static str {
    match s {
        TaskStatus::Todo => "Todo",
        TaskStatus::InProgress => "In Progress",
        TaskStatus::Done => "Done",
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

/// Assignee codes as shown in tables: the first three, then "+N".
pub fn format_assignees(assignees: &[String]) -> String {
    let mut shown = assignees.iter().take(3).cloned().collect::<Vec<_>>().join(" ");
    if assignees.len() > 3 {
        let _ = write!(shown, " +{}", assignees.len() - 3);
    }
    shown
}

/// A fixed-width text progress bar, e.g. `[######----]`.
pub fn progress_bar(percent: u32, width: usize) -> String {
    let filled = (percent.min(100) as usize * width + 50) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Local creation time of a task, from its UTC timestamp.
pub fn format_created(created_at_utc: i64) -> String {
    Utc.timestamp_opt(created_at_utc, 0)
        .single()
        .map(|d| d.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".into())
}

/// Render the project table.
pub fn render_project_table(projects: &[&Project], today: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<4} {:<20} {:<16} {:<11} {:<12} {:<7} {:<18} {}",
        "ID", "Name", "Progress", "Tasks", "Due", "Pri", "Status", "Team"
    );
    for p in projects {
        let pct = p.completion();
        let _ = writeln!(
            out,
            "{:<4} {:<20} {} {:>3}% {:<11} {:<12} {:<7} {:<18} {}",
            p.id,
            truncate(&p.name, 20),
            progress_bar(pct, 10),
            pct,
            format!("{}/{}", p.completed_tasks, p.total_tasks),
            format_due_relative(p.due_date, today),
            format_priority(p.priority),
            format_project_status(p.status),
            format_assignees(&p.assignees),
        );
    }
    out
}

/// Render the detail view of one project with its task list.
pub fn render_project_detail(project: &Project) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID:           {}", project.id);
    let _ = writeln!(out, "Name:         {}", project.name);
    let _ = writeln!(out, "Status:       {}", format_project_status(project.status));
    let _ = writeln!(out, "Priority:     {}", format_priority(project.priority));
    let _ = writeln!(out, "Manager:      {}", project.manager.as_deref().unwrap_or("-"));
    let _ = writeln!(out, "Team:         {}", if project.assignees.is_empty() { "-".into() } else { project.assignees.join(", ") });
    let _ = writeln!(out, "Start:        {}", format_date(project.start_date));
    let _ = writeln!(out, "Due:          {}", format_date(project.due_date));
    let _ = writeln!(
        out,
        "Progress:     {} {}% ({}/{} tasks)",
        progress_bar(project.completion(), 20),
        project.completion(),
        project.completed_tasks,
        project.total_tasks
    );
    let _ = writeln!(out, "Description:\n{}\n", project.description.as_deref().unwrap_or("-"));

    if project.tasks.is_empty() {
        let _ = writeln!(out, "Tasks: -");
        return out;
    }
    let _ = writeln!(out, "Tasks:");
    let _ = writeln!(out, "  {:<4} {:<12} {:<12} {:<20} {}", "ID", "Status", "Assigned", "Created", "Name");
    for t in &project.tasks {
        let _ = writeln!(
            out,
            "  {:<4} {:<12} {:<12} {:<20} {}",
            t.id,
            format_task_status(t.status),
            truncate(&t.assigned_user, 12),
            format_created(t.created_at_utc),
            t.name
        );
    }
    out
}

/// Render the Kanban board as three stacked columns.
pub fn render_board(board: &Board) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Showing {} of {} tasks", board.shown(), board.total);
    for status in TaskStatus::ALL {
        let column = board.column(status);
        let _ = writeln!(out, "\n{} ({})", format_task_status(status), column.len());
        if column.is_empty() {
            let _ = writeln!(out, "  -");
        }
        for t in column {
            let _ = writeln!(
                out,
                "  [{}#{}] {} - {} ({})",
                t.project_id, t.task.id, t.task.name, t.task.assigned_user, t.project_name
            );
        }
    }
    out
}

/// Render the headline dashboard numbers.
pub fn render_stats(stats: &Stats) -> String {
    format!(
        "Total Projects:   {}\nActive Projects:  {}\nCompleted Tasks:  {}\nPending Tasks:    {}\n",
        stats.total_projects, stats.active_projects, stats.completed_tasks, stats.pending_tasks
    )
}

/// Render the progress chart and the status distribution as text.
pub fn render_charts(projects: &[Project]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Project Progress (completed # / remaining -)");
    let series = progress_series(projects);
    let max = series
        .iter()
        .map(|b| b.completed + b.remaining)
        .max()
        .unwrap_or(0)
        .max(1);
    for bar in &series {
        let width = 30usize;
        let done = (bar.completed as usize * width) / max as usize;
        let left = (bar.remaining as usize * width) / max as usize;
        let _ = writeln!(
            out,
            "  {:<18} {}{} {}/{}",
            bar.label,
            "#".repeat(done),
            "-".repeat(left),
            bar.completed,
            bar.completed + bar.remaining
        );
    }

    let _ = writeln!(out, "\nProjects by Status");
    for (status, count) in status_distribution(projects) {
        let _ = writeln!(out, "  {:<12} {}", format_project_status(status), count);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::TaskFilter;
    use crate::project::seed_projects;
    use crate::store::ProjectStore;
    use crate::task::TaskInput;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Website Redesign", 8), "Website…");
    }

    #[test]
    fn test_format_assignees() {
        let codes: Vec<String> = ["SS", "AK", "RM", "JP"].iter().map(|s| s.to_string()).collect();
        assert_eq!(format_assignees(&codes), "SS AK RM +1");
        assert_eq!(format_assignees(&codes[..2]), "SS AK");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0, 10), "[----------]");
        assert_eq!(progress_bar(60, 10), "[######----]");
        assert_eq!(progress_bar(100, 4), "[####]");
    }

    #[test]
    fn test_render_project_table_lists_every_project() {
        let projects = seed_projects();
        let refs: Vec<&Project> = projects.iter().collect();
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let table = render_project_table(&refs, today);
        assert_eq!(table.lines().count(), 4);
        assert!(table.contains("Website Redesign"));
        assert!(table.contains("60%"));
        assert!(table.contains("12/12"));
        assert!(table.contains("In Progress"));
    }

    #[test]
    fn test_render_project_detail() {
        let mut store = ProjectStore::seeded();
        store.add_task(2, TaskInput::new("Release", "Emma", TaskStatus::Done));
        let detail = render_project_detail(store.get(2).unwrap());
        assert!(detail.contains("Name:         Mobile App"));
        assert!(detail.contains("100% (1/1 tasks)"));
        assert!(detail.contains("Release"));

        let empty = render_project_detail(store.get(3).unwrap());
        assert!(empty.contains("Tasks: -"));
        assert!(empty.contains("Due:          2026-03-10"));
    }

    #[test]
    fn test_render_board() {
        let mut store = ProjectStore::seeded();
        store.add_task(1, TaskInput::new("Design", "Alice", TaskStatus::InProgress));
        let text = render_board(&Board::build(store.projects(), &TaskFilter::default()));
        assert!(text.starts_with("Showing 1 of 1 tasks"));
        assert!(text.contains("In Progress (1)"));
        assert!(text.contains("[1#1] Design - Alice (Website Redesign)"));
        assert!(text.contains("Todo (0)"));
    }

    #[test]
    fn test_render_stats_and_charts() {
        let projects = seed_projects();
        let stats = render_stats(&Stats::compute(&projects));
        assert!(stats.contains("Total Projects:   3"));
        assert!(stats.contains("Pending Tasks:    10"));

        let charts = render_charts(&projects);
        assert!(charts.contains("Mobile App"));
        assert!(charts.contains("12/12"));
        assert!(charts.contains("Completed    1"));
    }
}

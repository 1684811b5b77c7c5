//! Dashboard statistics, chart series and project list filters.

use crate::fields::{Priority, ProjectStatus};
use crate::project::Project;

/// Headline numbers shown on the dashboard cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total_projects: usize,
    pub active_projects: usize,
    pub completed_tasks: u64,
    pub pending_tasks: u64,
}

impl Stats {
    pub fn compute(projects: &[Project]) -> Self {
        Stats {
            total_projects: projects.len(),
            active_projects: projects
                .iter()
                .filter(|p| p.status == ProjectStatus::InProgress)
                .count(),
            completed_tasks: projects.iter().map(|p| p.completed_tasks as u64).sum(),
            pending_tasks: projects.iter().map(|p| p.remaining_tasks() as u64).sum(),
        }
    }
}

/// Projects shown in the progress chart.
pub const PROGRESS_CHART_LIMIT: usize = 5;
/// Longest chart label before it is cut with "...".
pub const CHART_LABEL_WIDTH: usize = 15;

/// One bar group of the progress chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressBar {
    pub label: String,
    pub completed: u32,
    pub remaining: u32,
}

/// Completed vs remaining tasks for the first few projects.
pub fn progress_series(projects: &[Project]) -> Vec<ProgressBar> {
    projects
        .iter()
        .take(PROGRESS_CHART_LIMIT)
        .map(|p| ProgressBar {
            label: chart_label(&p.name),
            completed: p.completed_tasks,
            remaining: p.remaining_tasks(),
        })
        .collect()
}

/// Project count per status, in order of first appearance.
pub fn status_distribution(projects: &[Project]) -> Vec<(ProjectStatus, usize)> {
    let mut counts: Vec<(ProjectStatus, usize)> = Vec::new();
    for project in projects {
        match counts.iter_mut().find(|(s, _)| *s == project.status) {
            Some((_, n)) => *n += 1,
            None => counts.push((project.status, 1)),
        }
    }
    counts
}

fn chart_label(name: &str) -> String {
    if name.chars().count() > CHART_LABEL_WIDTH {
        format!("{}...", name.chars().take(CHART_LABEL_WIDTH).collect::<String>())
    } else {
        name.to_string()
    }
}

/// Search and dropdown filters of the projects page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    pub search: String,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
}

impl ProjectFilter {
    pub fn active_count(&self) -> usize {
        self.status.is_some() as usize + self.priority.is_some() as usize
    }

    pub fn clear(&mut self) {
        self.status = None;
        self.priority = None;
    }

    pub fn matches(&self, project: &Project) -> bool {
        project.name.to_lowercase().contains(&self.search.to_lowercase())
            && self.status.map_or(true, |s| project.status == s)
            && self.priority.map_or(true, |p| project.priority == p)
    }

    pub fn apply<'a>(&self, projects: &'a [Project]) -> Vec<&'a Project> {
        projects.iter().filter(|p| self.matches(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::TaskStatus;
    use crate::project::{seed_projects, ProjectInput};
    use crate::store::ProjectStore;
    use crate::task::TaskInput;

    #[test]
    fn test_stats_for_seed() {
        let stats = Stats::compute(&seed_projects());
        assert_eq!(
            stats,
            Stats { total_projects: 3, active_projects: 1, completed_tasks: 20, pending_tasks: 10 }
        );
    }

    #[test]
    fn test_stats_follow_task_mutations() {
        let mut store = ProjectStore::seeded();
        store.add_task(1, TaskInput::new("Design", "Alice", TaskStatus::Done));
        let stats = Stats::compute(store.projects());
        assert_eq!(stats.completed_tasks, 12 + 2 + 1);
        assert_eq!(stats.pending_tasks, 6);
        assert_eq!(Stats::compute(&[]), Stats::default());
    }

    #[test]
    fn test_progress_series_limits_and_truncates() {
        let mut store = ProjectStore::seeded();
        for name in ["Data Warehouse Migration", "Four", "Five", "Six"] {
            store.create(ProjectInput::new(name, &["Alice"], ProjectStatus::Planned, Priority::Low));
        }
        let series = progress_series(store.projects());
        assert_eq!(series.len(), 5);
        assert_eq!(series[0], ProgressBar { label: "Website Redesig...".to_string(), completed: 6, remaining: 4 });
        assert_eq!(series[3].label, "Data Warehouse ...");
        assert_eq!(series[4].label, "Four");
    }

    #[test]
    fn test_chart_label_boundary() {
        assert_eq!(chart_label("Website Redesig"), "Website Redesig");
        assert_eq!(chart_label("Website Redesign"), "Website Redesig...");
    }

    #[test]
    fn test_status_distribution_first_appearance_order() {
        let mut store = ProjectStore::seeded();
        store.create(ProjectInput::new("Ops", &["Bob"], ProjectStatus::InProgress, Priority::Low));
        assert_eq!(
            status_distribution(store.projects()),
            vec![
                (ProjectStatus::InProgress, 2),
                (ProjectStatus::Completed, 1),
                (ProjectStatus::Planned, 1),
            ]
        );
    }

    #[test]
    fn test_project_filter() {
        let projects = seed_projects();
        let mut filter = ProjectFilter { search: "app".to_string(), ..ProjectFilter::default() };
        assert_eq!(filter.apply(&projects).iter().map(|p| p.id).collect::<Vec<_>>(), vec![2]);

        filter.search.clear();
        filter.priority = Some(Priority::Low);
        assert_eq!(filter.apply(&projects).iter().map(|p| p.id).collect::<Vec<_>>(), vec![3]);

        filter.status = Some(ProjectStatus::Completed);
        assert_eq!(filter.active_count(), 2);
        assert!(filter.apply(&projects).is_empty());

        filter.clear();
        assert_eq!(filter.apply(&projects).len(), 3);
    }
}

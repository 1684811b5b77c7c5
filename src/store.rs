//! In-memory project store.
//!
//! `ProjectStore` owns the project collection for the lifetime of the process.
//! Every mutation goes through the store so that each project's task counters
//! stay consistent with its task list, and so that subscribers see one
//! immutable snapshot per change.
//!
//! Snapshots share the collection through an `Arc`; a mutation clones the
//! collection only when a snapshot handed out earlier is still alive, so
//! observers keep value semantics while the owner writes copy-on-write.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::fields::TaskStatus;
use crate::project::{assignee_code, seed_projects, CounterSource, Project, ProjectInput};
use crate::task::{Task, TaskInput};

/// An immutable view of the whole collection at one revision.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub revision: u64,
    pub projects: Arc<Vec<Project>>,
}

/// What a successful mutation changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    ProjectCreated { id: u64 },
    ProjectUpdated { id: u64 },
    ProjectDeleted { id: u64 },
    TaskAdded { project_id: u64, task_id: u64 },
    TaskStatusChanged { project_id: u64, task_id: u64, status: TaskStatus },
    TaskDeleted { project_id: u64, task_id: u64 },
}

type Observer = Box<dyn FnMut(&StoreEvent, &Snapshot)>;

/// Handle returned by [`ProjectStore::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Single-owner store of projects and their tasks.
pub struct ProjectStore {
    projects: Arc<Vec<Project>>,
    revision: u64,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl fmt::Debug for ProjectStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectStore")
            .field("projects", &self.projects.len())
            .field("revision", &self.revision)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for ProjectStore {
    fn default() -> Self {
        ProjectStore::new(Vec::new())
    }
}

impl ProjectStore {
    /// Create a store holding the given projects.
    pub fn new(projects: Vec<Project>) -> Self {
        ProjectStore {
            projects: Arc::new(projects),
            revision: 0,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Create a store bootstrapped with the three example projects.
    pub fn seeded() -> Self {
        let store = ProjectStore::new(seed_projects());
        debug!(event = "store.seeded", projects = store.projects.len());
        store
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The current collection, cheap to clone and unaffected by later mutations.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            revision: self.revision,
            projects: Arc::clone(&self.projects),
        }
    }

    /// Register an observer called after every successful mutation.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent, &Snapshot) + 'static,
    {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Drop a registered observer. Returns `false` if it was already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    /// Generate the next available project ID.
    pub fn next_id(&self) -> u64 {
        self.projects.iter().map(|p| p.id).max().unwrap_or(0) + 1
    }

    /// Get a project by ID.
    pub fn get(&self, id: u64) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Get a project by an ID given as text, e.g. a route or shell argument.
    pub fn get_by_key(&self, key: &str) -> Option<&Project> {
        key.trim().parse::<u64>().ok().and_then(|id| self.get(id))
    }

    /// Resolve a project identifier (either ID or name) to a project ID.
    /// Name matching is case-insensitive; several matches are reported as ambiguous.
    pub fn resolve(&self, identifier: &str) -> Result<u64, AppError> {
        if let Some(project) = self.get_by_key(identifier) {
            return Ok(project.id);
        }

        let wanted = identifier.trim().to_lowercase();
        let matches: Vec<u64> = self
            .projects
            .iter()
            .filter(|p| p.name.to_lowercase() == wanted)
            .map(|p| p.id)
            .collect();

        match matches.as_slice() {
            [] => Err(AppError::ProjectNotFound { identifier: identifier.to_string() }),
            [id] => Ok(*id),
            ids => Err(AppError::AmbiguousProject {
                identifier: identifier.to_string(),
                ids: ids.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(", "),
            }),
        }
    }

    /// Create a project from validated input and return the stored record.
    ///
    /// Task counts supplied by the form are kept as manual counters until the
    /// project's first task mutation; without them the project starts at 0/0.
    pub fn create(&mut self, input: ProjectInput) -> Project {
        let id = self.next_id();
        let counters = if input.total_tasks.is_some() || input.completed_tasks.is_some() {
            CounterSource::Manual
        } else {
            CounterSource::Derived
        };

        let project = Project {
            id,
            name: input.name,
            description: input.description,
            start_date: input.start_date,
            due_date: input.due_date,
            assignees: input.assignees.iter().map(|a| assignee_code(a)).collect(),
            manager: input.manager,
            status: input.status,
            priority: input.priority,
            total_tasks: input.total_tasks.unwrap_or(0),
            completed_tasks: input.completed_tasks.unwrap_or(0),
            counters,
            tasks: Vec::new(),
        };

        Arc::make_mut(&mut self.projects).push(project.clone());
        info!(event = "store.project.created", id, name = %project.name);
        self.commit(StoreEvent::ProjectCreated { id });
        project
    }

    /// Replace the editable fields of a project. Returns `false` if `id` is unknown.
    ///
    /// The task list is left alone, and so is the due date when the input has none.
    pub fn update(&mut self, id: u64, input: ProjectInput) -> bool {
        let Some(project) = self.project_mut(id) else {
            debug!(event = "store.project.update_missed", id);
            return false;
        };

        project.name = input.name;
        project.description = input.description;
        project.start_date = input.start_date;
        if input.due_date.is_some() {
            project.due_date = input.due_date;
        }
        project.assignees = input.assignees.iter().map(|a| assignee_code(a)).collect();
        project.manager = input.manager;
        project.status = input.status;
        project.priority = input.priority;
        if project.counters == CounterSource::Manual {
            project.total_tasks = input.total_tasks.unwrap_or(0);
            project.completed_tasks = input.completed_tasks.unwrap_or(0);
        }

        info!(event = "store.project.updated", id);
        self.commit(StoreEvent::ProjectUpdated { id });
        true
    }

    /// Remove a project. Returns `false` if `id` is unknown.
    pub fn delete(&mut self, id: u64) -> bool {
        if self.get(id).is_none() {
            debug!(event = "store.project.delete_missed", id);
            return false;
        }
        Arc::make_mut(&mut self.projects).retain(|p| p.id != id);
        info!(event = "store.project.deleted", id);
        self.commit(StoreEvent::ProjectDeleted { id });
        true
    }

    /// Append a task to a project and recompute its counters.
    /// Returns the new task's ID, or `None` if the project is unknown.
    pub fn add_task(&mut self, project_id: u64, input: TaskInput) -> Option<u64> {
        let Some(project) = self.project_mut(project_id) else {
            debug!(event = "store.task.add_missed", project_id);
            return None;
        };

        let task_id = project.next_task_id();
        project.tasks.push(Task {
            id: task_id,
            name: input.name,
            description: input.description,
            assigned_user: input.assigned_user,
            status: input.status,
            created_at_utc: Utc::now().timestamp(),
        });
        project.recompute_counters();

        info!(event = "store.task.added", project_id, task_id);
        self.commit(StoreEvent::TaskAdded { project_id, task_id });
        Some(task_id)
    }

    /// Set the status of one task and recompute the completed counter.
    /// Returns `false` if the project or task is unknown.
    pub fn update_task_status(&mut self, project_id: u64, task_id: u64, status: TaskStatus) -> bool {
        let known = self.get(project_id).is_some_and(|p| p.task(task_id).is_some());
        if !known {
            debug!(event = "store.task.status_missed", project_id, task_id);
            return false;
        }
        let Some(project) = self.project_mut(project_id) else {
            return false;
        };

        if let Some(task) = project.tasks.iter_mut().find(|t| t.id == task_id) {
            task.status = status;
        }
        project.recompute_counters();

        info!(event = "store.task.status_changed", project_id, task_id, status = ?status);
        self.commit(StoreEvent::TaskStatusChanged { project_id, task_id, status });
        true
    }

    /// Remove one task and recompute both counters.
    /// Returns `false` if the project or task is unknown.
    pub fn delete_task(&mut self, project_id: u64, task_id: u64) -> bool {
        let known = self.get(project_id).is_some_and(|p| p.task(task_id).is_some());
        if !known {
            debug!(event = "store.task.delete_missed", project_id, task_id);
            return false;
        }
        let Some(project) = self.project_mut(project_id) else {
            return false;
        };

        project.tasks.retain(|t| t.id != task_id);
        project.recompute_counters();

        info!(event = "store.task.deleted", project_id, task_id);
        self.commit(StoreEvent::TaskDeleted { project_id, task_id });
        true
    }

    /// Mutable access to one project, cloning the collection if a snapshot shares it.
    fn project_mut(&mut self, id: u64) -> Option<&mut Project> {
        self.get(id)?;
        Arc::make_mut(&mut self.projects).iter_mut().find(|p| p.id == id)
    }

    /// Publish the new state to every observer.
    fn commit(&mut self, event: StoreEvent) {
        self.revision += 1;
        let snapshot = self.snapshot();
        for (_, observer) in self.observers.iter_mut() {
            observer(&event, &snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use chrono::NaiveDate;
    use proptest::prelude::*;

    use super::*;
    use crate::fields::{Priority, ProjectStatus};

    fn demo_input() -> ProjectInput {
        ProjectInput::new("Demo", &["Alice", "Bob"], ProjectStatus::Planned, Priority::Low)
    }

    fn assert_counters_consistent(project: &Project) {
        assert_eq!(project.total_tasks as usize, project.tasks.len());
        assert_eq!(
            project.completed_tasks as usize,
            project.tasks.iter().filter(|t| t.status == TaskStatus::Done).count()
        );
    }

    #[test]
    fn test_create_demo_project_after_seed() {
        let mut store = ProjectStore::seeded();
        let project = store.create(demo_input());
        assert_eq!(project.id, 4);
        assert_eq!(project.assignees, vec!["AL", "BO"]);
        assert_eq!(project.total_tasks, 0);
        assert_eq!(project.completed_tasks, 0);
        assert_eq!(project.counters, CounterSource::Derived);
        assert!(project.tasks.is_empty());
    }

    #[test]
    fn test_create_then_get_round_trip() {
        let mut store = ProjectStore::seeded();
        let created = store.create(demo_input());
        assert_eq!(store.get(created.id), Some(&created));
        assert_eq!(store.get_by_key(" 4 "), Some(&created));
        assert_eq!(store.get_by_key("four"), None);
    }

    #[test]
    fn test_create_on_empty_store_starts_at_one() {
        let mut store = ProjectStore::default();
        assert_eq!(store.create(demo_input()).id, 1);
        assert_eq!(store.create(demo_input()).id, 2);
    }

    #[test]
    fn test_create_keeps_manual_counts() {
        let mut store = ProjectStore::default();
        let mut input = demo_input();
        input.total_tasks = Some(10);
        input.completed_tasks = Some(4);
        let project = store.create(input);
        assert_eq!(project.counters, CounterSource::Manual);
        assert_eq!((project.completed_tasks, project.total_tasks), (4, 10));
        assert_eq!(project.completion(), 40);
    }

    #[test]
    fn test_delete_removes_only_target() {
        let mut store = ProjectStore::seeded();
        let before: Vec<Project> = store.projects().to_vec();
        assert!(store.delete(2));
        assert!(store.get(2).is_none());
        assert_eq!(store.get(1), Some(&before[0]));
        assert_eq!(store.get(3), Some(&before[2]));
        assert!(!store.delete(2));
        assert!(!store.delete(99));
        assert_eq!(store.projects().len(), 2);
    }

    #[test]
    fn test_ids_never_reuse_below_maximum() {
        let mut store = ProjectStore::seeded();
        assert!(store.delete(1));
        let project = store.create(demo_input());
        assert_eq!(project.id, 4);
        let ids: Vec<u64> = store.projects().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
    }

    #[test]
    fn test_update_replaces_fields_and_keeps_due_date_when_absent() {
        let mut store = ProjectStore::seeded();
        let mut input = ProjectInput::new("Website 2.0", &["Charlie"], ProjectStatus::OnHold, Priority::Medium);
        input.manager = Some("Manager B".to_string());
        input.start_date = NaiveDate::from_ymd_opt(2026, 1, 5);
        assert!(store.update(1, input));

        let project = store.get(1).unwrap();
        assert_eq!(project.name, "Website 2.0");
        assert_eq!(project.assignees, vec!["CH"]);
        assert_eq!(project.status, ProjectStatus::OnHold);
        assert_eq!(project.manager.as_deref(), Some("Manager B"));
        assert_eq!(project.due_date, NaiveDate::from_ymd_opt(2026, 2, 20));
        assert_eq!(project.start_date, NaiveDate::from_ymd_opt(2026, 1, 5));
    }

    #[test]
    fn test_update_with_due_date_replaces_it() {
        let mut store = ProjectStore::seeded();
        let mut input = demo_input();
        input.due_date = NaiveDate::from_ymd_opt(2027, 6, 1);
        assert!(store.update(3, input));
        assert_eq!(store.get(3).unwrap().due_date, NaiveDate::from_ymd_opt(2027, 6, 1));
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut store = ProjectStore::seeded();
        let revision = store.revision();
        assert!(!store.update(42, demo_input()));
        assert_eq!(store.revision(), revision);
        assert_eq!(store.projects(), seed_projects().as_slice());
    }

    #[test]
    fn test_update_ignores_manual_counts_once_derived() {
        let mut store = ProjectStore::seeded();
        store.add_task(1, TaskInput::new("Design", "Alice", TaskStatus::Done));

        let mut input = demo_input();
        input.total_tasks = Some(50);
        input.completed_tasks = Some(10);
        assert!(store.update(1, input));

        let project = store.get(1).unwrap();
        assert_eq!((project.completed_tasks, project.total_tasks), (1, 1));
        assert_eq!(project.tasks.len(), 1);
    }

    #[test]
    fn test_update_writes_manual_counts_while_manual() {
        let mut store = ProjectStore::seeded();
        let mut input = demo_input();
        input.total_tasks = Some(20);
        input.completed_tasks = Some(5);
        assert!(store.update(3, input));
        let project = store.get(3).unwrap();
        assert_eq!((project.completed_tasks, project.total_tasks), (5, 20));
        assert_eq!(project.counters, CounterSource::Manual);
    }

    #[test]
    fn test_first_task_on_seed_project_switches_to_derived_counters() {
        let mut store = ProjectStore::seeded();
        assert_eq!(store.get(1).unwrap().total_tasks, 10);

        let task_id = store.add_task(1, TaskInput::new("Design", "Alice", TaskStatus::Todo));
        assert_eq!(task_id, Some(1));

        let project = store.get(1).unwrap();
        assert_eq!(project.counters, CounterSource::Derived);
        assert_eq!(project.total_tasks, 1);
        assert_eq!(project.completed_tasks, 0);
        assert_eq!(project.tasks[0].name, "Design");
        assert_eq!(project.tasks[0].assigned_user, "Alice");
        assert!(project.tasks[0].created_at_utc > 0);
    }

    #[test]
    fn test_update_task_status_to_done() {
        let mut store = ProjectStore::seeded();
        store.add_task(1, TaskInput::new("Design", "Alice", TaskStatus::Done));
        store.add_task(1, TaskInput::new("Build", "Bob", TaskStatus::InProgress));
        let created_at = store.get(1).unwrap().tasks[1].created_at_utc;

        assert!(store.update_task_status(1, 2, TaskStatus::Done));

        let project = store.get(1).unwrap();
        assert_eq!(project.completed_tasks, 2);
        assert_eq!(project.total_tasks, 2);
        assert_eq!(project.tasks[1].created_at_utc, created_at);
    }

    #[test]
    fn test_status_transitions_are_unrestricted() {
        let mut store = ProjectStore::seeded();
        store.add_task(2, TaskInput::new("Ship", "Emma", TaskStatus::Done));
        assert!(store.update_task_status(2, 1, TaskStatus::Todo));
        assert_eq!(store.get(2).unwrap().tasks[0].status, TaskStatus::Todo);
        assert!(store.update_task_status(2, 1, TaskStatus::Done));
        assert!(store.update_task_status(2, 1, TaskStatus::InProgress));
        assert_eq!(store.get(2).unwrap().completed_tasks, 0);
    }

    #[test]
    fn test_delete_last_task_leaves_zero_counters() {
        let mut store = ProjectStore::seeded();
        store.add_task(3, TaskInput::new("Spec", "David", TaskStatus::Done));
        assert!(store.delete_task(3, 1));
        let project = store.get(3).unwrap();
        assert_eq!((project.completed_tasks, project.total_tasks), (0, 0));
        assert!(!store.delete_task(3, 1));
    }

    #[test]
    fn test_task_ids_scoped_per_project() {
        let mut store = ProjectStore::seeded();
        assert_eq!(store.add_task(1, TaskInput::new("A", "Alice", TaskStatus::Todo)), Some(1));
        assert_eq!(store.add_task(2, TaskInput::new("B", "Bob", TaskStatus::Todo)), Some(1));
        assert_eq!(store.add_task(1, TaskInput::new("C", "Alice", TaskStatus::Todo)), Some(2));
        assert!(store.delete_task(1, 1));
        assert_eq!(store.add_task(1, TaskInput::new("D", "Alice", TaskStatus::Todo)), Some(3));
    }

    #[test]
    fn test_task_operations_on_unknown_ids_are_noops() {
        let mut store = ProjectStore::seeded();
        let revision = store.revision();
        assert_eq!(store.add_task(9, TaskInput::new("A", "Alice", TaskStatus::Todo)), None);
        assert!(!store.update_task_status(1, 1, TaskStatus::Done));
        assert!(!store.delete_task(9, 1));
        assert_eq!(store.revision(), revision);
        assert_eq!(store.get(1).unwrap().counters, CounterSource::Manual);
    }

    #[test]
    fn test_snapshots_are_immutable() {
        let mut store = ProjectStore::seeded();
        let before = store.snapshot();
        store.add_task(1, TaskInput::new("Design", "Alice", TaskStatus::Todo));
        store.delete(3);

        assert_eq!(before.revision, 0);
        assert_eq!(before.projects.len(), 3);
        assert!(before.projects[0].tasks.is_empty());
        assert_eq!(before.projects[0].total_tasks, 10);

        let after = store.snapshot();
        assert_eq!(after.revision, 2);
        assert_eq!(after.projects.len(), 2);
    }

    #[test]
    fn test_observers_receive_event_and_snapshot() {
        let mut store = ProjectStore::seeded();
        let seen: Rc<RefCell<Vec<(StoreEvent, u64, usize)>>> = Rc::default();
        let sink = Rc::clone(&seen);
        store.subscribe(move |event, snapshot| {
            sink.borrow_mut().push((event.clone(), snapshot.revision, snapshot.projects.len()));
        });

        store.create(demo_input());
        store.add_task(4, TaskInput::new("Design", "Alice", TaskStatus::Todo));
        store.update_task_status(4, 1, TaskStatus::Done);
        store.delete_task(4, 1);
        store.delete(4);
        store.delete(4);

        let seen = seen.borrow();
        assert_eq!(
            *seen,
            vec![
                (StoreEvent::ProjectCreated { id: 4 }, 1, 4),
                (StoreEvent::TaskAdded { project_id: 4, task_id: 1 }, 2, 4),
                (StoreEvent::TaskStatusChanged { project_id: 4, task_id: 1, status: TaskStatus::Done }, 3, 4),
                (StoreEvent::TaskDeleted { project_id: 4, task_id: 1 }, 4, 4),
                (StoreEvent::ProjectDeleted { id: 4 }, 5, 3),
            ]
        );
    }

    #[test]
    fn test_unsubscribed_observer_stops_receiving() {
        let mut store = ProjectStore::seeded();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let id = store.subscribe(move |_, _| *sink.borrow_mut() += 1);

        store.create(demo_input());
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.delete(4);

        assert_eq!(*count.borrow(), 1);
        assert_eq!(Rc::strong_count(&count), 1);
    }

    #[test]
    fn test_resolve_by_id_or_name() {
        let mut store = ProjectStore::seeded();
        assert_eq!(store.resolve("2").unwrap(), 2);
        assert_eq!(store.resolve("crm dashboard").unwrap(), 3);
        assert!(matches!(store.resolve("nope"), Err(AppError::ProjectNotFound { .. })));

        store.create(ProjectInput::new("Mobile App", &["Bob"], ProjectStatus::Planned, Priority::Low));
        match store.resolve("Mobile App") {
            Err(AppError::AmbiguousProject { ids, .. }) => assert_eq!(ids, "2, 4"),
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(u64, TaskStatus),
        SetStatus(u64, u64, TaskStatus),
        Delete(u64, u64),
    }

    fn status_strategy() -> impl Strategy<Value = TaskStatus> {
        prop_oneof![
            Just(TaskStatus::Todo),
            Just(TaskStatus::InProgress),
            Just(TaskStatus::Done),
        ]
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1..4u64, status_strategy()).prop_map(|(p, s)| Op::Add(p, s)),
            (1..4u64, 1..8u64, status_strategy()).prop_map(|(p, t, s)| Op::SetStatus(p, t, s)),
            (1..4u64, 1..8u64).prop_map(|(p, t)| Op::Delete(p, t)),
        ]
    }

    proptest! {
        #[test]
        fn prop_counters_track_task_list(ops in proptest::collection::vec(op_strategy(), 0..60)) {
            let mut store = ProjectStore::seeded();
            for op in ops {
                let touched = match op {
                    Op::Add(p, s) => {
                        let before_max = store.get(p).unwrap().tasks.iter().map(|t| t.id).max();
                        let id = store.add_task(p, TaskInput::new("t", "Alice", s)).unwrap();
                        prop_assert!(before_max.map_or(true, |m| id > m));
                        Some(p)
                    }
                    Op::SetStatus(p, t, s) => store.update_task_status(p, t, s).then_some(p),
                    Op::Delete(p, t) => store.delete_task(p, t).then_some(p),
                };
                if let Some(p) = touched {
                    assert_counters_consistent(store.get(p).unwrap());
                }
                for project in store.projects() {
                    if project.counters == CounterSource::Derived {
                        assert_counters_consistent(project);
                    }
                }
            }
        }
    }
}

//! Main application logic for the terminal user interface.
//!
//! `App` borrows the store and the preferences for the whole session. It
//! renders from the latest store snapshot, delivered through a store
//! subscription, and sends every change back through the store's operations,
//! so the dashboard and the counters it shows can never disagree.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, TableState, Tabs, Wrap},
    Frame, Terminal,
};
use tracing::{debug, warn};

use crate::dates::{format_date, format_due_relative};
use crate::display::{
    format_assignees, format_created, format_priority, format_project_status, format_task_status, progress_bar,
};
use crate::fields::{Priority, ProjectStatus};
use crate::project::{Project, TEAM_MEMBERS};
use crate::settings::Preferences;
use crate::stats::{progress_series, status_distribution, ProjectFilter, Stats};
use crate::store::{ProjectStore, Snapshot, StoreEvent, SubscriptionId};
use crate::tui::{
    board::BoardView,
    colors::{priority_color, project_status_color, task_status_color, Palette, DARK_GREEN, DARK_RED, GOLD},
    enums::{AppState, ConfirmAction, InputMode},
    input::InputField,
    project_form::{
        ProjectFormState, COMPLETED_TASKS_GLOBAL_ORDER, DESCRIPTION_GLOBAL_ORDER, END_DATE_GLOBAL_ORDER,
        MANAGER_GLOBAL_ORDER, NAME_GLOBAL_ORDER, PRIORITY_GLOBAL_ORDER, START_DATE_GLOBAL_ORDER,
        STATUS_GLOBAL_ORDER, TEAM_GLOBAL_ORDER, TOTAL_TASKS_GLOBAL_ORDER,
    },
    task_form::{self, TaskFormState},
    utils::{centered_rect, cycle_index, step_selection},
};

/// Store changes received since the last key press.
type Inbox = Rc<RefCell<Vec<(StoreEvent, Snapshot)>>>;

/// Main application state for the terminal user interface.
pub struct App<'a> {
    store: &'a mut ProjectStore,
    prefs: &'a mut Preferences,
    snapshot: Snapshot,
    inbox: Inbox,
    subscription: SubscriptionId,
    palette: Palette,
    state: AppState,
    /// Where Esc leaves the project detail screen to.
    detail_return: AppState,
    /// Where the project form goes back to on cancel.
    form_return: AppState,
    /// Screen under the help and confirm overlays.
    overlay_return: AppState,
    input_mode: InputMode,
    status_message: String,
    dashboard_search: InputField,
    dashboard_table: TableState,
    project_filter: ProjectFilter,
    project_search: InputField,
    project_table: TableState,
    selected_project: Option<u64>,
    task_table: TableState,
    project_form: ProjectFormState,
    task_form: Option<TaskFormState>,
    board: BoardView,
    confirm_action: Option<ConfirmAction>,
}

impl<'a> App<'a> {
    pub fn new(store: &'a mut ProjectStore, prefs: &'a mut Preferences) -> Self {
        let inbox: Inbox = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&inbox);
        let subscription = store.subscribe(move |event, snapshot| {
            sink.borrow_mut().push((event.clone(), snapshot.clone()));
        });

        let snapshot = store.snapshot();
        let palette = Palette::for_theme(prefs.theme());
        let mut app = App {
            store,
            prefs,
            snapshot,
            inbox,
            subscription,
            palette,
            state: AppState::Dashboard,
            detail_return: AppState::Dashboard,
            form_return: AppState::Dashboard,
            overlay_return: AppState::Dashboard,
            input_mode: InputMode::None,
            status_message: String::new(),
            dashboard_search: InputField::new(),
            dashboard_table: TableState::default(),
            project_filter: ProjectFilter::default(),
            project_search: InputField::new(),
            project_table: TableState::default(),
            selected_project: None,
            task_table: TableState::default(),
            project_form: ProjectFormState::new(),
            task_form: None,
            board: BoardView::new(),
            confirm_action: None,
        };
        app.clamp_tables();
        app
    }

    /// Apply store changes published since the last call.
    fn sync(&mut self) {
        let received: Vec<(StoreEvent, Snapshot)> = self.inbox.borrow_mut().drain(..).collect();
        for (event, snapshot) in received {
            debug!(event = "tui.store_changed", change = ?event, revision = snapshot.revision);
            self.status_message = describe_event(&event);
            if let StoreEvent::ProjectDeleted { id } = event {
                if self.selected_project == Some(id) {
                    self.selected_project = None;
                }
            }
            self.snapshot = snapshot;
        }
        self.board.forget_missing_project(&self.snapshot.projects);
        self.clamp_tables();
    }

    fn clamp_tables(&mut self) {
        let len = self.dashboard_rows().len();
        clamp_table(&mut self.dashboard_table, len);
        let len = self.project_rows().len();
        clamp_table(&mut self.project_table, len);
        let len = self.current_project().map_or(0, |p| p.tasks.len());
        clamp_table(&mut self.task_table, len);
    }

    fn find_project(&self, id: u64) -> Option<&Project> {
        self.snapshot.projects.iter().find(|p| p.id == id)
    }

    fn current_project(&self) -> Option<&Project> {
        self.selected_project.and_then(|id| self.find_project(id))
    }

    /// Project ids shown on the dashboard table, narrowed by its search box.
    fn dashboard_rows(&self) -> Vec<u64> {
        let filter = ProjectFilter {
            search: self.dashboard_search.value.clone(),
            ..ProjectFilter::default()
        };
        filter.apply(&self.snapshot.projects).iter().map(|p| p.id).collect()
    }

    /// Project ids shown on the projects page after search and filters.
    fn project_rows(&self) -> Vec<u64> {
        let filter = self.project_list_filter();
        filter.apply(&self.snapshot.projects).iter().map(|p| p.id).collect()
    }

    fn project_list_filter(&self) -> ProjectFilter {
        ProjectFilter {
            search: self.project_search.value.clone(),
            ..self.project_filter.clone()
        }
    }

    fn open_detail(&mut self, id: u64, from: AppState) {
        self.selected_project = Some(id);
        if from != AppState::ProjectDetail {
            self.detail_return = from;
        }
        self.state = AppState::ProjectDetail;
        self.task_table = TableState::default();
        self.clamp_tables();
    }

    fn open_project_form(&mut self, project_id: Option<u64>) {
        let form = match project_id.and_then(|id| self.find_project(id)) {
            Some(project) => ProjectFormState::from_project(project),
            None => ProjectFormState::new(),
        };
        self.state = if form.editing.is_some() { AppState::EditProject } else { AppState::AddProject };
        self.project_form = form;
    }

    fn request_confirm(&mut self, action: ConfirmAction) {
        self.confirm_action = Some(action);
        self.overlay_return = self.state;
        self.state = AppState::Confirm;
    }

    fn toggle_theme(&mut self) {
        let theme = self.prefs.theme().toggled();
        match self.prefs.set_theme(theme) {
            Ok(()) => self.status_message = format!("Theme: {}", theme.as_str()),
            Err(e) => {
                warn!(event = "tui.theme_save_failed", error = %e);
                self.prefs.settings.theme = theme;
                self.status_message = format!("Theme changed but not saved: {e}");
            }
        }
        self.palette = Palette::for_theme(theme);
    }

    /// Handle one key press. Returns true if the application should quit.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        self.status_message.clear();

        let should_quit = if self.input_mode == InputMode::Search {
            self.handle_search_input(code);
            false
        } else {
            match self.state {
                AppState::Dashboard => self.handle_dashboard_input(code),
                AppState::ProjectList => self.handle_project_list_input(code),
                AppState::ProjectDetail => self.handle_detail_input(code),
                AppState::AddProject | AppState::EditProject => {
                    self.handle_project_form_input(code);
                    false
                }
                AppState::AddTask => {
                    self.handle_task_form_input(code);
                    false
                }
                AppState::TaskBoard => self.handle_board_input(code),
                AppState::Help => {
                    self.state = self.overlay_return;
                    false
                }
                AppState::Confirm => {
                    self.handle_confirm_input(code);
                    false
                }
            }
        };

        self.sync();
        should_quit
    }

    /// Keys shared by the top-level screens. Returns `None` when not handled.
    fn handle_global_input(&mut self, code: KeyCode) -> Option<bool> {
        match code {
            KeyCode::Char('q') => Some(true),
            KeyCode::Char('1') => {
                self.state = AppState::Dashboard;
                Some(false)
            }
            KeyCode::Char('2') => {
                self.state = AppState::ProjectList;
                Some(false)
            }
            KeyCode::Char('3') => {
                self.state = AppState::TaskBoard;
                Some(false)
            }
            KeyCode::Char('t') => {
                self.toggle_theme();
                Some(false)
            }
            KeyCode::Char('h') | KeyCode::Char('?') => {
                self.overlay_return = self.state;
                self.state = AppState::Help;
                Some(false)
            }
            KeyCode::Char('n') => {
                self.form_return = self.state;
                self.open_project_form(None);
                Some(false)
            }
            _ => None,
        }
    }

    fn handle_search_input(&mut self, code: KeyCode) {
        let field = match self.state {
            AppState::Dashboard => &mut self.dashboard_search,
            AppState::ProjectList => &mut self.project_search,
            AppState::TaskBoard => &mut self.board.search,
            _ => {
                self.input_mode = InputMode::None;
                return;
            }
        };
        let finished = match code {
            KeyCode::Esc => {
                field.clear();
                true
            }
            KeyCode::Enter => true,
            KeyCode::Backspace => {
                field.handle_backspace();
                false
            }
            KeyCode::Delete => {
                field.handle_delete();
                false
            }
            KeyCode::Left => {
                field.move_cursor_left();
                false
            }
            KeyCode::Right => {
                field.move_cursor_right();
                false
            }
            KeyCode::Char(c) => {
                field.handle_char(c);
                false
            }
            _ => false,
        };
        if finished {
            self.input_mode = InputMode::None;
        }
    }

    fn handle_dashboard_input(&mut self, code: KeyCode) -> bool {
        if let Some(quit) = self.handle_global_input(code) {
            return quit;
        }
        let rows = self.dashboard_rows();
        match code {
            KeyCode::Up | KeyCode::Char('k') => step_table(&mut self.dashboard_table, rows.len(), -1),
            KeyCode::Down | KeyCode::Char('j') => step_table(&mut self.dashboard_table, rows.len(), 1),
            KeyCode::Enter => {
                if let Some(id) = selected_row(&self.dashboard_table, &rows) {
                    self.open_detail(id, AppState::Dashboard);
                }
            }
            KeyCode::Char('/') => self.input_mode = InputMode::Search,
            KeyCode::Esc => self.dashboard_search.clear(),
            _ => {}
        }
        false
    }

    fn handle_project_list_input(&mut self, code: KeyCode) -> bool {
        if let Some(quit) = self.handle_global_input(code) {
            return quit;
        }
        let rows = self.project_rows();
        let selected = selected_row(&self.project_table, &rows);
        match code {
            KeyCode::Up | KeyCode::Char('k') => step_table(&mut self.project_table, rows.len(), -1),
            KeyCode::Down | KeyCode::Char('j') => step_table(&mut self.project_table, rows.len(), 1),
            KeyCode::Enter => {
                if let Some(id) = selected {
                    self.open_detail(id, AppState::ProjectList);
                }
            }
            KeyCode::Char('/') => self.input_mode = InputMode::Search,
            KeyCode::Char('s') => {
                self.project_filter.status = cycle_option(&ProjectStatus::ALL, self.project_filter.status);
                self.project_table.select(Some(0));
            }
            KeyCode::Char('p') => {
                self.project_filter.priority = cycle_option(&Priority::ALL, self.project_filter.priority);
                self.project_table.select(Some(0));
            }
            KeyCode::Char('c') | KeyCode::Esc => {
                self.project_filter.clear();
                self.project_search.clear();
            }
            KeyCode::Char('e') => {
                if let Some(id) = selected {
                    self.form_return = AppState::ProjectList;
                    self.open_project_form(Some(id));
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = selected {
                    self.request_confirm(ConfirmAction::DeleteProject(id));
                }
            }
            _ => {}
        }
        false
    }

    fn handle_detail_input(&mut self, code: KeyCode) -> bool {
        let Some(project) = self.current_project() else {
            self.state = self.detail_return;
            return false;
        };
        let project_id = project.id;
        let selected_task = self
            .task_table
            .selected()
            .and_then(|i| project.tasks.get(i))
            .map(|t| (t.id, t.status));
        let task_count = project.tasks.len();

        match code {
            KeyCode::Esc | KeyCode::Backspace => self.state = self.detail_return,
            KeyCode::Up | KeyCode::Char('k') => step_table(&mut self.task_table, task_count, -1),
            KeyCode::Down | KeyCode::Char('j') => step_table(&mut self.task_table, task_count, 1),
            KeyCode::Char('a') => {
                let form = TaskFormState::for_project(project);
                self.task_form = Some(form);
                self.state = AppState::AddTask;
            }
            KeyCode::Char(' ') | KeyCode::Char('s') => {
                if let Some((task_id, status)) = selected_task {
                    self.store.update_task_status(project_id, task_id, status.cycle());
                }
            }
            KeyCode::Char('x') => {
                if let Some((task_id, _)) = selected_task {
                    self.request_confirm(ConfirmAction::DeleteTask { project_id, task_id });
                }
            }
            KeyCode::Char('e') => {
                self.form_return = AppState::ProjectDetail;
                self.open_project_form(Some(project_id));
            }
            KeyCode::Char('d') => self.request_confirm(ConfirmAction::DeleteProject(project_id)),
            _ => return self.handle_global_input(code).unwrap_or(false),
        }
        false
    }

    fn handle_project_form_input(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.state = self.form_return,
            KeyCode::Tab | KeyCode::Down => self.project_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.project_form.prev_field(),
            KeyCode::Left => self.project_form.handle_left_right(false),
            KeyCode::Right => self.project_form.handle_left_right(true),
            KeyCode::Backspace => self.project_form.handle_backspace(),
            KeyCode::Delete => self.project_form.handle_delete(),
            KeyCode::Enter => self.submit_project_form(),
            KeyCode::Char(c) => self.project_form.handle_char(c),
            _ => {}
        }
    }

    fn submit_project_form(&mut self) {
        let input = match self.project_form.submit() {
            Ok(input) => input,
            Err(e) => {
                debug!(event = "tui.project_form_rejected", error = %e);
                self.status_message = "Please fix the highlighted fields".to_string();
                return;
            }
        };

        match self.project_form.editing {
            Some(id) => {
                self.store.update(id, input);
                self.open_detail(id, self.form_return);
            }
            None => {
                let project = self.store.create(input);
                self.state = AppState::ProjectList;
                self.sync();
                let rows = self.project_rows();
                self.project_table.select(rows.iter().position(|id| *id == project.id));
            }
        }
    }

    fn handle_task_form_input(&mut self, code: KeyCode) {
        let Some(form) = self.task_form.as_mut() else {
            self.state = AppState::ProjectDetail;
            return;
        };
        match code {
            KeyCode::Esc => {
                self.task_form = None;
                self.state = AppState::ProjectDetail;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Left => form.handle_left_right(false),
            KeyCode::Right => form.handle_left_right(true),
            KeyCode::Backspace => form.handle_backspace(),
            KeyCode::Delete => form.handle_delete(),
            KeyCode::Enter => self.submit_task_form(),
            KeyCode::Char(c) => form.handle_char(c),
            _ => {}
        }
    }

    fn submit_task_form(&mut self) {
        let Some(form) = self.task_form.as_mut() else {
            return;
        };
        let project_id = form.project_id;
        match form.submit() {
            Ok(input) => {
                if self.store.add_task(project_id, input).is_some() {
                    let count = self.store.get(project_id).map_or(0, |p| p.tasks.len());
                    self.task_table.select(count.checked_sub(1));
                }
                self.task_form = None;
                self.state = AppState::ProjectDetail;
            }
            Err(e) => {
                debug!(event = "tui.task_form_rejected", error = %e);
                self.status_message = "Please fix the highlighted fields".to_string();
            }
        }
    }

    fn handle_board_input(&mut self, code: KeyCode) -> bool {
        if let Some(quit) = self.handle_global_input(code) {
            return quit;
        }
        let board = self.board.board(&self.snapshot.projects);
        match code {
            KeyCode::Left => self.board.move_column(false, &board),
            KeyCode::Right => self.board.move_column(true, &board),
            KeyCode::Up | KeyCode::Char('k') => self.board.move_card(-1, &board),
            KeyCode::Down | KeyCode::Char('j') => self.board.move_card(1, &board),
            KeyCode::Char(' ') | KeyCode::Char('s') => {
                if let Some(task) = self.board.selected_task(&board) {
                    let (project_id, task_id) = (task.project_id, task.task.id);
                    self.store.update_task_status(project_id, task_id, task.task.status.cycle());
                    let moved = self.board.board(self.store.projects());
                    self.board.select_task(&moved, project_id, task_id);
                }
            }
            KeyCode::Enter => {
                if let Some(task) = self.board.selected_task(&board) {
                    self.open_detail(task.project_id, AppState::TaskBoard);
                }
            }
            KeyCode::Char('/') => self.input_mode = InputMode::Search,
            KeyCode::Char('f') => self.board.cycle_status_filter(),
            KeyCode::Char('p') => self.board.cycle_project_filter(&self.snapshot.projects),
            KeyCode::Char('c') | KeyCode::Esc => self.board.clear_filters(),
            _ => {}
        }
        false
    }

    fn handle_confirm_input(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.confirm_action.take() {
                    Some(ConfirmAction::DeleteProject(id)) => {
                        self.store.delete(id);
                        self.state = if self.overlay_return == AppState::ProjectDetail {
                            self.detail_return
                        } else {
                            self.overlay_return
                        };
                        return;
                    }
                    Some(ConfirmAction::DeleteTask { project_id, task_id }) => {
                        self.store.delete_task(project_id, task_id);
                    }
                    None => {}
                }
                self.state = self.overlay_return;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm_action = None;
                self.state = self.overlay_return;
            }
            _ => {}
        }
    }

    /// Poll for and handle keyboard events.
    ///
    /// Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key.code, key.modifiers));
                }
            }
        }
        Ok(false)
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let selected = match self.state {
            AppState::Dashboard => 0,
            AppState::TaskBoard => 2,
            AppState::Help | AppState::Confirm => match self.overlay_return {
                AppState::Dashboard => 0,
                AppState::TaskBoard => 2,
                _ => 1,
            },
            _ => 1,
        };
        let titles: Vec<String> = AppState::NAV
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{} {}", i + 1, s.title()))
            .collect();
        let tabs = Tabs::new(titles)
            .select(selected)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Span::styled(
                        "PROJECT DASHBOARD",
                        Style::default().add_modifier(Modifier::BOLD),
                    ))
                    .title_top(Line::from(format!("theme: {} ", self.prefs.theme().as_str())).right_aligned()),
            )
            .style(Style::default().fg(self.palette.fg))
            .highlight_style(Style::default().fg(self.palette.accent).add_modifier(Modifier::BOLD));
        f.render_widget(tabs, area);
    }

    fn render_stat_cards(&self, f: &mut Frame, area: Rect, stats: &Stats) {
        let cards = [
            ("Total Projects", stats.total_projects.to_string(), self.palette.accent),
            ("Active Projects", stats.active_projects.to_string(), Color::Yellow),
            ("Completed Tasks", stats.completed_tasks.to_string(), Color::Green),
            ("Pending Tasks", stats.pending_tasks.to_string(), Color::Red),
        ];
        let areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(area);

        for ((title, value, color), card_area) in cards.into_iter().zip(areas.iter()) {
            let text = vec![
                Line::from(Span::styled(value, Style::default().fg(color).add_modifier(Modifier::BOLD))),
                Line::from(Span::styled(title, Style::default().fg(self.palette.muted))),
            ];
            let card = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(card, *card_area);
        }
    }

    fn render_dashboard(&mut self, f: &mut Frame, area: Rect) {
        let projects = Arc::clone(&self.snapshot.projects);
        let today = Local::now().date_naive();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(area);
        self.render_stat_cards(f, chunks[0], &Stats::compute(&projects));

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(body[0]);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(body[1]);

        let searching = self.input_mode == InputMode::Search;
        f.render_widget(search_box(&self.dashboard_search, searching, "Search projects ('/')", &self.palette), left[0]);

        let rows = self.dashboard_rows();
        let shown: Vec<&Project> = rows.iter().filter_map(|id| projects.iter().find(|p| p.id == *id)).collect();
        let header = ["Name", "Progress", "Due", "Priority", "Status", "Team"];
        let widths = [
            Constraint::Min(18),
            Constraint::Length(17),
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(12),
        ];
        let table_rows: Vec<Row> = shown
            .iter()
            .map(|p| {
                Row::new(vec![
                    Cell::from(p.name.clone()),
                    Cell::from(format!("{} {:>3}%", progress_bar(p.completion(), 10), p.completion())),
                    Cell::from(format_due_relative(p.due_date, today)),
                    Cell::from(format_priority(p.priority)).style(Style::default().fg(priority_color(p.priority))),
                    Cell::from(format_project_status(p.status))
                        .style(Style::default().fg(project_status_color(p.status))),
                    Cell::from(format_assignees(&p.assignees)),
                ])
            })
            .collect();
        let table = self
            .styled_table(table_rows, &header, &widths)
            .block(Block::default().borders(Borders::ALL).title(format!("Projects ({}/{})", shown.len(), projects.len())));
        f.render_stateful_widget(table, left[1], &mut self.dashboard_table);

        self.render_progress_chart(f, right[0], &projects);
        self.render_status_distribution(f, right[1], &projects);
    }

    fn render_progress_chart(&self, f: &mut Frame, area: Rect, projects: &[Project]) {
        let series = progress_series(projects);
        let mut chart = BarChart::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Project Progress (completed / remaining)"),
            )
            .bar_width(3)
            .bar_gap(0)
            .group_gap(2);

        for bar in &series {
            let group = BarGroup::default()
                .label(Line::from(bar.label.clone()))
                .bars(&[
                    Bar::default()
                        .value(u64::from(bar.completed))
                        .style(Style::default().fg(Color::Green)),
                    Bar::default()
                        .value(u64::from(bar.remaining))
                        .style(Style::default().fg(self.palette.muted)),
                ]);
            chart = chart.data(group);
        }
        f.render_widget(chart, area);
    }

    fn render_status_distribution(&self, f: &mut Frame, area: Rect, projects: &[Project]) {
        let total = projects.len().max(1);
        let width = area.width.saturating_sub(24) as usize;
        let lines: Vec<Line> = status_distribution(projects)
            .into_iter()
            .map(|(status, count)| {
                let filled = count * width / total;
                Line::from(vec![
                    Span::styled("■ ", Style::default().fg(project_status_color(status))),
                    Span::raw(format!("{:<12}{:>3} ", format_project_status(status), count)),
                    Span::styled("█".repeat(filled), Style::default().fg(project_status_color(status))),
                ])
            })
            .collect();
        let paragraph = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Projects by Status"));
        f.render_widget(paragraph, area);
    }

    fn render_project_list(&mut self, f: &mut Frame, area: Rect) {
        let projects = Arc::clone(&self.snapshot.projects);
        let today = Local::now().date_naive();
        let filter = self.project_list_filter();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let searching = self.input_mode == InputMode::Search;
        let mut spans = vec![
            Span::styled(
                format!("Search: {}", self.project_search.value),
                if searching { Style::default().fg(GOLD) } else { Style::default() },
            ),
            Span::raw(format!(
                "   Status: {}",
                filter.status.map(format_project_status).unwrap_or("All Statuses")
            )),
            Span::raw(format!(
                "   Priority: {}",
                filter.priority.map(format_priority).unwrap_or("All Priorities")
            )),
        ];
        if filter.active_count() > 0 {
            spans.push(Span::styled(
                format!("   ({} active)", filter.active_count()),
                Style::default().fg(self.palette.accent),
            ));
        }
        let filter_line = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL).title("Filters  /: search  s: status  p: priority  c: clear"));
        f.render_widget(filter_line, chunks[0]);

        let shown = filter.apply(&projects);
        let header = ["ID", "Name", "Progress", "Tasks", "Due", "Priority", "Status", "Manager", "Team"];
        let widths = [
            Constraint::Length(4),
            Constraint::Min(18),
            Constraint::Length(17),
            Constraint::Length(7),
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(12),
        ];
        let table_rows: Vec<Row> = shown
            .iter()
            .map(|p| {
                let style = if p.status == ProjectStatus::Completed {
                    Style::default().fg(self.palette.muted)
                } else {
                    Style::default()
                };
                Row::new(vec![
                    Cell::from(p.id.to_string()),
                    Cell::from(p.name.clone()),
                    Cell::from(format!("{} {:>3}%", progress_bar(p.completion(), 10), p.completion())),
                    Cell::from(format!("{}/{}", p.completed_tasks, p.total_tasks)),
                    Cell::from(format_due_relative(p.due_date, today)),
                    Cell::from(format_priority(p.priority)).style(Style::default().fg(priority_color(p.priority))),
                    Cell::from(format_project_status(p.status))
                        .style(Style::default().fg(project_status_color(p.status))),
                    Cell::from(p.manager.clone().unwrap_or_else(|| "-".to_string())),
                    Cell::from(format_assignees(&p.assignees)),
                ])
                .style(style)
            })
            .collect();

        let title = if shown.is_empty() {
            "No projects found. Adjust the filters or press 'n' to create one".to_string()
        } else {
            format!("Showing {} of {} projects", shown.len(), projects.len())
        };
        let table = self
            .styled_table(table_rows, &header, &widths)
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_stateful_widget(table, chunks[1], &mut self.project_table);
    }

    fn render_project_detail(&mut self, f: &mut Frame, area: Rect) {
        let projects = Arc::clone(&self.snapshot.projects);
        let Some(project) = self.selected_project.and_then(|id| projects.iter().find(|p| p.id == id)) else {
            let missing = Paragraph::new("Project not found")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(missing, area);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(8),
                Constraint::Min(0),
            ])
            .split(area);

        let title = Line::from(vec![
            Span::styled(project.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format_project_status(project.status),
                Style::default().fg(project_status_color(project.status)),
            ),
            Span::raw("  "),
            Span::styled(
                format!("{} priority", format_priority(project.priority)),
                Style::default().fg(priority_color(project.priority)),
            ),
        ]);
        f.render_widget(
            Paragraph::new(title).block(Block::default().borders(Borders::ALL).title(format!("Project {}", project.id))),
            chunks[0],
        );

        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Completion"))
            .gauge_style(Style::default().fg(DARK_GREEN).bg(self.palette.highlight_bg))
            .percent(project.completion().min(100) as u16)
            .label(format!(
                "{}% ({}/{} tasks)",
                project.completion(),
                project.completed_tasks,
                project.total_tasks
            ));
        f.render_widget(gauge, chunks[1]);

        let info = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[2]);
        let description = Paragraph::new(project.description.clone().unwrap_or_else(|| "No description".to_string()))
            .block(Block::default().borders(Borders::ALL).title("Description"))
            .wrap(Wrap { trim: true });
        f.render_widget(description, info[0]);

        let label = Style::default().fg(self.palette.muted);
        let details = vec![
            Line::from(vec![Span::styled("Start:    ", label), Span::raw(format_date(project.start_date))]),
            Line::from(vec![Span::styled("Due:      ", label), Span::raw(format_date(project.due_date))]),
            Line::from(vec![
                Span::styled("Manager:  ", label),
                Span::raw(project.manager.clone().unwrap_or_else(|| "-".to_string())),
            ]),
            Line::from(vec![Span::styled("Team:     ", label), Span::raw(project.assignees.join(", "))]),
            Line::from(vec![
                Span::styled("Remaining:", label),
                Span::raw(format!(" {} tasks", project.remaining_tasks())),
            ]),
        ];
        f.render_widget(
            Paragraph::new(details).block(Block::default().borders(Borders::ALL).title("Details")),
            info[1],
        );

        let header = ["ID", "Task", "Assigned", "Status", "Created"];
        let widths = [
            Constraint::Length(4),
            Constraint::Min(20),
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Length(17),
        ];
        let task_rows: Vec<Row> = project
            .tasks
            .iter()
            .map(|t| {
                let name = match &t.description {
                    Some(desc) => format!("{} - {}", t.name, desc),
                    None => t.name.clone(),
                };
                Row::new(vec![
                    Cell::from(t.id.to_string()),
                    Cell::from(name),
                    Cell::from(t.assigned_user.clone()),
                    Cell::from(format_task_status(t.status)).style(Style::default().fg(task_status_color(t.status))),
                    Cell::from(format_created(t.created_at_utc)),
                ])
            })
            .collect();
        let title = if project.tasks.is_empty() {
            "Tasks (0) - press 'a' to add the first task".to_string()
        } else {
            format!("Tasks ({}) - a: add  space: next status  x: delete", project.tasks.len())
        };
        let table = self
            .styled_table(task_rows, &header, &widths)
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_stateful_widget(table, chunks[3], &mut self.task_table);
    }

    fn render_project_form(&self, f: &mut Frame, area: Rect) {
        let form = &self.project_form;
        let palette = &self.palette;
        let focused = |order: usize| form.current_field == order;

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Name
                Constraint::Length(5), // Description
                Constraint::Length(3), // Start date
                Constraint::Length(3), // End date
                Constraint::Length(3), // Manager
                Constraint::Length(3), // Status
                Constraint::Length(3), // Priority
                Constraint::Min(0),
            ])
            .split(main_chunks[0]);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(10), // Team
                Constraint::Length(3),  // Total tasks
                Constraint::Length(3),  // Completed tasks
                Constraint::Min(0),     // Instructions
            ])
            .split(main_chunks[1]);

        let text_fields = [
            (NAME_GLOBAL_ORDER, "Project Name *", &form.name, left[0]),
            (DESCRIPTION_GLOBAL_ORDER, "Description", &form.description, left[1]),
            (START_DATE_GLOBAL_ORDER, "Start Date (YYYY-MM-DD, today, in 3d)", &form.start_date, left[2]),
            (END_DATE_GLOBAL_ORDER, "End Date", &form.end_date, left[3]),
            (TOTAL_TASKS_GLOBAL_ORDER, "Total Tasks", &form.total_tasks, right[1]),
            (COMPLETED_TASKS_GLOBAL_ORDER, "Completed Tasks", &form.completed_tasks, right[2]),
        ];
        for (order, title, field, field_area) in text_fields {
            let widget = form_field(title, field.value.clone(), focused(order), form.error_for(order), palette);
            f.render_widget(widget, field_area);
        }

        let selectors = [
            (MANAGER_GLOBAL_ORDER, "Manager", form.manager_name().unwrap_or("None").to_string(), left[4]),
            (STATUS_GLOBAL_ORDER, "Status", format_project_status(form.status_value()).to_string(), left[5]),
            (PRIORITY_GLOBAL_ORDER, "Priority", format_priority(form.priority_value()).to_string(), left[6]),
        ];
        for (order, title, value, field_area) in selectors {
            let widget = form_field(title, format!("< {value} >"), focused(order), form.error_for(order), palette);
            f.render_widget(widget, field_area);
        }

        let team_focused = focused(TEAM_GLOBAL_ORDER);
        let mut team_lines: Vec<Line> = TEAM_MEMBERS
            .iter()
            .enumerate()
            .map(|(i, member)| {
                let mark = if form.is_selected(i) { "[x]" } else { "[ ]" };
                let style = if team_focused && i == form.team_cursor {
                    Style::default().bg(palette.highlight_bg).fg(palette.highlight_fg)
                } else {
                    Style::default()
                };
                Line::from(Span::styled(format!("{mark} {member}"), style))
            })
            .collect();
        let others = form.other_assignees();
        if !others.is_empty() {
            team_lines.push(Line::from(Span::styled(
                format!("Also assigned: {}", others.join(", ")),
                Style::default().fg(palette.muted),
            )));
        }
        let mut team_block = Block::default()
            .borders(Borders::ALL)
            .title("Team Members * (space to toggle)")
            .border_style(if team_focused { Style::default().fg(GOLD) } else { Style::default() });
        if let Some(err) = form.error_for(TEAM_GLOBAL_ORDER) {
            team_block = team_block.title_bottom(Line::from(Span::styled(err.to_string(), Style::default().fg(palette.error))));
        }
        f.render_widget(Paragraph::new(team_lines).block(team_block), right[0]);

        let instructions = vec![
            Line::from("Tab/Up/Down: move between fields"),
            Line::from("Left/Right: change selection"),
            Line::from("Enter: save    Esc: cancel"),
            Line::from(""),
            Line::from(Span::styled(
                "Task counts apply until the first task is added.",
                Style::default().fg(palette.muted),
            )),
        ];
        let title = if form.editing.is_some() { "Edit Project" } else { "Create Project" };
        f.render_widget(
            Paragraph::new(instructions)
                .block(Block::default().borders(Borders::ALL).title(title))
                .wrap(Wrap { trim: true }),
            right[3],
        );
    }

    fn render_task_form(&self, f: &mut Frame, area: Rect) {
        let Some(form) = &self.task_form else {
            return;
        };
        let project_name = self
            .find_project(form.project_id)
            .map(|p| p.name.clone())
            .unwrap_or_default();

        let area = centered_rect(60, 70, area);
        f.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Add Task - {project_name}"))
            .style(Style::default().bg(self.palette.bg).fg(self.palette.fg));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(inner);

        let focused = |order: usize| form.current_field == order;
        let user = form.selected_user().unwrap_or("Select user");
        let fields = [
            (task_form::NAME_GLOBAL_ORDER, "Task Name *", form.name.value.clone(), chunks[0]),
            (task_form::DESCRIPTION_GLOBAL_ORDER, "Description", form.description.value.clone(), chunks[1]),
            (task_form::ASSIGNEE_GLOBAL_ORDER, "Assign To *", format!("< {user} >"), chunks[2]),
            (
                task_form::STATUS_GLOBAL_ORDER,
                "Status",
                format!("< {} >", format_task_status(form.status_value())),
                chunks[3],
            ),
        ];
        for (order, title, value, field_area) in fields {
            let widget = form_field(title, value, focused(order), form.error_for(order), &self.palette);
            f.render_widget(widget, field_area);
        }
        f.render_widget(
            Paragraph::new("Enter: add task    Esc: cancel").style(Style::default().fg(self.palette.muted)),
            chunks[4],
        );
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let key = Style::default().fg(self.palette.accent).add_modifier(Modifier::BOLD);
        let entry = |k: &'static str, d: &'static str| Line::from(vec![Span::styled(format!("{k:<12}"), key), Span::raw(d)]);
        let text = vec![
            Line::from(Span::styled("Navigation", Style::default().add_modifier(Modifier::BOLD))),
            entry("1 / 2 / 3", "Dashboard / Projects / Tasks board"),
            entry("Up / Down", "Move selection"),
            entry("Enter", "Open project"),
            entry("Esc", "Back, or clear search"),
            entry("/", "Search"),
            entry("n", "New project"),
            entry("t", "Toggle light/dark theme"),
            entry("q", "Quit"),
            Line::from(""),
            Line::from(Span::styled("Projects", Style::default().add_modifier(Modifier::BOLD))),
            entry("s / p", "Cycle status / priority filter"),
            entry("c", "Clear filters"),
            entry("e / d", "Edit / delete project"),
            Line::from(""),
            Line::from(Span::styled("Project details", Style::default().add_modifier(Modifier::BOLD))),
            entry("a", "Add task"),
            entry("space", "Move task to its next status"),
            entry("x", "Delete task"),
            Line::from(""),
            Line::from(Span::styled("Tasks board", Style::default().add_modifier(Modifier::BOLD))),
            entry("Left/Right", "Change column"),
            entry("space", "Move card to the next status"),
            entry("f / p", "Cycle status / project filter"),
            Line::from(""),
            Line::from("Press any key to return"),
        ];
        f.render_widget(
            Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Help")),
            area,
        );
    }

    /// Render a confirmation dialog for destructive actions.
    fn render_confirm(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Confirm Action")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED).fg(Color::White));

        let area = centered_rect(50, 30, area);
        f.render_widget(Clear, area);

        let action = match self.confirm_action {
            Some(ConfirmAction::DeleteProject(id)) => format!(
                "Delete project '{}'?",
                self.find_project(id).map_or("?", |p| p.name.as_str())
            ),
            Some(ConfirmAction::DeleteTask { project_id, task_id }) => format!(
                "Delete task '{}'?",
                self.find_project(project_id)
                    .and_then(|p| p.task(task_id))
                    .map_or("?", |t| t.name.as_str())
            ),
            None => String::new(),
        };
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(action, Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from("This action cannot be undone."),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    /// Render the status bar at the bottom of the screen.
    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else if self.input_mode == InputMode::Search {
            "Searching (Enter to keep, Esc to clear)".to_string()
        } else {
            match self.state {
                AppState::Dashboard => "Dashboard | Enter: open  /: search  n: new project  h: help".to_string(),
                AppState::ProjectList => "Projects | Enter: open  e: edit  d: delete  n: new  h: help".to_string(),
                AppState::ProjectDetail => "Project | a: add task  e: edit  d: delete  Esc: back".to_string(),
                AppState::AddProject | AppState::EditProject | AppState::AddTask => {
                    format!("{} | Enter: save  Esc: cancel", self.state.title())
                }
                AppState::TaskBoard => {
                    "Tasks | Left/Right: column  space: next status  f/p: filters  Enter: open project".to_string()
                }
                AppState::Help => "Help".to_string(),
                AppState::Confirm => "Confirm Action".to_string(),
            }
        };
        let status = Paragraph::new(status_text)
            .style(Style::default().bg(self.palette.header_bg).fg(self.palette.header_fg))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    fn styled_table<'r>(&self, rows: Vec<Row<'r>>, header: &[&'r str], widths: &[Constraint]) -> Table<'r> {
        let header_cells = header
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells)
            .style(Style::default().bg(self.palette.header_bg).fg(self.palette.header_fg))
            .height(1);
        Table::new(rows, widths.to_vec())
            .header(header)
            .row_highlight_style(Style::default().bg(self.palette.highlight_bg).fg(self.palette.highlight_fg))
            .highlight_symbol(">> ")
    }

    fn render_screen(&mut self, f: &mut Frame, area: Rect, state: AppState) {
        match state {
            AppState::Dashboard => self.render_dashboard(f, area),
            AppState::ProjectList => self.render_project_list(f, area),
            AppState::ProjectDetail => self.render_project_detail(f, area),
            AppState::AddProject | AppState::EditProject => self.render_project_form(f, area),
            AppState::AddTask => {
                self.render_project_detail(f, area);
                self.render_task_form(f, area);
            }
            AppState::TaskBoard => {
                let projects = Arc::clone(&self.snapshot.projects);
                let searching = self.input_mode == InputMode::Search;
                let palette = self.palette;
                self.board.render(f, area, &projects, &palette, searching);
            }
            AppState::Help => self.render_help(f, area),
            AppState::Confirm => {
                let under = self.overlay_return;
                if under != AppState::Confirm {
                    self.render_screen(f, area, under);
                }
                self.render_confirm(f, area);
            }
        }
    }

    /// Main render function that dispatches to the current screen.
    pub fn render(&mut self, f: &mut Frame) {
        f.render_widget(
            Block::default().style(Style::default().bg(self.palette.bg).fg(self.palette.fg)),
            f.area(),
        );
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.render_screen(f, chunks[1], self.state);
        self.render_status_bar(f, chunks[2]);
    }

    /// Main event loop for the TUI application.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

impl Drop for App<'_> {
    fn drop(&mut self) {
        self.store.unsubscribe(self.subscription);
    }
}

fn describe_event(event: &StoreEvent) -> String {
    match event {
        StoreEvent::ProjectCreated { id } => format!("Project {id} created"),
        StoreEvent::ProjectUpdated { id } => format!("Project {id} updated"),
        StoreEvent::ProjectDeleted { id } => format!("Project {id} deleted"),
        StoreEvent::TaskAdded { .. } => "Task added".to_string(),
        StoreEvent::TaskStatusChanged { status, .. } => format!("Task moved to {}", format_task_status(*status)),
        StoreEvent::TaskDeleted { .. } => "Task deleted".to_string(),
    }
}

fn form_field<'f>(
    title: &'f str,
    value: String,
    focused: bool,
    error: Option<&str>,
    palette: &Palette,
) -> Paragraph<'f> {
    let border_style = if focused { Style::default().fg(GOLD) } else { Style::default() };
    let mut block = Block::default().borders(Borders::ALL).title(title).border_style(border_style);
    if let Some(err) = error {
        block = block.title_bottom(Line::from(Span::styled(err.to_string(), Style::default().fg(palette.error))));
    }
    Paragraph::new(value).block(block).wrap(Wrap { trim: false })
}

fn search_box<'f>(field: &InputField, active: bool, title: &'f str, palette: &Palette) -> Paragraph<'f> {
    let style = if active { Style::default().fg(GOLD) } else { Style::default().fg(palette.muted) };
    Paragraph::new(field.value.clone()).block(Block::default().borders(Borders::ALL).title(title).border_style(style))
}

fn clamp_table(table: &mut TableState, len: usize) {
    if len == 0 {
        table.select(None);
    } else {
        table.select(Some(table.selected().unwrap_or(0).min(len - 1)));
    }
}

fn step_table(table: &mut TableState, len: usize, delta: isize) {
    if len > 0 {
        table.select(Some(step_selection(table.selected().unwrap_or(0), len, delta)));
    }
}

fn selected_row(table: &TableState, rows: &[u64]) -> Option<u64> {
    table.selected().and_then(|i| rows.get(i).copied())
}

/// Step a dropdown filter through "all" then each option.
fn cycle_option<T: Copy + PartialEq>(options: &[T], current: Option<T>) -> Option<T> {
    let position = current.and_then(|c| options.iter().position(|o| *o == c)).map_or(0, |i| i + 1);
    match cycle_index(position, options.len() + 1, true) {
        0 => None,
        i => Some(options[i - 1]),
    }
}

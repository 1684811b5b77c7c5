//! Kanban board view of every task across projects.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::board::{Board, TaskFilter};
use crate::display::format_task_status;
use crate::fields::TaskStatus;
use crate::project::Project;
use crate::task::BoardTask;
use crate::tui::colors::{task_status_color, Palette, GOLD};
use crate::tui::input::InputField;
use crate::tui::utils::{cycle_index, step_selection};

const CARD_HEIGHT: usize = 5;

/// Selection and filter state of the board screen.
#[derive(Debug, Clone, Default)]
pub struct BoardView {
    pub filter: TaskFilter,
    pub search: InputField,
    pub selected_column: usize,
    pub selected_card: usize,
    column_scroll_offsets: [usize; 3],
}

impl BoardView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the board for the current projects and filters.
    pub fn board(&self, projects: &[Project]) -> Board {
        let filter = TaskFilter { search: self.search.value.clone(), ..self.filter.clone() };
        Board::build(projects, &filter)
    }

    pub fn selected_status(&self) -> TaskStatus {
        TaskStatus::ALL[self.selected_column]
    }

    pub fn selected_task<'b>(&self, board: &'b Board) -> Option<&'b BoardTask> {
        board.column(self.selected_status()).get(self.selected_card)
    }

    pub fn move_column(&mut self, right: bool, board: &Board) {
        let delta = if right { 1 } else { -1 };
        self.selected_column = step_selection(self.selected_column, TaskStatus::ALL.len(), delta);
        self.clamp_selection(board);
    }

    pub fn move_card(&mut self, delta: isize, board: &Board) {
        let len = board.column(self.selected_status()).len();
        self.selected_card = step_selection(self.selected_card, len, delta);
    }

    /// Keep the card selection inside the current column.
    pub fn clamp_selection(&mut self, board: &Board) {
        let len = board.column(self.selected_status()).len();
        if self.selected_card >= len {
            self.selected_card = len.saturating_sub(1);
        }
    }

    /// Follow a task to its new column after a status change.
    pub fn select_task(&mut self, board: &Board, project_id: u64, task_id: u64) {
        for (column, status) in TaskStatus::ALL.iter().enumerate() {
            if let Some(index) = board
                .column(*status)
                .iter()
                .position(|t| t.project_id == project_id && t.task.id == task_id)
            {
                self.selected_column = column;
                self.selected_card = index;
                return;
            }
        }
        self.clamp_selection(board);
    }

    /// Step the status filter through "all" then each status.
    pub fn cycle_status_filter(&mut self) {
        let options: Vec<Option<TaskStatus>> =
            std::iter::once(None).chain(TaskStatus::ALL.iter().copied().map(Some)).collect();
        let current = options.iter().position(|o| *o == self.filter.status).unwrap_or(0);
        self.filter.status = options[cycle_index(current, options.len(), true)];
    }

    /// Step the project filter through "all" then each project.
    pub fn cycle_project_filter(&mut self, projects: &[Project]) {
        let options: Vec<Option<u64>> =
            std::iter::once(None).chain(projects.iter().map(|p| Some(p.id))).collect();
        let current = options.iter().position(|o| *o == self.filter.project_id).unwrap_or(0);
        self.filter.project_id = options[cycle_index(current, options.len(), true)];
    }

    /// Drop a project filter that points at a deleted project.
    pub fn forget_missing_project(&mut self, projects: &[Project]) {
        if let Some(id) = self.filter.project_id {
            if !projects.iter().any(|p| p.id == id) {
                self.filter.project_id = None;
            }
        }
    }

    pub fn clear_filters(&mut self) {
        self.filter.clear();
        self.search.clear();
    }

    /// Render the filter line and the three status columns.
    pub fn render(&mut self, f: &mut Frame, area: Rect, projects: &[Project], palette: &Palette, searching: bool) {
        let board = self.board(projects);
        self.clamp_selection(&board);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let project_label = self
            .filter
            .project_id
            .and_then(|id| projects.iter().find(|p| p.id == id))
            .map(|p| p.name.as_str())
            .unwrap_or("All Projects");
        let status_label = self.filter.status.map(format_task_status).unwrap_or("All Statuses");
        let search_style = if searching {
            Style::default().fg(GOLD)
        } else {
            Style::default().fg(palette.fg)
        };
        let mut filter_spans = vec![
            Span::styled(format!("Search: {}", self.search.value), search_style),
            Span::raw("   "),
            Span::raw(format!("Status: {status_label}")),
            Span::raw("   "),
            Span::raw(format!("Project: {project_label}")),
        ];
        let active = self.filter.active_count() + usize::from(!self.search.value.is_empty());
        if active > 0 {
            filter_spans.push(Span::styled(
                format!("   ({active} active)"),
                Style::default().fg(palette.accent),
            ));
        }
        let filters = Paragraph::new(Line::from(filter_spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Showing {} of {} tasks", board.shown(), board.total)),
        );
        f.render_widget(filters, chunks[0]);

        let columns_layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)])
            .split(chunks[1]);

        for (i, &column_area) in columns_layout.iter().enumerate() {
            self.render_column(f, column_area, i, &board, palette);
        }
    }

    fn render_column(&mut self, f: &mut Frame, area: Rect, column_index: usize, board: &Board, palette: &Palette) {
        let status = TaskStatus::ALL[column_index];
        let is_selected = column_index == self.selected_column;
        let cards = board.column(status);

        let border_style = if is_selected {
            Style::default().fg(GOLD).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(task_status_color(status))
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("{} ({})", format_task_status(status), cards.len()))
            .border_style(border_style);
        let inner = block.inner(area);
        f.render_widget(block, area);

        if cards.is_empty() {
            let empty = Paragraph::new("No tasks").style(Style::default().fg(palette.muted));
            f.render_widget(empty, inner);
            return;
        }

        let available_height = inner.height as usize;
        let visible_cards = (available_height / CARD_HEIGHT).max(1);
        let offset = &mut self.column_scroll_offsets[column_index];
        if is_selected {
            if self.selected_card < *offset {
                *offset = self.selected_card;
            } else if self.selected_card >= *offset + visible_cards {
                *offset = self.selected_card + 1 - visible_cards;
            }
        }
        let scroll_offset = (*offset).min(cards.len().saturating_sub(1));

        let mut current_y = 0;
        for (card_index, task) in cards.iter().enumerate().skip(scroll_offset) {
            if current_y + CARD_HEIGHT > available_height {
                break;
            }
            let card_area = Rect {
                x: inner.x,
                y: inner.y + current_y as u16,
                width: inner.width,
                height: CARD_HEIGHT as u16,
            };
            render_card(f, card_area, task, is_selected && card_index == self.selected_card, palette);
            current_y += CARD_HEIGHT;
        }

        if scroll_offset > 0 {
            let indicator = Paragraph::new(format!("▲ +{} above", scroll_offset)).style(Style::default().fg(palette.accent));
            f.render_widget(indicator, Rect { height: 1, ..inner });
        }
    }
}

fn render_card(f: &mut Frame, area: Rect, task: &BoardTask, is_selected: bool, palette: &Palette) {
    let style = if is_selected {
        Style::default().bg(palette.highlight_bg).fg(palette.highlight_fg).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.fg)
    };

    let mut lines = vec![Line::from(Span::styled(
        task.task.name.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    if let Some(desc) = &task.task.description {
        lines.push(Line::from(Span::styled(desc.clone(), Style::default().fg(palette.muted))));
    }
    lines.push(Line::from(format!("{} | {}", task.task.assigned_user, task.project_name)));

    let card = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .style(style)
        .wrap(Wrap { trim: true });
    f.render_widget(card, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ProjectStore;
    use crate::task::TaskInput;

    fn store_with_tasks() -> ProjectStore {
        let mut store = ProjectStore::seeded();
        store.add_task(1, TaskInput::new("Design", "Alice", TaskStatus::Todo));
        store.add_task(1, TaskInput::new("Build", "Bob", TaskStatus::Todo));
        store.add_task(2, TaskInput::new("Ship", "Alice", TaskStatus::Done));
        store
    }

    #[test]
    fn test_search_uses_input_field() {
        let store = store_with_tasks();
        let mut view = BoardView::new();
        view.search = InputField::with_value("alice");
        let board = view.board(store.projects());
        assert_eq!(board.shown(), 2);
        assert_eq!(board.total, 3);
    }

    #[test]
    fn test_filters_cycle_through_all() {
        let store = store_with_tasks();
        let mut view = BoardView::new();
        view.cycle_status_filter();
        assert_eq!(view.filter.status, Some(TaskStatus::Todo));
        for _ in 0..3 {
            view.cycle_status_filter();
        }
        assert_eq!(view.filter.status, None);

        view.cycle_project_filter(store.projects());
        assert_eq!(view.filter.project_id, Some(1));
        view.cycle_project_filter(store.projects());
        assert_eq!(view.filter.project_id, Some(2));

        view.search = InputField::with_value("x");
        view.clear_filters();
        assert_eq!(view.filter, TaskFilter::default());
        assert!(view.search.value.is_empty());
    }

    #[test]
    fn test_selection_follows_task() {
        let mut store = store_with_tasks();
        let mut view = BoardView::new();
        let board = view.board(store.projects());
        view.move_card(1, &board);
        assert_eq!(view.selected_task(&board).map(|t| t.task.name.as_str()), Some("Build"));

        store.update_task_status(1, 2, TaskStatus::InProgress);
        let board = view.board(store.projects());
        view.select_task(&board, 1, 2);
        assert_eq!(view.selected_column, 1);
        assert_eq!(view.selected_card, 0);

        view.move_column(true, &board);
        assert_eq!(view.selected_status(), TaskStatus::Done);
        assert_eq!(view.selected_task(&board).map(|t| t.task.name.as_str()), Some("Ship"));
    }

    #[test]
    fn test_deleted_project_filter_is_dropped() {
        let mut store = store_with_tasks();
        let mut view = BoardView::new();
        view.filter.project_id = Some(2);
        store.delete(2);
        view.forget_missing_project(store.projects());
        assert_eq!(view.filter.project_id, None);
    }
}

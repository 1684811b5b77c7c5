//! Colours for the terminal user interface.

use ratatui::style::Color;

use crate::fields::{Priority, ProjectStatus, TaskStatus, Theme};

/// Focused form fields and the selected column
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Completed work
pub const DARK_GREEN: Color = Color::Rgb(0, 80, 0);
/// Destructive confirmations and high priority
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
/// On-hold projects
pub const DARK_PURPLE: Color = Color::Rgb(86, 60, 92);

/// Colours for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub accent: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub highlight_bg: Color,
    pub highlight_fg: Color,
    pub error: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Palette {
                bg: Color::Rgb(248, 250, 252),
                fg: Color::Rgb(15, 23, 42),
                muted: Color::Rgb(100, 116, 139),
                accent: Color::Rgb(37, 99, 235),
                header_bg: Color::Rgb(37, 99, 235),
                header_fg: Color::White,
                highlight_bg: Color::Rgb(203, 213, 225),
                highlight_fg: Color::Black,
                error: Color::Rgb(220, 38, 38),
            },
            Theme::Dark => Palette {
                bg: Color::Rgb(15, 23, 42),
                fg: Color::Rgb(226, 232, 240),
                muted: Color::Rgb(148, 163, 184),
                accent: Color::Rgb(96, 165, 250),
                header_bg: Color::Rgb(30, 41, 59),
                header_fg: Color::Rgb(226, 232, 240),
                highlight_bg: Color::Gray,
                highlight_fg: Color::Black,
                error: Color::Rgb(248, 113, 113),
            },
        }
    }
}

pub fn project_status_color(status: ProjectStatus) -> Color {
    match status {
        ProjectStatus::Planned => Color::Cyan,
        ProjectStatus::InProgress => Color::Yellow,
        ProjectStatus::OnHold => DARK_PURPLE,
        ProjectStatus::Completed => Color::Green,
    }
}

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Low => Color::Green,
        Priority::Medium => Color::Yellow,
        Priority::High => Color::Red,
    }
}

pub fn task_status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Todo => Color::Blue,
        TaskStatus::InProgress => Color::Yellow,
        TaskStatus::Done => Color::Green,
    }
}

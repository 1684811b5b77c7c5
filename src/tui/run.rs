//! Dashboard entry point and terminal setup.

use std::io;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::CrosstermBackend, Terminal};
use tracing::info;

use crate::settings::Preferences;
use crate::store::ProjectStore;
use crate::tui::app::App;

/// Initialise and run the terminal dashboard until the user quits.
///
/// The terminal is restored before any error from the event loop is returned.
pub fn run_tui(store: &mut ProjectStore, prefs: &mut Preferences) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!(event = "tui.started", projects = store.projects().len());
    let result = App::new(store, prefs).run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    info!(event = "tui.stopped", revision = store.revision());
    result
}

//! Command implementations for the CLI interface.
//!
//! Every front end receives the store and the preferences explicitly; nothing
//! here reaches for global state.

use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;

use clap::Subcommand;
use clap_complete::{generate, Shell};
use tracing::info;

use crate::errors::AppError;
use crate::settings::{Preferences, ThemeAction};
use crate::shell::{run_line, run_shell, Flow};
use crate::store::ProjectStore;
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive dashboard.
    Ui,

    /// Start the command shell. Reads commands from stdin unless a script or -c is given.
    Shell {
        /// Run commands from a file, stopping at the first error.
        #[arg(long)]
        script: Option<PathBuf>,
        /// Run a single command line. May be repeated.
        #[arg(short = 'c', long = "command")]
        commands: Vec<String>,
    },

    /// Show or change the stored colour theme.
    Theme {
        #[arg(value_enum, default_value_t = ThemeAction::Show)]
        action: ThemeAction,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Launch the terminal dashboard over the given store.
pub fn cmd_ui(store: &mut ProjectStore, prefs: &mut Preferences) {
    if let Err(e) = run_tui(store, prefs) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

/// Run the command shell over the given store.
pub fn cmd_shell(
    store: &mut ProjectStore,
    prefs: &mut Preferences,
    script: Option<PathBuf>,
    commands: Vec<String>,
) {
    if let Err(e) = shell_session(store, prefs, script, commands) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn shell_session(
    store: &mut ProjectStore,
    prefs: &mut Preferences,
    script: Option<PathBuf>,
    commands: Vec<String>,
) -> Result<(), AppError> {
    let mut stdout = io::stdout().lock();

    if !commands.is_empty() {
        for line in &commands {
            if run_line(store, prefs, line, &mut stdout)? == Flow::Quit {
                break;
            }
        }
        return Ok(());
    }

    match script {
        Some(path) => {
            info!(event = "shell.script_started", path = %path.display());
            let file = File::open(&path)?;
            run_shell(store, prefs, BufReader::new(file), &mut stdout, false)
        }
        None => {
            let stdin = io::stdin();
            let interactive = stdin.is_terminal();
            if interactive {
                println!("Project dashboard shell. Type 'help' for commands, 'quit' to leave.");
            }
            run_shell(store, prefs, stdin.lock(), &mut stdout, interactive)
        }
    }
}

/// Show or change the stored theme.
pub fn cmd_theme(prefs: &mut Preferences, action: ThemeAction) {
    match prefs.apply(action) {
        Ok(theme) => println!("Theme: {}", theme.as_str()),
        Err(e) => {
            eprintln!("Failed to update theme: {e}");
            std::process::exit(1);
        }
    }
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut io::stdout());
}

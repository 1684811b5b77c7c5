//! # PD - Project Dashboard
//!
//! A single-user project and task dashboard that keeps everything in memory.
//! Projects carry a team, dates, status, priority and a task list; the
//! dashboard derives completion counters, headline statistics, charts and a
//! Kanban board from them.
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the terminal dashboard
//! pd ui
//!
//! # Or drive the same store from a command shell
//! pd shell
//! pd shell -c "add-project Demo --assignee Alice --assignee Bob" -c "projects"
//! pd shell --script demo.pd
//! ```
//!
//! ## Data
//!
//! Three example projects are loaded at start-up and every change is lost on
//! exit. The colour theme is the only preference kept between runs, in
//! `~/.pd/settings.json` (or `$PD_HOME`, or `--home`). The dashboard logs to
//! `~/.pd/pd.log` while it owns the terminal.

use std::fs::{self, OpenOptions};

use clap::Parser;

pub mod board;
pub mod cli;
pub mod cmd;
pub mod dates;
pub mod display;
pub mod errors;
pub mod fields;
pub mod forms;
pub mod logging;
pub mod project;
pub mod settings;
pub mod shell;
pub mod stats;
pub mod store;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod board;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod project_form;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use settings::{resolve_home, Preferences, LOG_FILE};
use store::ProjectStore;

fn main() {
    let cli = Cli::parse();
    let home = resolve_home(cli.home.as_deref());

    // The dashboard owns the terminal, so its logs go to a file.
    let log_file = match cli.command {
        Commands::Ui => fs::create_dir_all(&home)
            .and_then(|_| OpenOptions::new().create(true).append(true).open(home.join(LOG_FILE)))
            .map_err(|e| eprintln!("Failed to open log file in {}: {}", home.display(), e))
            .ok(),
        _ => None,
    };
    logging::init_logging(cli.quiet, log_file);

    let mut prefs = Preferences::load(&home);

    match cli.command {
        Commands::Ui => {
            let mut store = ProjectStore::seeded();
            cmd_ui(&mut store, &mut prefs);
        }

        Commands::Shell { script, commands } => {
            let mut store = ProjectStore::seeded();
            cmd_shell(&mut store, &mut prefs, script, commands);
        }

        Commands::Theme { action } => cmd_theme(&mut prefs, action),

        Commands::Completions { shell } => cmd_completions(shell),
    }
}

use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// In-memory project and task dashboard.
/// Projects live for the lifetime of the process; only the theme is saved.
#[derive(Parser)]
#[command(name = "pd", version, about = "Project dashboard with tasks, stats and a Kanban board")]
pub struct Cli {
    /// Directory for settings and logs. Defaults to $PD_HOME, else ~/.pd.
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Only log errors.
    #[arg(long, short, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["pd", "shell", "--home", "/tmp/x", "-q"]).unwrap();
        assert_eq!(cli.home, Some(PathBuf::from("/tmp/x")));
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::Shell { .. }));
    }
}

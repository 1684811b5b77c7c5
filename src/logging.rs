//! Structured logging setup.

use std::fs::File;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Default filter directive for this crate.
pub fn default_directive(quiet: bool) -> &'static str {
    if quiet {
        "pd=error"
    } else {
        "pd=info"
    }
}

/// Initialise the global subscriber. `RUST_LOG` is honoured on top of the
/// default directive. With a `log_file` events go there, otherwise to stderr,
/// so the terminal UI can keep its alternate screen clean.
pub fn init_logging(quiet: bool, log_file: Option<File>) {
    let filter = EnvFilter::from_default_env().add_directive(
        default_directive(quiet)
            .parse()
            .expect("Invalid log directive"),
    );
    let registry = tracing_subscriber::registry().with(filter);

    let result = match log_file {
        Some(file) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .try_init(),
        None => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("Logging already initialised: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_parses() {
        for quiet in [true, false] {
            let directive: Result<tracing_subscriber::filter::Directive, _> =
                default_directive(quiet).parse();
            assert!(directive.is_ok());
        }
    }
}

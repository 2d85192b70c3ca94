//! CLI command implementations

use anyhow::Result;
use clap::Subcommand;

pub mod compare;
pub mod generate_config;
pub mod recalculate;
pub mod repair;
pub mod validate;

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Score model annotations against expert annotations
    Compare(compare::CompareArgs),

    /// Recompute position accuracy of stored metrics
    Recalculate(recalculate::RecalculateArgs),

    /// Repair stale span offsets in annotated texts
    Repair(repair::RepairArgs),

    /// Write a settings file template
    GenerateConfig(generate_config::GenerateConfigArgs),

    /// Check a settings file
    Validate(validate::ValidateArgs),
}

impl Commands {
    /// Run the selected command
    pub fn execute(&self) -> Result<()> {
        match self {
            Commands::Compare(args) => args.execute(),
            Commands::Recalculate(args) => args.execute(),
            Commands::Repair(args) => args.execute(),
            Commands::GenerateConfig(args) => args.execute(),
            Commands::Validate(args) => args.execute(),
        }
    }
}

/// Initialize logging based on verbosity level.
///
/// Repeated calls keep the first logger, so commands can run more than
/// once in a process.
pub(crate) fn init_logging(verbose: u8, quiet: bool) {
    let log_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .try_init();
}

/// Print a bounded error list with a count of suppressed messages
pub(crate) fn print_errors(errors: &[String], suppressed: usize) {
    for error in errors {
        println!("  - {error}");
    }
    if suppressed > 0 {
        println!("  ... and {suppressed} more");
    }
}

//! spanagree command-line entry point

use anyhow::Result;
use clap::Parser;
use spanagree_cli::commands::Commands;

/// Span agreement scoring for labeled text annotations
#[derive(Debug, Parser)]
#[command(name = "spanagree", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.command.execute()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_compare_flags() {
        let cli = Cli::try_parse_from([
            "spanagree",
            "compare",
            "-i",
            "texts.json",
            "--threshold",
            "0.5",
            "--require-label-match",
            "-f",
            "json",
            "-vv",
        ])
        .unwrap();

        match cli.command {
            Commands::Compare(args) => {
                assert_eq!(args.input, vec!["texts.json"]);
                assert_eq!(args.threshold, Some(0.5));
                assert!(args.require_label_match);
                assert_eq!(args.verbose, 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

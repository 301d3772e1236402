//! CLI argument parsing for the golffox-worker binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "golffox-worker", about = "GolfFox route optimization worker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the worker server (default if no subcommand given)
    Serve,
    /// Optimize a single route request read from a JSON file and print the result
    Optimize {
        /// Path to a RouteOptimizationOptions JSON document
        #[arg(long)]
        request: PathBuf,
    },
    /// Print dispatcher advice for a trip with the given number of passengers
    Suggest {
        passengers: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_no_command_defaults_to_none() {
        let cli = Cli::parse_from(["golffox-worker"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_serve_command_parses() {
        let cli = Cli::parse_from(["golffox-worker", "serve"]);
        assert!(matches!(cli.command, Some(Command::Serve)));
    }

    #[test]
    fn test_cli_optimize_command_parses() {
        let cli = Cli::parse_from(["golffox-worker", "optimize", "--request", "trip.json"]);
        match cli.command {
            Some(Command::Optimize { request }) => assert_eq!(request, PathBuf::from("trip.json")),
            _ => panic!("expected optimize command"),
        }
    }

    #[test]
    fn test_cli_suggest_command_parses() {
        let cli = Cli::parse_from(["golffox-worker", "suggest", "7"]);
        assert!(matches!(cli.command, Some(Command::Suggest { passengers: 7 })));
    }

    #[test]
    fn test_cli_suggest_rejects_negative() {
        assert!(Cli::try_parse_from(["golffox-worker", "suggest", "-3"]).is_err());
    }
}

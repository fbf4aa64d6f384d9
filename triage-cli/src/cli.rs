//! CLI argument parsing definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about = "Staged HTTP load generator for the hospital record service", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error) or a RUST_LOG style filter
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the staged load test
    Run {
        /// Base URL of the application under test
        #[arg(long, value_name = "URL")]
        host: Option<String>,

        /// Seed for reproducible task sequences and form bodies
        #[arg(long, value_name = "N")]
        seed: Option<u64>,

        /// Write the final report as JSON to this file
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,

        /// Stop after this long even if the profile has not finished (e.g. 90s, 5m)
        #[arg(long, value_name = "DURATION", value_parser = parse_duration_arg)]
        max_run_time: Option<Duration>,
    },

    /// Print the load profile as a timeline without sending requests
    Shape {
        /// Sampling step of the timeline in seconds
        #[arg(long, value_name = "SECONDS", default_value_t = 30)]
        step: u64,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(long, value_name = "PATH")]
        config_file: PathBuf,
    },

    /// Generate a sample configuration file with every default spelled out
    Generate {
        /// Output file path
        #[arg(long, value_name = "PATH")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration in use
    Show {
        /// Output format: yaml, json
        #[arg(long, value_name = "FORMAT", default_value = "yaml")]
        format: String,
    },
}

fn parse_duration_arg(value: &str) -> Result<Duration, String> {
    triage_config::parse_duration(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_arguments() {
        let cli = Cli::try_parse_from([
            "triage",
            "--log-level",
            "debug",
            "run",
            "--host",
            "http://10.1.1.1:8888",
            "--seed",
            "7",
            "--max-run-time",
            "90s",
            "--report",
            "out.json",
        ])
        .unwrap();

        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Some(Commands::Run {
                host,
                seed,
                report,
                max_run_time,
            }) => {
                assert_eq!(host.as_deref(), Some("http://10.1.1.1:8888"));
                assert_eq!(seed, Some(7));
                assert_eq!(report, Some(PathBuf::from("out.json")));
                assert_eq!(max_run_time, Some(Duration::from_secs(90)));
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["triage", "shape", "--config", "triage.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("triage.yaml")));
        assert!(matches!(cli.command, Some(Commands::Shape { step: 30 })));
    }

    #[test]
    fn test_bad_duration_rejected() {
        assert!(Cli::try_parse_from(["triage", "run", "--max-run-time", "soon"]).is_err());
    }
}

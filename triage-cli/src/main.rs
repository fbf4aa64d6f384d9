mod cli;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, ConfigCommands};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use triage_config::{ConfigLoader, TriageConfig};
use triage_http::{HttpClient, HttpManager};
use triage_logging::{init_logging, init_simple_tracing, TracingObserver};
use triage_runner::Orchestrator;

/// Load configuration from a file or the environment
fn load_config(config_path: Option<&PathBuf>) -> Result<TriageConfig> {
    let loader = ConfigLoader::new();

    match config_path {
        Some(path) => {
            if path.exists() {
                info!("Loading configuration from: {:?}", path);
                loader
                    .from_file(path)
                    .context(format!("Failed to load configuration from {:?}", path))
            } else {
                warn!("Configuration file not found: {:?}. Using defaults.", path);
                loader
                    .from_env()
                    .context("Failed to load configuration from environment")
            }
        }
        None => {
            debug!("No configuration file specified. Loading from environment or defaults.");
            loader
                .from_env()
                .context("Failed to load configuration from environment")
        }
    }
}

/// Run the staged load test and print the report
async fn run_command(
    mut config: TriageConfig,
    host: Option<String>,
    seed: Option<u64>,
    report_path: Option<PathBuf>,
    max_run_time: Option<Duration>,
) -> Result<()> {
    if let Some(host) = host {
        config.target.host = host;
    }
    if seed.is_some() {
        config.load.seed = seed;
    }
    if max_run_time.is_some() {
        config.load.max_run_time = max_run_time;
    }
    let report_path = report_path.or_else(|| config.reporting.report_path.clone());

    let client = HttpManager::with_config(&config.target.host, config.http.clone().into())
        .context("Failed to create HTTP client")?;
    let client: Arc<dyn HttpClient> = Arc::new(client);

    let orchestrator = Orchestrator::from_config(&config, client)
        .context("Invalid load test configuration")?
        .with_observer(Arc::new(TracingObserver::new(
            config.reporting.slow_request_threshold,
        )));

    info!(
        "Target: {} at {}",
        config.target.name, config.target.host
    );

    let interrupt = CancellationToken::new();
    let ctrl_c = interrupt.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping virtual users");
            ctrl_c.cancel();
        }
    });

    let report = orchestrator
        .run(interrupt)
        .await
        .context("Load test aborted")?;

    println!();
    print!("{}", output::render_report(&report));

    if let Some(path) = report_path {
        write_json_report(&path, &report)?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

fn write_json_report(path: &Path, report: &triage_core::RunReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("Failed to create report directory")?;
        }
    }
    let document = serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "report": report,
    });
    let json = serde_json::to_string_pretty(&document).context("Failed to serialize report")?;
    fs::write(path, json).context(format!("Failed to write report to {:?}", path))
}

/// Print the profile timeline
fn shape_command(config: &TriageConfig, step: u64) -> Result<()> {
    let shape = config.load.shape().context("Invalid load profile")?;
    print!(
        "{}",
        output::render_timeline(&shape, Duration::from_secs(step))
    );
    Ok(())
}

/// Handle configuration validation
fn handle_config_validate(config_file: &PathBuf) -> Result<()> {
    info!("Validating configuration file: {:?}", config_file);

    if !config_file.exists() {
        return Err(anyhow::anyhow!(
            "Configuration file not found: {:?}",
            config_file
        ));
    }

    match ConfigLoader::new().from_file(config_file) {
        Ok(config) => {
            triage_runner::TaskCatalog::hospital_with_weights(&config.user.task_weights)
                .context("Invalid task weights")?;
            println!("✅ Configuration file is valid");
            info!("Configuration validation passed");
            Ok(())
        }
        Err(e) => {
            println!("❌ Configuration validation failed: {}", e);
            error!("Configuration validation failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handle configuration generation
fn handle_config_generate(output: &PathBuf, force: bool) -> Result<()> {
    info!("Generating configuration at: {:?}", output);

    if output.exists() && !force {
        return Err(anyhow::anyhow!(
            "Output file already exists: {:?}. Use --force to overwrite.",
            output
        ));
    }

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("Failed to create output directory")?;
        }
    }

    fs::write(output, TriageConfig::generate_sample())
        .context(format!("Failed to write configuration to {:?}", output))?;
    println!("✅ Configuration written to {}", output.display());
    Ok(())
}

/// Handle configuration display
fn handle_config_show(config: &TriageConfig, format: &str) -> Result<()> {
    match format.to_lowercase().as_str() {
        "yaml" | "yml" => {
            let yaml_output =
                serde_yaml::to_string(config).context("Failed to serialize to YAML")?;
            println!("{}", yaml_output);
        }
        "json" => {
            let json_output =
                serde_json::to_string_pretty(config).context("Failed to serialize to JSON")?;
            println!("{}", json_output);
        }
        other => {
            return Err(anyhow::anyhow!(
                "Unsupported format: {}. Use 'yaml' or 'json'",
                other
            ))
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config subcommands only need console output
    if let Some(Commands::Config { config_cmd }) = &cli.command {
        init_simple_tracing(cli.log_level.as_deref().unwrap_or("warn"))?;
        return match config_cmd {
            ConfigCommands::Validate { config_file } => handle_config_validate(config_file),
            ConfigCommands::Generate { output, force } => handle_config_generate(output, *force),
            ConfigCommands::Show { format } => {
                let config = load_config(cli.config.as_ref())?;
                handle_config_show(&config, format)
            }
        };
    }

    let config = load_config(cli.config.as_ref())?;
    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard =
        init_logging(&config.logging, cli.log_level.as_deref()).context("Failed to set up logging")?;

    match cli.command {
        Some(Commands::Run {
            host,
            seed,
            report,
            max_run_time,
        }) => run_command(config, host, seed, report, max_run_time).await,
        Some(Commands::Shape { step }) => shape_command(&config, step),
        Some(Commands::Config { .. }) => Ok(()),
        None => {
            // If no subcommand is provided, print help
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            cmd.print_help().context("Failed to print help")?;
            println!();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::StatsCollector;

    #[test]
    fn test_generate_then_validate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("triage.yaml");

        handle_config_generate(&path, false).unwrap();
        assert!(handle_config_generate(&path, false).is_err());
        handle_config_generate(&path, true).unwrap();

        handle_config_validate(&path).unwrap();
    }

    #[test]
    fn test_validate_rejects_unknown_task() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triage.yaml");
        fs::write(&path, "user:\n  task_weights:\n    view_unicorns: 3\n").unwrap();
        assert!(handle_config_validate(&path).is_err());
    }

    #[test]
    fn test_json_report_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("run.json");
        let report = StatsCollector::new(3).finish(Duration::from_secs(2));

        write_json_report(&path, &report).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["report"]["total"]["requests"], 0);
        assert!(written["generated_at"].is_string());
    }
}

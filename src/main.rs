//! SurveyDash - survey feedback dashboard
//!
//! A CLI tool that loads survey responses from a spreadsheet-backed
//! endpoint, aggregates the scores and writes a dashboard report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Load failure or runtime error (network, config, report write, etc.)
//!   2 - Action items found with --fail-on-action-items

mod analysis;
mod cli;
mod config;
mod loader;
mod models;
mod report;

use analysis::{AnalysisOptions, Dashboard};
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use loader::{DataLoader, DataSource, LoadFailure, LoaderConfig, TROUBLESHOOTING};
use models::ReportMetadata;
use report::Report;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("SurveyDash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_dashboard(args).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            if let Some(failure) = e.downcast_ref::<LoadFailure>() {
                print_load_failure(failure);
            } else {
                error!("Dashboard failed: {:#}", e);
                eprintln!("\n❌ Error: {:#}", e);
            }
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .surveydash.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            config::DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", config::DEFAULT_CONFIG_FILE);
    println!("   Edit it to set the source URL, threshold and report format.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Print the failure banner with troubleshooting steps.
fn print_load_failure(failure: &LoadFailure) {
    eprintln!("\n❌ Failed to Load Dashboard Data");
    eprintln!("   {}", failure);
    eprintln!("\nTroubleshooting Steps:");
    for step in TROUBLESHOOTING {
        eprintln!("   • {}", step);
    }
}

/// Load, aggregate and report. Returns exit code (0 or 2).
async fn run_dashboard(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let source = match args.input {
        Some(ref path) => DataSource::File { path: path.clone() },
        None => DataSource::Remote {
            url: config.source.url.clone(),
        },
    };

    // Step 1: Load the dataset (single fetch, no retry)
    let loader_config = LoaderConfig {
        show_progress: !args.quiet,
        ..LoaderConfig::from(&config.source)
    };
    let loader = DataLoader::new(loader_config)?;
    let dataset = loader.load(&source).await?;

    if dataset.is_empty() {
        warn!("Source returned no rows");
    }

    // Step 2: Aggregate
    let options = AnalysisOptions::from(&config.analysis);
    let dashboard = Dashboard::build(&dataset, &options);

    let metadata = ReportMetadata {
        source: source.to_string(),
        generated_at: Utc::now(),
        rows_loaded: dataset.len(),
        action_threshold: options.action_threshold,
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };
    let report = Report::new(metadata, dashboard);

    // Step 3: Render and write
    let output = match config.report.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => {
            report::generate_markdown_report(&report, config.report.bar_width)
        }
    };

    let to_stdout = config.report.output == "-";
    if to_stdout {
        println!("{}", output);
    } else {
        std::fs::write(&config.report.output, &output)
            .with_context(|| format!("Failed to write report to {}", config.report.output))?;
    }

    if !args.quiet && !to_stdout {
        println!("\n📊 Dashboard Summary:");
        println!("   Responses: {}", report.metadata.rows_loaded);
        println!("{}", report::terminal_summary(&report.dashboard));
        println!(
            "\n✅ Dashboard complete! Report saved to: {}",
            config.report.output
        );
    }

    let action_count = report.dashboard.action_items.count();
    if args.fail_on_action_items && action_count > 0 {
        eprintln!(
            "\n⛔ {} action item(s) below {:.1}. Failing (exit code 2).",
            action_count, options.action_threshold
        );
        return Ok(2);
    }

    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", config::DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

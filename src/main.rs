//! Sysmetrics Pipeline CLI
//!
//! Collects host utilization samples and runs the batch analytics
//! pipeline over them.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use sysmetrics_pipeline::{
    collector::{Collector, CollectorConfig},
    config::Config,
    pipeline, VERSION,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sysmetrics")]
#[command(version = VERSION)]
#[command(about = "Host resource-utilization pipeline", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect system metrics from the local machine
    Collect {
        /// Path for the raw metrics CSV
        #[arg(long, default_value = "data/raw/metrics_collected.csv")]
        output: PathBuf,

        /// Collection duration in seconds
        #[arg(long, default_value_t = 60)]
        duration: u64,

        /// Sampling interval in seconds
        #[arg(long, default_value_t = 1)]
        interval: u64,
    },

    /// Run the pipeline over an existing raw metrics CSV
    Run {
        /// Path to the raw metrics CSV
        #[arg(long, default_value = "data/raw/metrics_collected.csv")]
        input: PathBuf,

        /// Directory for processed tables and analytics
        #[arg(long, default_value = "data")]
        output: PathBuf,

        /// Window sizes in seconds (defaults to the configured list)
        #[arg(long, num_args = 1..)]
        window_sizes: Option<Vec<u64>>,

        /// Path to the configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show configuration
    Config,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Collect {
            output,
            duration,
            interval,
        } => {
            cmd_collect(output, duration, interval);
        }
        Commands::Run {
            input,
            output,
            window_sizes,
            config,
        } => {
            cmd_run(input, output, window_sizes, config);
        }
        Commands::Config => {
            cmd_config();
        }
    }
}

fn cmd_collect(output: PathBuf, duration: u64, interval: u64) {
    info!("collecting system metrics from the local machine");

    if let Some(parent) = output.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            error!("could not create {}: {e}", parent.display());
            std::process::exit(1);
        }
    }

    let mut collector = Collector::new(CollectorConfig {
        output_path: output,
        duration_secs: duration,
        interval_secs: interval,
    });

    let stop = collector.stop_flag();
    ctrlc::set_handler(move || {
        stop.store(true, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    match collector.run() {
        Ok(path) => info!("raw metrics written to {}", path.display()),
        Err(e) => {
            error!("collection failed: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_run(
    input: PathBuf,
    output: PathBuf,
    window_sizes: Option<Vec<u64>>,
    config_path: Option<PathBuf>,
) {
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let sizes = window_sizes.unwrap_or_else(|| config.windows.default.clone());

    match pipeline::run(&config, &input, &output, &sizes) {
        Ok(report) => {
            info!(
                "pipeline completed successfully: {} valid rows, {} window tables",
                report.stats.final_count,
                report.outputs.len()
            );
        }
        Err(e) => {
            error!("pipeline failed: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_config() {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

fn load_config(path: Option<PathBuf>) -> Result<Config, sysmetrics_pipeline::config::ConfigError> {
    match path {
        Some(path) => Config::load_from(&path),
        None => Config::load(),
    }
}

/// Route all diagnostics through one leveled channel.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

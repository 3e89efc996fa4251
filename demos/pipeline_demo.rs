//! Demo: synthesize a raw metrics CSV and run the full pipeline over it.
//!
//! Run with: cargo run --example pipeline_demo

use std::fmt::Write as _;
use std::path::PathBuf;
use sysmetrics_pipeline::config::Config;
use sysmetrics_pipeline::pipeline;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let demo_dir = demo_dir();
    std::fs::create_dir_all(&demo_dir).expect("could not create demo directory");

    let input = demo_dir.join("metrics_demo.csv");
    std::fs::write(&input, synthetic_csv(180)).expect("could not write demo CSV");
    println!("Synthetic raw metrics: {}", input.display());

    let config = Config::default();
    let report = pipeline::run(&config, &input, &demo_dir, &[10, 30]).expect("pipeline failed");

    println!();
    println!("Validated rows: {}", report.stats.final_count);
    for output in &report.outputs {
        println!(
            "{:>3}s windows: {:>3} rows -> {}",
            output.window_secs,
            output.total_windows,
            output.table_path.display()
        );
    }
    if let Some(path) = &report.plot_series_path {
        println!("Plot series: {}", path.display());
    }
}

fn demo_dir() -> PathBuf {
    std::env::temp_dir().join("sysmetrics-demo")
}

/// A deterministic load profile: a CPU burst in the middle and a memory
/// ramp towards the end, plus a handful of rows the validator will reject.
fn synthetic_csv(seconds: u32) -> String {
    let mut csv = String::from(
        "timestamp,cpu_user_percent,cpu_system_percent,cpu_idle_percent,memory_used_percent,disk_used_percent\n",
    );

    for s in 0..seconds {
        let burst = if (60..90).contains(&s) { 55.0 } else { 0.0 };
        let cpu_user = 8.0 + burst + (s % 5) as f64;
        let cpu_system = 4.0 + (s % 3) as f64;
        let cpu_idle = 100.0 - cpu_user - cpu_system;
        let memory = if s > 150 { 92.5 } else { 45.0 + (s % 7) as f64 };
        let disk = 55.0;

        let _ = writeln!(
            csv,
            "2025-03-14T12:{:02}:{:02},{cpu_user:.1},{cpu_system:.1},{cpu_idle:.1},{memory:.1},{disk:.1}",
            s / 60,
            s % 60
        );
    }

    // Rows the validator should drop and log
    csv.push_str("2025-03-14T11:59:59,10.0,5.0,85.0,45.0,55.0\n");
    csv.push_str("garbage,10.0,5.0,85.0,45.0,55.0\n");
    csv.push_str("2025-03-14T12:03:01,120.0,5.0,85.0,45.0,55.0\n");

    csv
}

//! CLI Entry Point for kinematic-monitor
//!
//! Provides command-line interface for:
//! - Replaying exported keypoint CSVs through the analyzer (one stream per file)
//! - Sweeping window sizes over one recording
//! - Printing the effective configuration
//!
//! # Usage
//!
//! Analyze two recordings concurrently:
//! ```bash
//! kinematic-monitor analyze walk_a.csv walk_b.csv --config monitor.toml --output results
//! ```
//!
//! Window-size sensitivity:
//! ```bash
//! kinematic-monitor sweep walk_a.csv --windows 5,10,20,30,60
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use kinematic_monitor::core::TriggerEvent;
use kinematic_monitor::data::registry::SinkRegistry;
use kinematic_monitor::replay::{self, ReplaySummary};
use kinematic_monitor::{logging, MonitorConfig, StreamAnalyzer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "kinematic-monitor")]
#[command(about = "Windowed kinematic analysis and anomaly triggering for pose keypoints", long_about = None)]
struct Cli {
    /// TOML configuration file (environment overrides still apply)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay keypoint CSVs, writing metrics.csv and trigger output per file
    Analyze {
        /// Keypoint CSV files (Frame,Person,Keypoint_Index,Keypoint_X,Keypoint_Y)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Person index to follow in each file
        #[arg(long, default_value = "0")]
        person: u32,

        /// Output directory (defaults to storage.output_dir)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print smoothness and MSI for several trailing window sizes
    Sweep {
        input: PathBuf,

        #[arg(long, default_value = "0")]
        person: u32,

        #[arg(long, value_delimiter = ',', default_value = "5,10,20,30,60")]
        windows: Vec<usize>,
    },

    /// Print the effective configuration (file plus environment) as TOML
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => MonitorConfig::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => MonitorConfig::load().context("Failed to load config")?,
    };
    config.validate()?;
    logging::init_from_config(&config)?;

    match cli.command {
        Commands::Analyze {
            inputs,
            person,
            output,
        } => analyze(config, inputs, person, output).await,
        Commands::Sweep {
            input,
            person,
            windows,
        } => sweep(config, &input, person, &windows),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

async fn analyze(
    config: MonitorConfig,
    inputs: Vec<PathBuf>,
    person: u32,
    output: Option<PathBuf>,
) -> Result<()> {
    let registry = Arc::new(SinkRegistry::new());
    if !registry.contains(&config.storage.sink) {
        bail!(
            "Unknown trigger sink '{}'. Available: {}",
            config.storage.sink,
            registry.names().join(", ")
        );
    }
    let output_root = output.unwrap_or_else(|| config.storage.output_dir.clone());
    let config = Arc::new(config);

    // Each file is an independent stream with its own analyzer.
    let mut tasks = Vec::with_capacity(inputs.len());
    for input in inputs {
        let output_dir = output_root.join(stream_name(&input));
        let config = Arc::clone(&config);
        let registry = Arc::clone(&registry);
        let handle = tokio::task::spawn_blocking(move || {
            replay::replay_file(&config, &registry, &input, person, &output_dir)
                .with_context(|| format!("Failed to analyze {}", input.display()))
        });
        tasks.push(handle);
    }

    let mut failures = 0usize;
    for task in tasks {
        match task.await? {
            Ok(summary) => print_summary(&summary),
            Err(e) => {
                error!("{e:#}");
                failures += 1;
            }
        }
    }
    if failures > 0 {
        bail!("{failures} stream(s) failed");
    }
    info!("All streams analysed");
    Ok(())
}

fn sweep(mut config: MonitorConfig, input: &Path, person: u32, windows: &[usize]) -> Result<()> {
    let frames = replay::read_keypoint_file(input, person, config.analysis.joint_count)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    // Buffer enough history for the largest window; triggers are irrelevant here.
    config.analysis.window_size = windows.iter().copied().max().unwrap_or(0);
    config.analysis.jad_enabled = false;
    let mut analyzer = StreamAnalyzer::new(&config, Box::new(|_: TriggerEvent| {}))?;
    for (frame_index, record) in frames {
        analyzer.ingest(record, frame_index)?;
    }

    println!("{:>8}  {:>14}  {:>14}", "window", "smoothness", "msi");
    for row in analyzer.sweep(windows)? {
        println!(
            "{:>8}  {:>14}  {:>14}",
            row.window,
            display_metric(row.motion_smoothness),
            display_metric(row.msi)
        );
    }
    Ok(())
}

fn stream_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "stream".to_string())
}

fn display_metric(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.4}"))
}

fn print_summary(summary: &ReplaySummary) {
    let output = summary
        .output_dir
        .as_deref()
        .map(|dir| dir.display().to_string())
        .unwrap_or_default();
    println!(
        "{output}: {} frames, {} trigger(s) {:?}",
        summary.frames,
        summary.fired_frames.len(),
        summary.fired_frames
    );
}

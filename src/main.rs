mod config;
mod output;
mod pipeline;

use std::io::BufRead;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "line_composer",
    about = "Extract regex matches from text files and compose them into templated records"
)]
struct Cli {
    /// Input text files, scanned in order
    files: Vec<PathBuf>,
    /// Config document with default/output/input/replace sections
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Directory for the Result_<timestamp>.txt file
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
    /// Leave input files untouched instead of rewriting them with matched lines
    #[arg(long)]
    no_writeback: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    info!("Loading config {}", cli.config.display());
    let config = config::load_config(&cli.config)?;
    info!(
        "Configured {} patterns, {} output fields, {} defaults, {} replace rules",
        config.input.len(),
        config.output.len(),
        config.defaults.len(),
        config.replace.len()
    );

    if cli.files.is_empty() {
        warn!("No files for parsing specified");
        println!("\nPass one or more text files to convert, or drag them onto this executable.");
        println!("Press Enter to exit...");
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("failed to read from stdin")?;
        return Ok(());
    }

    let opts = pipeline::RunOptions {
        out_dir: cli.out_dir,
        writeback: !cli.no_writeback,
    };
    let report = pipeline::run(config, &cli.files, &opts)?;
    println!(
        "Composed {} items into {} ({} input files rewritten).",
        report.items,
        report.result_path.display(),
        report.files_rewritten
    );

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

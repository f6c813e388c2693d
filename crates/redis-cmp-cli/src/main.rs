//! redis-cmp CLI - verify that two Redis instances hold identical data.

use clap::Parser;
use redis_cmp::{
    CompareConfig, CompareError, Orchestrator, RangeMode, ScanConfig, StoreConfig,
    COUNT_MISMATCH_LINE,
};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{warn, Level};

#[derive(Parser)]
#[command(name = "redis-cmp")]
#[command(about = "Redis data compare tool")]
#[command(override_usage = "redis-cmp --server1 redis://...... --server2 redis://......")]
#[command(version)]
struct Cli {
    /// Redis server compare source, e.g. redis://:password@localhost:6379/0
    #[arg(long)]
    server1: String,

    /// Redis server compare target, e.g. redis://:password@localhost:6379/0
    #[arg(long)]
    server2: String,

    /// COUNT hint for each SCAN page
    #[arg(long, default_value = "5000")]
    scan_count: usize,

    /// Cap on concurrently running batch workers (default: unbounded)
    #[arg(long)]
    max_workers: Option<usize>,

    /// Per-command read timeout in seconds
    #[arg(long, default_value = "120")]
    read_timeout: u64,

    /// Read list and sorted-set ranges as [1, len] for parity with earlier reports (skips the first element)
    #[arg(long)]
    legacy_ranges: bool,

    /// Output JSON run summary to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,
}

impl Cli {
    fn to_config(&self) -> CompareConfig {
        CompareConfig {
            source: StoreConfig::new(self.server1.clone()),
            target: StoreConfig::new(self.server2.clone()),
            scan: ScanConfig {
                scan_count: self.scan_count,
                read_timeout_secs: self.read_timeout,
                max_workers: self.max_workers,
                range_mode: if self.legacy_ranges {
                    RangeMode::Legacy
                } else {
                    RangeMode::Full
                },
            },
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let start = Instant::now();
    match run().await {
        Ok(()) => {
            println!("\nRunning cost=[{:.3?}]", start.elapsed());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), CompareError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format).map_err(CompareError::Config)?;

    let orchestrator = Orchestrator::new(cli.to_config()).await?;

    // Informational only; the per-key scan runs regardless.
    match orchestrator.check_key_counts().await {
        Ok(check) => {
            println!("{}", check.summary_line());
            if !check.counts_match() {
                println!("{}", COUNT_MISMATCH_LINE);
            }
        }
        Err(e) => warn!("Key count check failed: {}", e),
    }

    let summary = orchestrator.run().await?;

    println!("\nCompare job done!");
    println!("  Run ID: {}", summary.run_id);
    println!("  Pages: {}", summary.batches);
    println!("  Keys checked: {}", summary.keys_checked);
    println!("  Mismatched: {}", summary.mismatches);
    println!("  Retrieval errors: {}", summary.errors);

    if cli.output_json {
        println!("{}", summary.to_json()?);
    }

    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr; stdout carries the comparison report.
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        "json" => subscriber.json().init(),
        "text" => subscriber.init(),
        other => return Err(format!("unknown log format '{}'", other)),
    }

    Ok(())
}

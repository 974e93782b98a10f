use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use shardkv::BatchConfig;
use shardkv::load_test::{LoadTestConfig, LoadTestReport, run_load_test};
use shardkv::oplog::execute_file;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shardkv")]
#[command(about = "Run operation logs against a bucket-locked map with ordered worker threads")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute an operation log and write the result log
    Run {
        input: PathBuf,
        output: PathBuf,
        #[arg(long)]
        buckets: Option<usize>,
        /// Overrides the worker count from the log header
        #[arg(long)]
        workers: Option<usize>,
        /// JSON file with `map` and `pipeline` sections
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Time a random workload with 1..=max-workers workers
    Bench {
        #[arg(long, default_value_t = 10_000)]
        ops: usize,
        #[arg(long, default_value_t = 1000)]
        keys: i64,
        #[arg(long, default_value_t = 4)]
        max_workers: usize,
        #[arg(long, default_value_t = 100)]
        buckets: usize,
        #[arg(long, default_value_t = 0)]
        padding_us: u64,
        #[arg(long, default_value_t = 0x9e3779b97f4a7c15)]
        seed: u64,
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            input,
            output,
            buckets,
            workers,
            config,
        } => run_log(&input, &output, buckets, workers, config.as_deref()).await,
        Command::Bench {
            ops,
            keys,
            max_workers,
            buckets,
            padding_us,
            seed,
            json,
        } => {
            let config = LoadTestConfig {
                operations: ops,
                key_space: keys,
                max_workers,
                buckets,
                padding: Duration::from_micros(padding_us),
                seed,
            };
            bench(config, json).await
        }
    }
}

async fn run_log(
    input: &Path,
    output: &Path,
    buckets: Option<usize>,
    workers: Option<usize>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => load_config(path).await?,
        None => BatchConfig::default(),
    };
    if let Some(buckets) = buckets {
        config.map = config.map.num_buckets(buckets);
    }

    let report = execute_file(input, output, config, workers)
        .await
        .with_context(|| format!("failed to execute {}", input.display()))?;

    println!(
        "{} operations, {} workers, {:.2}ms -> {}",
        report.operations,
        report.workers,
        report.elapsed.as_secs_f64() * 1000.0,
        output.display()
    );
    Ok(())
}

async fn load_config(path: &Path) -> Result<BatchConfig> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read config {}", path.display()))?;
    BatchConfig::from_json(&text).with_context(|| format!("invalid config {}", path.display()))
}

async fn bench(config: LoadTestConfig, json: bool) -> Result<()> {
    let report = tokio::task::spawn_blocking(move || run_load_test(&config))
        .await
        .context("benchmark task failed")??;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if !report.outputs_match {
        bail!("result lines differ between worker counts");
    }
    Ok(())
}

fn print_report(report: &LoadTestReport) {
    println!(
        "ops={} buckets={} padding={}us",
        report.operations, report.buckets, report.padding_us
    );
    let baseline = report.samples.first().map(|s| s.elapsed_ms).unwrap_or(0.0);
    for sample in &report.samples {
        let speedup = if sample.elapsed_ms > 0.0 {
            baseline / sample.elapsed_ms
        } else {
            0.0
        };
        println!(
            "workers={:<3} elapsed={:>10.2}ms  ops/s={:>12.0}  speedup={:.2}x",
            sample.workers, sample.elapsed_ms, sample.ops_per_sec, speedup
        );
    }
    println!("outputs match: {}", report.outputs_match);
}

//! Enconv - Command-Line Entry Point
//!
//! Bulk text-encoding normalizer for files and directory trees.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use enconv::types::{ConversionRequest, EngineConfig};
use enconv::BatchConverter;

/// Detect and convert text file encodings in bulk.
#[derive(Parser)]
#[command(name = "enconv")]
#[command(version, about, long_about = None)]
struct Cli {
    /// File or directory to convert
    path: PathBuf,

    /// Target encoding (e.g. UTF-8, GBK, UTF-16LE)
    #[arg(short, long, default_value = "UTF-8")]
    to: String,

    /// Only convert files whose detected encoding matches this allow-list
    /// (e.g. "GBK|GB18030")
    #[arg(short = 's', long = "source")]
    source: Option<String>,

    /// Only convert files whose extension matches this allow-list
    /// (e.g. "txt|md|csv")
    #[arg(short = 'f', long = "files")]
    files: Option<String>,

    /// Process files one at a time instead of concurrently
    #[arg(long)]
    sequential: bool,

    /// Maximum number of concurrent file tasks
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Emit the final report as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; diagnostics go to stderr so stdout stays clean
    // for the report.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "enconv=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = EngineConfig::from_env();
    if let Some(jobs) = cli.jobs {
        config = config.with_max_workers(jobs);
    }

    let mut request = ConversionRequest::new(cli.path, cli.to);
    if let Some(source) = cli.source {
        request = request.with_source_filter(source);
    }
    if let Some(files) = cli.files {
        request = request.with_file_filter(files);
    }

    let runner = BatchConverter::new(config);
    let report = if cli.sequential {
        runner.convert_sequential(&request)?
    } else {
        runner.convert(&request).await?
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("converted:        {}", report.converted);
        println!("skipped (unknown):  {}", report.skipped_unknown);
        println!("skipped (filtered): {}", report.skipped_filtered);
        println!("skipped (unmapped): {}", report.skipped_unmapped);
        println!("failed:           {}", report.failed);
        println!("rejected by name: {}", report.rejected_by_name);
    }

    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the traffic accident ingestion tool.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use traffic_accidents_database::memory::MemoryStore;
use traffic_accidents_ingest::{DEFAULT_BATCH_SIZE, import_files};
use traffic_accidents_source::registry::{all_sources, download, source_for_year};

#[derive(Parser)]
#[command(
    name = "traffic_accidents_ingest",
    about = "Traffic accident data ingestion tool"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the yearly spreadsheets published by the open data portal
    Sources,
    /// Download yearly spreadsheets from the open data portal
    ///
    /// The files are saved as `<year>.xlsx`. Export the first sheet of each
    /// to CSV before passing it to `check` or `ACCIDENTS_CSV`; xlsx files
    /// are not read directly.
    Download {
        /// Only download this year. If not specified, all years are downloaded.
        #[arg(long)]
        year: Option<i32>,
        /// Directory the spreadsheets are written to
        #[arg(long, default_value = "data")]
        output_dir: PathBuf,
    },
    /// Parse CSV exports and load them into an in-memory store, reporting
    /// how many records survive conversion
    Check {
        /// CSV files, one per year
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Number of records upserted per batch
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,
        /// Year the files cover, used to tag log lines
        #[arg(long)]
        year: Option<i32>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    match cli.command {
        Commands::Sources => {
            println!("{:<6} URL", "YEAR");
            println!("{}", "-".repeat(80));
            for source in all_sources() {
                println!("{:<6} {}", source.year, source.url);
            }
        }
        Commands::Download { year, output_dir } => {
            let sources = match year {
                Some(year) => vec![source_for_year(year)?],
                None => all_sources().iter().collect(),
            };

            for source in sources {
                match download(source, &output_dir).await {
                    Ok(path) => log::info!(
                        "Saved {} to {} (export it to CSV before running check)",
                        source.year,
                        path.display()
                    ),
                    Err(e) => log::error!("Failed to download {}: {e}", source.year),
                }
            }
        }
        Commands::Check {
            paths,
            batch_size,
            year,
        } => {
            if let Some(year) = year {
                log::info!("Importing accident data for {year}");
            }
            let start = Instant::now();
            let store = MemoryStore::new();
            let summary = import_files(&store, &paths, batch_size).await?;

            log::info!(
                "Import complete: {} records from {} file(s) ({} failed, {} rows skipped) in {:.1}s",
                summary.records_upserted,
                summary.files_imported,
                summary.files_failed,
                summary.rows_skipped,
                start.elapsed().as_secs_f64()
            );
        }
    }

    Ok(())
}

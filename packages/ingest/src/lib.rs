#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Library for importing yearly traffic accident spreadsheets into an
//! [`AccidentStore`].
//!
//! The spreadsheets are read as CSV exports of their first sheet, one
//! accident per row:
//!
//! | column | content |
//! |---|---|
//! | 0 | accident ID |
//! | 1 | police department |
//! | 2 | police station |
//! | 3 | date and time, `DD.MM.YYYY,HH:MM` |
//! | 4 | longitude |
//! | 5 | latitude |
//! | 6 | accident type |
//! | 7 | category |
//! | 8 | description (optional) |
//!
//! Coordinates are repaired on the way in; type and category strings are
//! stored verbatim.

use std::borrow::Cow;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use traffic_accidents_database::{AccidentStore, DbError};
use traffic_accidents_database_models::AccidentRecord;
use traffic_accidents_source::coordinates::{Axis, parse_coordinate};
use traffic_accidents_source::parsing::{parse_accident_id, parse_date_time};

/// Number of records upserted per store call.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Errors that can occur while importing a file.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// CSV reading failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Store write failed.
    #[error("Store error: {0}")]
    Db(#[from] DbError),

    /// Batch size of zero was requested.
    #[error("Batch size must be at least 1")]
    InvalidBatchSize,
}

/// Why a single row could not be converted into a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    /// The accident ID cell is not an integer.
    #[error("invalid accident ID {0:?}")]
    InvalidId(String),

    /// The date-time cell is not `DD.MM.YYYY,HH:MM`.
    #[error("invalid date-time {0:?}")]
    InvalidDateTime(String),
}

/// Outcome of importing a set of files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Files imported without error.
    pub files_imported: usize,
    /// Files that failed and were skipped.
    pub files_failed: usize,
    /// Records written across all files.
    pub records_upserted: u64,
    /// Rows skipped because they could not be parsed.
    pub rows_skipped: u64,
}

/// Converts one spreadsheet row into a record.
///
/// Returns `Ok(None)` for rows whose first cell is empty (trailing blank
/// rows in the export).
///
/// # Errors
///
/// Returns [`RowError`] if the ID or date-time cell is malformed.
pub fn record_from_cells(cells: &[&str]) -> Result<Option<AccidentRecord>, RowError> {
    let cell = |i: usize| cells.get(i).copied().unwrap_or_default();

    let id_cell = cell(0);
    if id_cell.trim().is_empty() {
        return Ok(None);
    }

    let accident_id =
        parse_accident_id(id_cell).ok_or_else(|| RowError::InvalidId(id_cell.to_string()))?;
    let date_time = parse_date_time(cell(3))
        .ok_or_else(|| RowError::InvalidDateTime(cell(3).to_string()))?;

    let description = Some(cell(8).trim())
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    Ok(Some(AccidentRecord {
        accident_id,
        pdepartment: cell(1).to_string(),
        pstation: cell(2).to_string(),
        date_time,
        longitude: parse_coordinate(cells.get(4).copied(), Axis::Longitude),
        latitude: parse_coordinate(cells.get(5).copied(), Axis::Latitude),
        accident_type: cell(6).to_string(),
        category: cell(7).to_string(),
        description,
    }))
}

/// Reads every convertible row from CSV data.
///
/// Malformed rows are logged and skipped; a non-numeric ID on the first
/// line is taken to be a header row. Bytes that are not valid UTF-8 are
/// replaced with `U+FFFD`. Returns the records and the number of skipped
/// rows.
///
/// # Errors
///
/// Returns [`IngestError::Csv`] if the data is not readable as CSV.
pub fn read_records<R: Read>(reader: R) -> Result<(Vec<AccidentRecord>, u64), IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut skipped = 0u64;

    for (index, row) in csv_reader.byte_records().enumerate() {
        let row = row?;
        let owned: Vec<Cow<'_, str>> = row.iter().map(String::from_utf8_lossy).collect();
        let cells: Vec<&str> = owned.iter().map(AsRef::as_ref).collect();
        match record_from_cells(&cells) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(RowError::InvalidId(_)) if index == 0 => {
                log::debug!("Treating first row as header");
            }
            Err(e) => {
                log::warn!("Skipping row {}: {e}", index + 1);
                skipped += 1;
            }
        }
    }

    Ok((records, skipped))
}

/// Reads every convertible row from the CSV file at `path`.
///
/// # Errors
///
/// Returns [`IngestError::Csv`] if the file cannot be opened or read.
pub fn read_file(path: &Path) -> Result<(Vec<AccidentRecord>, u64), IngestError> {
    let file = std::fs::File::open(path).map_err(csv::Error::from)?;
    read_records(file)
}

/// Upserts `records` in batches of `batch_size`, logging progress after each
/// batch.
///
/// # Errors
///
/// Returns [`IngestError`] if `batch_size` is zero or a batch fails to
/// write. Batches written before the failure stay written.
pub async fn import_records(
    store: &dyn AccidentStore,
    records: &[AccidentRecord],
    batch_size: usize,
) -> Result<u64, IngestError> {
    if batch_size == 0 {
        return Err(IngestError::InvalidBatchSize);
    }

    let total = records.len();
    let mut inserted = 0u64;
    let mut processed = 0usize;

    for batch in records.chunks(batch_size) {
        inserted += store.upsert_batch(batch).await?;
        processed += batch.len();
        log::info!("  Progress: {processed}/{total} records upserted...");
    }

    Ok(inserted)
}

/// Imports each CSV file in turn. A file that fails is logged and skipped;
/// the remaining files are still imported.
///
/// # Errors
///
/// Returns [`IngestError::InvalidBatchSize`] if `batch_size` is zero.
pub async fn import_files(
    store: &dyn AccidentStore,
    paths: &[PathBuf],
    batch_size: usize,
) -> Result<ImportSummary, IngestError> {
    if batch_size == 0 {
        return Err(IngestError::InvalidBatchSize);
    }

    let mut summary = ImportSummary::default();

    for path in paths {
        let start = Instant::now();
        log::info!("Processing {}...", path.display());

        let result = match read_file(path) {
            Ok((records, skipped)) => {
                summary.rows_skipped += skipped;
                log::info!("  Upserting {} records...", records.len());
                import_records(store, &records, batch_size).await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(count) => {
                summary.files_imported += 1;
                summary.records_upserted += count;
                log::info!(
                    "  Imported {count} records from {} in {:.1}s",
                    path.display(),
                    start.elapsed().as_secs_f64()
                );
            }
            Err(e) => {
                summary.files_failed += 1;
                log::error!("  Failed to import {}: {e}", path.display());
            }
        }
    }

    Ok(summary)
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Spreadsheet source registry and record normalization logic.
//!
//! Raw accident spreadsheets published on `data.gov.rs` carry coordinates
//! that sometimes lost their decimal point on export and free-text type and
//! category strings with inconsistent spelling. The modules here repair the
//! former ([`coordinates`]) and canonicalize the latter ([`labels`]). None of
//! the normalization functions fail: values that cannot be resolved degrade
//! to a sentinel or are passed through.

pub mod coordinates;
pub mod labels;
pub mod parsing;
pub mod registry;

/// Errors that can occur while fetching source spreadsheets.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No download is registered for the requested year.
    #[error("No data source registered for year {year}")]
    UnknownYear {
        /// The year that was requested.
        year: i32,
    },
}

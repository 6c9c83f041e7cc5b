//! Registry of the yearly accident spreadsheets published on `data.gov.rs`.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt as _;

use crate::SourceError;

/// A yearly spreadsheet published by the Ministry of Interior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataSource {
    /// Calendar year covered by the spreadsheet.
    pub year: i32,
    /// Download URL.
    pub url: &'static str,
}

/// All known yearly spreadsheets, oldest first.
const DATA_SOURCES: &[DataSource] = &[
    DataSource {
        year: 2020,
        url: "https://data.gov.rs/sr/datasets/r/05df84c8-925c-4b71-b77f-899faa73be48",
    },
    DataSource {
        year: 2021,
        url: "https://data.gov.rs/sr/datasets/r/14dc2a35-1d23-40ce-ab14-8872b7c552f4",
    },
    DataSource {
        year: 2022,
        url: "https://data.gov.rs/sr/datasets/r/725bc318-e00e-4db3-aa1f-ab5ff5100799",
    },
    DataSource {
        year: 2023,
        url: "https://data.gov.rs/sr/datasets/r/fe778c8a-d02b-4a3e-abbf-4c5acc724a44",
    },
    DataSource {
        year: 2024,
        url: "https://data.gov.rs/sr/datasets/r/9fc37c8a-d90f-4442-82fc-4203ab6f5f77",
    },
    DataSource {
        year: 2025,
        url: "https://data.gov.rs/sr/datasets/r/a86a3683-000e-481b-9111-c1326966c460",
    },
];

/// Returns all registered data sources, oldest first.
#[must_use]
pub const fn all_sources() -> &'static [DataSource] {
    DATA_SOURCES
}

/// Looks up the data source for `year`.
///
/// # Errors
///
/// Returns [`SourceError::UnknownYear`] if no spreadsheet is registered for
/// that year.
pub fn source_for_year(year: i32) -> Result<&'static DataSource, SourceError> {
    DATA_SOURCES
        .iter()
        .find(|s| s.year == year)
        .ok_or(SourceError::UnknownYear { year })
}

/// Downloads the spreadsheet for `source` into `output_dir`, returning the
/// path of the written file (`<year>.xlsx`).
///
/// The importer reads CSV only, so the sheet must be exported to CSV
/// before it can be loaded.
///
/// # Errors
///
/// Returns [`SourceError`] if the request fails, the server responds with a
/// non-success status, or the file cannot be written.
pub async fn download(source: &DataSource, output_dir: &Path) -> Result<PathBuf, SourceError> {
    log::info!("Downloading {} from {}...", source.year, source.url);

    let response = reqwest::get(source.url).await?.error_for_status()?;
    let bytes = response.bytes().await?;

    tokio::fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(format!("{}.xlsx", source.year));
    let mut file = tokio::fs::File::create(&path).await?;
    file.write_all(&bytes).await?;
    file.flush().await?;

    log::info!("Downloaded {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_are_sorted_and_unique() {
        let years: Vec<i32> = all_sources().iter().map(|s| s.year).collect();
        assert_eq!(years, [2020, 2021, 2022, 2023, 2024, 2025]);
    }

    #[test]
    fn looks_up_by_year() {
        let source = source_for_year(2023).unwrap();
        assert!(source.url.contains("fe778c8a"));
        assert!(matches!(
            source_for_year(2019),
            Err(SourceError::UnknownYear { year: 2019 })
        ));
    }
}

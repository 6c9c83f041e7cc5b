#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Accident record and filter descriptor types.
//!
//! [`AccidentRecord`] is the shape of a persisted accident.
//! [`FilterDescriptor`] is the validated output of query compilation and the
//! only input the storage layer needs to select records. Both are distinct
//! from the API response types in `traffic_accidents_server_models`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A traffic accident as persisted in the store.
///
/// `accident_type` and `category` hold the spreadsheet strings verbatim.
/// Coordinates are either within Serbia's bounding box or `0.0` when the
/// source value was missing or unrepairable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccidentRecord {
    /// Natural key from the source spreadsheet, used for upserts.
    pub accident_id: i64,
    /// Police department (regional directorate) name.
    pub pdepartment: String,
    /// Police station (municipality) name.
    pub pstation: String,
    /// When the accident happened.
    pub date_time: DateTime<Utc>,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Severity class storage string.
    pub accident_type: String,
    /// Collision configuration storage string.
    pub category: String,
    /// Free-text description.
    pub description: Option<String>,
}

/// An inclusive range of calendar years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRange {
    min_year: i32,
    max_year: i32,
    #[serde(skip)]
    listed: Vec<i32>,
    #[serde(skip)]
    start: DateTime<Utc>,
    #[serde(skip)]
    end: DateTime<Utc>,
}

impl YearRange {
    /// Creates a range covering `min_year` through `max_year`.
    ///
    /// Returns `None` if `min_year > max_year` or either year is outside
    /// the range `chrono` can represent.
    #[must_use]
    pub fn new(min_year: i32, max_year: i32) -> Option<Self> {
        if min_year > max_year {
            return None;
        }
        let start = NaiveDate::from_ymd_opt(min_year, 1, 1)?
            .and_hms_opt(0, 0, 0)?
            .and_utc();
        let end = NaiveDate::from_ymd_opt(max_year, 12, 31)?
            .and_hms_opt(23, 59, 59)?
            .and_utc();
        let listed = if min_year == max_year {
            vec![min_year]
        } else {
            vec![min_year, max_year]
        };
        Some(Self {
            min_year,
            max_year,
            listed,
            start,
            end,
        })
    }

    /// Creates the smallest range covering every year in `years`.
    ///
    /// Years between the extremes are included even if not listed.
    #[must_use]
    pub fn spanning(years: &[i32]) -> Option<Self> {
        let min = years.iter().copied().min()?;
        let max = years.iter().copied().max()?;
        Some(Self {
            listed: years.to_vec(),
            ..Self::new(min, max)?
        })
    }

    /// First year of the range.
    #[must_use]
    pub const fn min_year(&self) -> i32 {
        self.min_year
    }

    /// Last year of the range.
    #[must_use]
    pub const fn max_year(&self) -> i32 {
        self.max_year
    }

    /// The years the range was built from, in their original order.
    ///
    /// For a range built with [`YearRange::new`] these are the bounds.
    #[must_use]
    pub fn listed(&self) -> &[i32] {
        &self.listed
    }

    /// January 1st, `00:00:00` UTC of the first year.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// December 31st, `23:59:59` UTC of the last year.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether `at` falls within the range.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// An inclusive timestamp range, either bound optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Creates a range from optional bounds.
    ///
    /// Returns `None` if both bounds are present and `end < start`.
    #[must_use]
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Option<Self> {
        if let (Some(s), Some(e)) = (start, end)
            && e < s
        {
            return None;
        }
        Some(Self { start, end })
    }

    /// Lower bound, if any.
    #[must_use]
    pub const fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    /// Upper bound, if any.
    #[must_use]
    pub const fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    /// Whether `at` falls within the range.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.is_none_or(|s| s <= at) && self.end.is_none_or(|e| at <= e)
    }
}

/// A validated, fully-resolved accident filter.
///
/// Produced fresh per request by the filter compiler and never mutated.
/// Type and category filters hold storage strings, not filter codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDescriptor {
    location_key: String,
    year_range: Option<YearRange>,
    date_range: Option<DateRange>,
    accident_type: Option<String>,
    categories: Option<Vec<String>>,
}

impl FilterDescriptor {
    /// Assembles a descriptor from already-validated parts.
    ///
    /// An empty category list is stored as `None`.
    #[must_use]
    pub fn new(
        location_key: String,
        year_range: Option<YearRange>,
        date_range: Option<DateRange>,
        accident_type: Option<String>,
        categories: Option<Vec<String>>,
    ) -> Self {
        Self {
            location_key,
            year_range,
            date_range,
            accident_type,
            categories: categories.filter(|c| !c.is_empty()),
        }
    }

    /// Station or municipality name to match.
    #[must_use]
    pub fn location_key(&self) -> &str {
        &self.location_key
    }

    /// Requested year span, if any.
    #[must_use]
    pub const fn year_range(&self) -> Option<&YearRange> {
        self.year_range.as_ref()
    }

    /// Requested date span, if any.
    #[must_use]
    pub const fn date_range(&self) -> Option<&DateRange> {
        self.date_range.as_ref()
    }

    /// Accident type storage string to match, if any.
    #[must_use]
    pub fn accident_type(&self) -> Option<&str> {
        self.accident_type.as_deref()
    }

    /// Category storage strings to match (any of), if any.
    #[must_use]
    pub fn categories(&self) -> Option<&[String]> {
        self.categories.as_deref()
    }
}

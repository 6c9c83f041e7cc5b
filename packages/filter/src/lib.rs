#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Compiles raw accident query parameters into a [`FilterDescriptor`].
//!
//! Validation runs in a fixed order and stops at the first parameter that
//! fails: location key, years, dates, accident type, categories. Filter
//! codes are resolved to storage strings before they enter the descriptor,
//! so the storage layer can match them directly without further checks.
//! Compilation is pure: no I/O, no shared state.

mod error;

use std::sync::LazyLock;

use chrono::{DateTime, Datelike as _, NaiveDate, Utc};
use regex::Regex;
use traffic_accidents_accident_models::{AccidentCategory, AccidentType};
use traffic_accidents_database_models::{DateRange, FilterDescriptor, YearRange};
use traffic_accidents_source::labels::{LabelKind, code_to_storage_value};

pub use error::{FilterField, ValidationFailure};

/// Earliest year a request may ask for.
pub const MIN_YEAR: i32 = 2000;

/// Maximum length of the location key, in characters.
pub const MAX_LOCATION_KEY_LEN: usize = 100;

static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid regex"));

/// Raw, unvalidated query parameters.
///
/// Each endpoint supplies only the parameters it supports: the
/// municipality endpoint fills `years`, the station endpoint fills the date
/// bounds. Blank values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFilterParams {
    /// Station or municipality name.
    pub location_key: Option<String>,
    /// Comma-separated years, e.g. `2020,2024`.
    pub years: Option<String>,
    /// Lower bound, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// Upper bound, `YYYY-MM-DD`.
    pub end_date: Option<String>,
    /// Accident type filter code.
    pub accident_type: Option<String>,
    /// Comma-separated category filter codes.
    pub categories: Option<String>,
}

/// Validates `params` against the current UTC year.
///
/// # Errors
///
/// Returns [`ValidationFailure`] naming the first parameter that is
/// missing, malformed, out of range, or not a known filter code.
pub fn compile_filter(params: &RawFilterParams) -> Result<FilterDescriptor, ValidationFailure> {
    compile_filter_for_year(params, Utc::now().year())
}

/// Validates `params`, accepting years up to and including `current_year`.
///
/// # Errors
///
/// Returns [`ValidationFailure`] naming the first parameter that is
/// missing, malformed, out of range, or not a known filter code.
pub fn compile_filter_for_year(
    params: &RawFilterParams,
    current_year: i32,
) -> Result<FilterDescriptor, ValidationFailure> {
    let result = compile_params(params, current_year);
    if let Err(e) = &result {
        log::debug!("Rejected filter parameters: {e}");
    }
    result
}

fn compile_params(
    params: &RawFilterParams,
    current_year: i32,
) -> Result<FilterDescriptor, ValidationFailure> {
    let location_key = parse_location_key(params.location_key.as_deref())?;

    let year_range = present(params.years.as_deref())
        .map(|years| parse_years(years, current_year))
        .transpose()?;

    let start = present(params.start_date.as_deref())
        .map(|s| parse_iso_date(FilterField::StartDate, s))
        .transpose()?;
    let end = present(params.end_date.as_deref())
        .map(|s| parse_iso_date(FilterField::EndDate, s))
        .transpose()?;
    let date_range = parse_date_range(start, end)?;

    let accident_type = present(params.accident_type.as_deref())
        .map(parse_accident_type)
        .transpose()?
        .map(|t| code_to_storage_value(LabelKind::AccidentType, t.code()).to_string());

    let categories = present(params.categories.as_deref())
        .map(parse_categories)
        .transpose()?
        .map(|categories| {
            categories
                .into_iter()
                .map(|c| code_to_storage_value(LabelKind::Category, c.code()).to_string())
                .collect()
        });

    Ok(FilterDescriptor::new(
        location_key,
        year_range,
        date_range,
        accident_type,
        categories,
    ))
}

/// Returns `value` unless it is missing or blank.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_location_key(value: Option<&str>) -> Result<String, ValidationFailure> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(ValidationFailure::new(
            FilterField::LocationKey,
            "locationKey is required",
        ));
    }
    if trimmed.chars().count() > MAX_LOCATION_KEY_LEN {
        return Err(ValidationFailure::new(
            FilterField::LocationKey,
            format!("locationKey must be at most {MAX_LOCATION_KEY_LEN} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Parses a comma-separated year list into the range spanning it.
///
/// Each token must be plain decimal digits; signs are rejected.
fn parse_years(value: &str, current_year: i32) -> Result<YearRange, ValidationFailure> {
    let mut years = Vec::new();
    for token in value.split(',') {
        let digits = token.trim();
        let year = Some(digits)
            .filter(|d| d.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|d| d.parse::<i32>().ok())
            .filter(|y| (MIN_YEAR..=current_year).contains(y))
            .ok_or_else(|| {
                ValidationFailure::with_values(
                    FilterField::Years,
                    format!(
                        "Invalid year {token:?}: expected an integer between {MIN_YEAR} and {current_year}"
                    ),
                    vec![token.to_string()],
                )
            })?;
        years.push(year);
    }

    YearRange::spanning(&years).ok_or_else(|| {
        ValidationFailure::new(FilterField::Years, "years must list at least one year")
    })
}

fn parse_iso_date(field: FilterField, value: &str) -> Result<NaiveDate, ValidationFailure> {
    if !ISO_DATE_RE.is_match(value) {
        return Err(ValidationFailure::with_values(
            field,
            format!("{field} must be in ISO format (YYYY-MM-DD)"),
            vec![value.to_string()],
        ));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        ValidationFailure::with_values(
            field,
            format!("{field} is not a valid date"),
            vec![value.to_string()],
        )
    })
}

fn parse_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Option<DateRange>, ValidationFailure> {
    if start.is_none() && end.is_none() {
        return Ok(None);
    }
    DateRange::new(start.map(start_of_day), end.map(end_of_day))
        .map(Some)
        .ok_or_else(|| {
            ValidationFailure::new(
                FilterField::StartDate,
                "startDate cannot be greater than endDate",
            )
        })
}

/// `00:00:00.000` UTC on `date`.
fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// `23:59:59.999` UTC on `date`.
fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + chrono::Duration::days(1) - chrono::Duration::milliseconds(1)
}

fn parse_accident_type(value: &str) -> Result<AccidentType, ValidationFailure> {
    value.trim().parse::<AccidentType>().map_err(|_| {
        ValidationFailure::with_values(
            FilterField::AccidentType,
            format!(
                "Invalid accidentType {value:?}: expected one of {}",
                join_codes(AccidentType::all().iter().map(|t| t.code()))
            ),
            vec![value.to_string()],
        )
    })
}

/// Parses a comma-separated category code list, keeping the first
/// occurrence of each code.
fn parse_categories(value: &str) -> Result<Vec<AccidentCategory>, ValidationFailure> {
    let mut categories = Vec::new();
    let mut invalid = Vec::new();

    for token in value.split(',').map(str::trim) {
        match token.parse::<AccidentCategory>() {
            Ok(category) => {
                if !categories.contains(&category) {
                    categories.push(category);
                }
            }
            Err(_) => invalid.push(token.to_string()),
        }
    }

    if !invalid.is_empty() {
        return Err(ValidationFailure::with_values(
            FilterField::Categories,
            format!(
                "Invalid categories: {}. Expected any of {}",
                invalid.join(", "),
                join_codes(AccidentCategory::all().iter().map(|c| c.code()))
            ),
            invalid,
        ));
    }

    Ok(categories)
}

fn join_codes<'a>(codes: impl Iterator<Item = &'a str>) -> String {
    codes.collect::<Vec<_>>().join(", ")
}

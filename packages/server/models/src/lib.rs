#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the traffic accidents server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the stored record types so the API contract can evolve on its own:
//! in particular, [`ApiAccident`] carries display labels where
//! [`AccidentRecord`] carries raw spreadsheet strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use traffic_accidents_accident_models::{AccidentCategory, AccidentType};
use traffic_accidents_database_models::{AccidentRecord, FilterDescriptor};
use traffic_accidents_filter::{FilterField, RawFilterParams, ValidationFailure};
use traffic_accidents_source::labels::{LabelKind, LabelStrategy, to_display_label};

/// Query parameters for the municipality endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MunicipalityQueryParams {
    /// Police station name to match.
    pub municipality: Option<String>,
    /// Comma-separated list of years.
    pub years: Option<String>,
}

impl From<&MunicipalityQueryParams> for RawFilterParams {
    fn from(p: &MunicipalityQueryParams) -> Self {
        Self {
            location_key: p.municipality.clone(),
            years: p.years.clone(),
            ..Self::default()
        }
    }
}

/// Query parameters for the station endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationQueryParams {
    /// Police station name to match.
    pub pstation: Option<String>,
    /// Lower date bound, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// Upper date bound, `YYYY-MM-DD`.
    pub end_date: Option<String>,
    /// Accident type filter code.
    pub accident_type: Option<String>,
    /// Comma-separated category filter codes.
    pub categories: Option<String>,
}

impl From<&StationQueryParams> for RawFilterParams {
    fn from(p: &StationQueryParams) -> Self {
        Self {
            location_key: p.pstation.clone(),
            years: None,
            start_date: p.start_date.clone(),
            end_date: p.end_date.clone(),
            accident_type: p.accident_type.clone(),
            categories: p.categories.clone(),
        }
    }
}

/// An accident as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAccident {
    /// Accident ID from the source spreadsheet.
    pub accident_id: i64,
    /// Police department name.
    pub pdepartment: String,
    /// Police station name.
    pub pstation: String,
    /// When the accident happened (ISO 8601).
    pub date_time: DateTime<Utc>,
    /// Longitude, `0` when unavailable.
    pub longitude: f64,
    /// Latitude, `0` when unavailable.
    pub latitude: f64,
    /// Accident type display label.
    pub accident_type: String,
    /// Category display label.
    pub category: String,
    /// Free-text description.
    pub description: Option<String>,
}

impl ApiAccident {
    /// Converts a stored record, translating its type and category into
    /// display labels with `strategy`.
    #[must_use]
    pub fn from_record(record: AccidentRecord, strategy: LabelStrategy) -> Self {
        Self {
            accident_type: to_display_label(
                LabelKind::AccidentType,
                &record.accident_type,
                strategy,
            ),
            category: to_display_label(LabelKind::Category, &record.category, strategy),
            accident_id: record.accident_id,
            pdepartment: record.pdepartment,
            pstation: record.pstation,
            date_time: record.date_time,
            longitude: record.longitude,
            latitude: record.latitude,
            description: record.description,
        }
    }
}

/// The years a municipality query asked for.
///
/// Serializes as the list of years, or as the string `"all"` when no
/// years were given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestedYears {
    /// No year filter.
    All,
    /// The years as listed in the request.
    Listed(Vec<i32>),
}

impl RequestedYears {
    /// The years the compiled `filter` was built from.
    #[must_use]
    pub fn from_filter(filter: &FilterDescriptor) -> Self {
        filter
            .year_range()
            .map_or(Self::All, |range| Self::Listed(range.listed().to_vec()))
    }
}

impl Serialize for RequestedYears {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_str("all"),
            Self::Listed(years) => years.serialize(serializer),
        }
    }
}

/// Response from the municipality endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MunicipalityResponse {
    /// The municipality that was matched.
    pub municipality: String,
    /// The requested years.
    pub years: RequestedYears,
    /// Number of accidents in `data`.
    pub total: usize,
    /// Matching accidents, oldest first.
    pub data: Vec<ApiAccident>,
}

/// Response from the station endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationResponse {
    /// The station that was matched.
    pub pstation: String,
    /// Number of accidents in `data`.
    pub total: usize,
    /// Matching accidents, oldest first.
    pub data: Vec<ApiAccident>,
}

/// A selectable filter value and its label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    /// Filter code to send back as a query parameter.
    pub value: String,
    /// Human-readable label.
    pub label: String,
}

/// Response from the metadata endpoint: every accepted filter code, in
/// display order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataResponse {
    /// Accident type options.
    pub accident_types: Vec<FilterOption>,
    /// Category options.
    pub categories: Vec<FilterOption>,
}

impl MetadataResponse {
    /// Lists every filter code, labelled through the canonicalizer.
    #[must_use]
    pub fn build(strategy: LabelStrategy) -> Self {
        let accident_types = AccidentType::all()
            .iter()
            .map(|t| FilterOption {
                value: t.code().to_string(),
                label: to_display_label(LabelKind::AccidentType, t.storage_value(), strategy),
            })
            .collect();
        let categories = AccidentCategory::all()
            .iter()
            .map(|c| FilterOption {
                value: c.code().to_string(),
                label: to_display_label(LabelKind::Category, c.storage_value(), strategy),
            })
            .collect();
        Self {
            accident_types,
            categories,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// `"ok"` or `"error"`.
    pub status: String,
    /// When the check ran.
    pub timestamp: DateTime<Utc>,
    /// `"connected"` or `"disconnected"`.
    pub database: String,
}

impl ApiHealth {
    /// A passing check.
    #[must_use]
    pub fn connected() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            database: "connected".to_string(),
        }
    }

    /// A failing check.
    #[must_use]
    pub fn disconnected() -> Self {
        Self {
            status: "error".to_string(),
            timestamp: Utc::now(),
            database: "disconnected".to_string(),
        }
    }
}

/// Error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Human-readable error message.
    pub error: String,
    /// Which parameter was rejected, for validation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ApiErrorDetails>,
}

/// The parameter a validation error refers to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorDetails {
    /// Query parameter name.
    pub field: FilterField,
    /// Rejected tokens.
    pub invalid_values: Vec<String>,
}

impl ApiError {
    /// An error with only a message.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}

impl From<&ValidationFailure> for ApiError {
    fn from(failure: &ValidationFailure) -> Self {
        Self {
            error: failure.message.clone(),
            details: Some(ApiErrorDetails {
                field: failure.field,
                invalid_values: failure.invalid_values.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;
    use traffic_accidents_database_models::YearRange;

    use super::*;

    fn filter(years: Option<YearRange>) -> FilterDescriptor {
        FilterDescriptor::new("Novi Sad".to_string(), years, None, None, None)
    }

    fn record(accident_type: &str, category: &str) -> AccidentRecord {
        AccidentRecord {
            accident_id: 42,
            pdepartment: "PU Novi Sad".to_string(),
            pstation: "Novi Sad".to_string(),
            date_time: Utc.with_ymd_and_hms(2023, 8, 1, 9, 15, 0).unwrap(),
            longitude: 19.84,
            latitude: 45.25,
            accident_type: accident_type.to_string(),
            category: category.to_string(),
            description: Some("Sudar".to_string()),
        }
    }

    #[test]
    fn accident_carries_display_labels() {
        let api = ApiAccident::from_record(
            record("Sa povredjenim", "SN SA PEŠACIMA"),
            LabelStrategy::Exact,
        );
        assert_eq!(api.accident_type, "Sa povređenim");
        assert_eq!(api.category, "Pešaci");

        let json = serde_json::to_value(&api).unwrap();
        assert_eq!(json["accidentId"], 42);
        assert_eq!(json["dateTime"], "2023-08-01T09:15:00Z");
    }

    #[test]
    fn strategies_differ_on_variant_spellings() {
        let raw = record("sa povređenim licima", "sn sa pesacima");
        let exact = ApiAccident::from_record(raw.clone(), LabelStrategy::Exact);
        let fuzzy = ApiAccident::from_record(raw, LabelStrategy::Fuzzy);
        assert_eq!(exact.accident_type, "sa povređenim licima");
        assert_eq!(fuzzy.accident_type, "Sa povređenim");
        assert_eq!(fuzzy.category, "Pešaci");
    }

    #[test]
    fn requested_years_serialize() {
        assert_eq!(
            serde_json::to_value(RequestedYears::from_filter(&filter(None))).unwrap(),
            "all"
        );
        let range = YearRange::spanning(&[2024, 2020]);
        assert_eq!(
            serde_json::to_value(RequestedYears::from_filter(&filter(range))).unwrap(),
            serde_json::json!([2024, 2020])
        );
    }

    #[test]
    fn query_params_map_to_filter_params() {
        let station = StationQueryParams {
            pstation: Some("Zemun".to_string()),
            start_date: Some("2024-01-01".to_string()),
            categories: Some("pesaci".to_string()),
            ..StationQueryParams::default()
        };
        let raw = RawFilterParams::from(&station);
        assert_eq!(raw.location_key.as_deref(), Some("Zemun"));
        assert_eq!(raw.start_date.as_deref(), Some("2024-01-01"));
        assert!(raw.years.is_none());

        let municipality = MunicipalityQueryParams {
            municipality: Some("Zemun".to_string()),
            years: Some("2024".to_string()),
        };
        let raw = RawFilterParams::from(&municipality);
        assert_eq!(raw.years.as_deref(), Some("2024"));
        assert!(raw.start_date.is_none());
    }

    #[test]
    fn metadata_lists_codes_in_display_order() {
        let metadata = MetadataResponse::build(LabelStrategy::Exact);
        let codes: Vec<&str> = metadata
            .accident_types
            .iter()
            .map(|o| o.value.as_str())
            .collect();
        assert_eq!(codes, ["materijalna", "povredjeni", "poginuli"]);
        assert_eq!(metadata.categories.len(), 5);
        assert_eq!(metadata.categories[0].label, "Jedno vozilo");

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["accidentTypes"][0]["label"], "Sa materijalnom štetom");
    }

    #[test]
    fn validation_error_body() {
        let failure = ValidationFailure::with_values(
            FilterField::Categories,
            "Invalid categories: foo",
            vec!["foo".to_string()],
        );
        let json = serde_json::to_value(ApiError::from(&failure)).unwrap();
        assert_eq!(json["error"], "Invalid categories: foo");
        assert_eq!(json["details"]["field"], "categories");
        assert_eq!(json["details"]["invalidValues"], serde_json::json!(["foo"]));

        let json = serde_json::to_value(ApiError::new("Too many requests")).unwrap();
        assert!(json.get("details").is_none());
    }
}

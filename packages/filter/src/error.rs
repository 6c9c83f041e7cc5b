//! Validation failure reported for malformed query parameters.

use serde::Serialize;
use strum_macros::{AsRefStr, Display};

/// Query parameter a [`ValidationFailure`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum FilterField {
    /// Station or municipality name.
    LocationKey,
    /// Comma-separated year list.
    Years,
    /// Lower date bound.
    StartDate,
    /// Upper date bound.
    EndDate,
    /// Accident type filter code.
    AccidentType,
    /// Comma-separated category filter codes.
    Categories,
}

/// A caller error in the supplied query parameters.
///
/// Always recoverable and meant to be rendered as a 400-class response.
/// When a list parameter is rejected, every offending token is named in
/// `invalid_values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{field}: {message}")]
pub struct ValidationFailure {
    /// The parameter that failed validation.
    pub field: FilterField,
    /// Human-readable description of the problem.
    pub message: String,
    /// The raw tokens that were rejected, if any.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub invalid_values: Vec<String>,
}

impl ValidationFailure {
    /// Creates a failure that names no particular token.
    #[must_use]
    pub fn new(field: FilterField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
            invalid_values: Vec::new(),
        }
    }

    /// Creates a failure naming the rejected tokens.
    #[must_use]
    pub fn with_values(
        field: FilterField,
        message: impl Into<String>,
        invalid_values: Vec<String>,
    ) -> Self {
        Self {
            field,
            message: message.into(),
            invalid_values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_are_camel_case() {
        assert_eq!(FilterField::LocationKey.to_string(), "locationKey");
        assert_eq!(FilterField::StartDate.as_ref(), "startDate");
        assert_eq!(
            serde_json::to_value(FilterField::AccidentType).unwrap(),
            "accidentType"
        );
    }

    #[test]
    fn serializes_without_empty_values() {
        let failure = ValidationFailure::new(FilterField::LocationKey, "locationKey is required");
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["field"], "locationKey");
        assert!(json.get("invalidValues").is_none());
        assert_eq!(failure.to_string(), "locationKey: locationKey is required");
    }
}

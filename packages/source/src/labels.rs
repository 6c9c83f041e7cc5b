//! Accident type and category label canonicalization.
//!
//! Stored type and category strings come straight from the spreadsheets and
//! vary in spelling between years. Two matching strategies turn them into
//! display labels:
//!
//! * [`LabelStrategy::Exact`] compares the trimmed string against the known
//!   storage strings.
//! * [`LabelStrategy::Fuzzy`] lower-cases and looks for keyword groups,
//!   accepting both diacritic and ASCII spellings (`š`/`s`, `đ`/`dj`).
//!
//! Both strategies return the trimmed input when nothing matches, and both
//! map an already-canonical label to itself.

use strum_macros::{AsRefStr, Display, EnumString};
use traffic_accidents_accident_models::{AccidentCategory, AccidentType};

/// How stored strings are matched to display labels.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LabelStrategy {
    /// Whole-string comparison against the storage table.
    #[default]
    Exact,
    /// Case-insensitive keyword containment.
    Fuzzy,
}

/// Which field a label belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    /// The severity class (`accidentType`).
    AccidentType,
    /// The collision configuration (`category`).
    Category,
}

/// Converts a stored accident type or category string into its display
/// label.
#[must_use]
pub fn to_display_label(kind: LabelKind, raw: &str, strategy: LabelStrategy) -> String {
    match kind {
        LabelKind::AccidentType => accident_type_label(raw, strategy),
        LabelKind::Category => category_label(raw, strategy),
    }
}

/// Converts a stored accident type string into its display label.
#[must_use]
pub fn accident_type_label(raw: &str, strategy: LabelStrategy) -> String {
    let trimmed = raw.trim();
    let matched = match strategy {
        LabelStrategy::Exact => AccidentType::from_storage_value(trimmed),
        LabelStrategy::Fuzzy => {
            let lower = trimmed.to_lowercase();
            AccidentType::all()
                .iter()
                .copied()
                .find(|t| contains_any(&lower, accident_type_keywords(*t)))
        }
    };
    matched.map_or_else(|| trimmed.to_string(), |t| t.label().to_string())
}

/// Converts a stored category string into its display label.
#[must_use]
pub fn category_label(raw: &str, strategy: LabelStrategy) -> String {
    let trimmed = raw.trim();
    let matched = match strategy {
        LabelStrategy::Exact => AccidentCategory::from_storage_value(trimmed),
        LabelStrategy::Fuzzy => {
            let lower = trimmed.to_lowercase();
            AccidentCategory::all()
                .iter()
                .copied()
                .find(|c| contains_any(&lower, category_keywords(*c)))
        }
    };
    matched.map_or_else(|| trimmed.to_string(), |c| c.label().to_string())
}

/// Resolves a filter code to the storage string it selects.
///
/// Unrecognized codes are passed through unchanged. A filter built from an
/// unknown code is still well-formed; it just matches no stored records.
#[must_use]
pub fn code_to_storage_value(kind: LabelKind, code: &str) -> &str {
    let storage = match kind {
        LabelKind::AccidentType => code
            .parse::<AccidentType>()
            .ok()
            .map(AccidentType::storage_value),
        LabelKind::Category => code
            .parse::<AccidentCategory>()
            .ok()
            .map(AccidentCategory::storage_value),
    };
    storage.unwrap_or(code)
}

/// Keyword groups for accident types, checked in [`AccidentType::all`]
/// order: material damage, injury, fatality.
const fn accident_type_keywords(accident_type: AccidentType) -> &'static [&'static str] {
    match accident_type {
        AccidentType::MaterialDamage => &["mat.", "materijal", "stet", "štet"],
        AccidentType::Injured => &["povred", "povređ"],
        AccidentType::Fatal => &["poginu"],
    }
}

/// Keyword groups for categories, checked in [`AccidentCategory::all`]
/// order. "bez skretan" must be tested before the turning group.
const fn category_keywords(category: AccidentCategory) -> &'static [&'static str] {
    match category {
        AccidentCategory::SingleVehicle => &["jednim vozilom", "jedno vozilo"],
        AccidentCategory::MultiVehicleNoTurn => &["bez skretan"],
        AccidentCategory::MultiVehicleTurn => &["skretanje", "prelazak"],
        AccidentCategory::Parked => &["parkiran"],
        AccidentCategory::Pedestrian => &["pešac", "pesac", "pešak", "pesak"],
    }
}

/// Checks if `haystack` contains any of the given `needles`.
fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRATEGIES: [LabelStrategy; 2] = [LabelStrategy::Exact, LabelStrategy::Fuzzy];

    #[test]
    fn exact_maps_storage_strings() {
        assert_eq!(
            accident_type_label("Sa mat.stetom", LabelStrategy::Exact),
            "Sa materijalnom štetom"
        );
        assert_eq!(
            accident_type_label("  Sa povredjenim ", LabelStrategy::Exact),
            "Sa povređenim"
        );
        assert_eq!(
            category_label("SN SA PEŠACIMA", LabelStrategy::Exact),
            "Pešaci"
        );
    }

    #[test]
    fn exact_passes_through_unmatched() {
        assert_eq!(accident_type_label("foo", LabelStrategy::Exact), "foo");
        assert_eq!(accident_type_label("  foo  ", LabelStrategy::Exact), "foo");
        assert_eq!(
            accident_type_label("SA POVREDJENIM LICIMA", LabelStrategy::Exact),
            "SA POVREDJENIM LICIMA"
        );
    }

    #[test]
    fn fuzzy_ignores_case_and_diacritics() {
        assert_eq!(
            accident_type_label("SA POVREDJENIM LICIMA", LabelStrategy::Fuzzy),
            "Sa povređenim"
        );
        assert_eq!(
            accident_type_label("sa materijalnom stetom", LabelStrategy::Fuzzy),
            "Sa materijalnom štetom"
        );
        assert_eq!(
            accident_type_label("SA POGINULIM LICEM", LabelStrategy::Fuzzy),
            "Sa poginulim"
        );
        assert_eq!(
            category_label("SN SA PESACIMA", LabelStrategy::Fuzzy),
            "Pešaci"
        );
        assert_eq!(
            category_label("sn sa najmanje dva vozila - bez skretanja", LabelStrategy::Fuzzy),
            "Najmanje dva vozila – bez skretanja"
        );
        assert_eq!(
            category_label(
                "SN SA NAJMANJE DVA VOZILA - SKRETANJE ILI PRELAZAK",
                LabelStrategy::Fuzzy
            ),
            "Najmanje dva vozila – skretanje ili prelazak"
        );
        assert_eq!(category_label(" foo ", LabelStrategy::Fuzzy), "foo");
    }

    #[test]
    fn fuzzy_priority_prefers_material_damage() {
        // A string naming both damage and injuries resolves to the first group.
        assert_eq!(
            accident_type_label("mat. steta i povredjeni", LabelStrategy::Fuzzy),
            "Sa materijalnom štetom"
        );
    }

    #[test]
    fn codes_round_trip_to_labels() {
        for strategy in STRATEGIES {
            for t in AccidentType::all() {
                let storage = code_to_storage_value(LabelKind::AccidentType, t.code());
                assert_eq!(storage, t.storage_value());
                assert_eq!(
                    to_display_label(LabelKind::AccidentType, storage, strategy),
                    t.label(),
                    "{strategy} {t:?}"
                );
            }
            for c in AccidentCategory::all() {
                let storage = code_to_storage_value(LabelKind::Category, c.code());
                assert_eq!(storage, c.storage_value());
                assert_eq!(
                    to_display_label(LabelKind::Category, storage, strategy),
                    c.label(),
                    "{strategy} {c:?}"
                );
            }
        }
    }

    #[test]
    fn unknown_codes_pass_through() {
        assert_eq!(
            code_to_storage_value(LabelKind::AccidentType, "bogus"),
            "bogus"
        );
        assert_eq!(code_to_storage_value(LabelKind::Category, "Pešaci"), "Pešaci");
        // Codes do not cross enumerations.
        assert_eq!(
            code_to_storage_value(LabelKind::Category, "poginuli"),
            "poginuli"
        );
    }

    #[test]
    fn labels_are_idempotent() {
        let inputs = AccidentType::all()
            .iter()
            .map(|t| (LabelKind::AccidentType, t.storage_value()))
            .chain(
                AccidentCategory::all()
                    .iter()
                    .map(|c| (LabelKind::Category, c.storage_value())),
            )
            .chain([
                (LabelKind::AccidentType, "SA POVREDJENIM LICIMA"),
                (LabelKind::Category, "unknown"),
            ]);

        for strategy in STRATEGIES {
            for (kind, raw) in inputs.clone() {
                let once = to_display_label(kind, raw, strategy);
                let twice = to_display_label(kind, &once, strategy);
                assert_eq!(once, twice, "{strategy} {raw:?}");
            }
        }
    }

    #[test]
    fn strategy_parses_from_name() {
        assert_eq!("exact".parse::<LabelStrategy>().unwrap(), LabelStrategy::Exact);
        assert_eq!("Fuzzy".parse::<LabelStrategy>().unwrap(), LabelStrategy::Fuzzy);
        assert!("loose".parse::<LabelStrategy>().is_err());
        assert_eq!(LabelStrategy::default(), LabelStrategy::Exact);
        assert_eq!(LabelStrategy::Fuzzy.to_string(), "fuzzy");
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Accident type and category enumerations.
//!
//! Each variant ties together three spellings of the same value: the short,
//! URL-safe filter code clients send, the exact string persisted in the
//! store (as found in the police spreadsheets), and the human-readable
//! display label. The order of [`AccidentType::all`] and
//! [`AccidentCategory::all`] is the display order advertised to clients.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Severity class of an accident.
///
/// Parses from and displays as its filter code.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum AccidentType {
    /// Material damage only
    #[serde(rename = "materijalna")]
    #[strum(serialize = "materijalna")]
    MaterialDamage,
    /// At least one person injured
    #[serde(rename = "povredjeni")]
    #[strum(serialize = "povredjeni")]
    Injured,
    /// At least one fatality
    #[serde(rename = "poginuli")]
    #[strum(serialize = "poginuli")]
    Fatal,
}

impl AccidentType {
    /// Returns the short filter code for this type.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::MaterialDamage => "materijalna",
            Self::Injured => "povredjeni",
            Self::Fatal => "poginuli",
        }
    }

    /// Returns the string this type is persisted as.
    #[must_use]
    pub const fn storage_value(self) -> &'static str {
        match self {
            Self::MaterialDamage => "Sa mat.stetom",
            Self::Injured => "Sa povredjenim",
            Self::Fatal => "Sa poginulim",
        }
    }

    /// Returns the human-readable label for this type.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MaterialDamage => "Sa materijalnom štetom",
            Self::Injured => "Sa povređenim",
            Self::Fatal => "Sa poginulim",
        }
    }

    /// Returns all variants of this enum in display order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::MaterialDamage, Self::Injured, Self::Fatal]
    }

    /// Looks up the type whose storage string equals `value` exactly.
    #[must_use]
    pub fn from_storage_value(value: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.storage_value() == value)
    }
}

/// Collision configuration of an accident.
///
/// Parses from and displays as its filter code.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum AccidentCategory {
    /// A single vehicle involved
    #[serde(rename = "jedno-vozilo")]
    #[strum(serialize = "jedno-vozilo")]
    SingleVehicle,
    /// Two or more vehicles, no turning
    #[serde(rename = "bez-skretanja")]
    #[strum(serialize = "bez-skretanja")]
    MultiVehicleNoTurn,
    /// Two or more vehicles, turning or crossing
    #[serde(rename = "skretanje-prelazak")]
    #[strum(serialize = "skretanje-prelazak")]
    MultiVehicleTurn,
    /// Involving parked vehicles
    #[serde(rename = "parkirana")]
    #[strum(serialize = "parkirana")]
    Parked,
    /// Involving pedestrians
    #[serde(rename = "pesaci")]
    #[strum(serialize = "pesaci")]
    Pedestrian,
}

impl AccidentCategory {
    /// Returns the short filter code for this category.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::SingleVehicle => "jedno-vozilo",
            Self::MultiVehicleNoTurn => "bez-skretanja",
            Self::MultiVehicleTurn => "skretanje-prelazak",
            Self::Parked => "parkirana",
            Self::Pedestrian => "pesaci",
        }
    }

    /// Returns the string this category is persisted as.
    ///
    /// These are copied verbatim from the source spreadsheets, including the
    /// `NAJMANjE`/`SKRETANjA` digraph spelling and the en dash.
    #[must_use]
    pub const fn storage_value(self) -> &'static str {
        match self {
            Self::SingleVehicle => "SN SA JEDNIM VOZILOM",
            Self::MultiVehicleNoTurn => "SN SA NAJMANjE DVA VOZILA – BEZ SKRETANjA",
            Self::MultiVehicleTurn => "SN SA NAJMANjE DVA VOZILA – SKRETANjE ILI PRELAZAK",
            Self::Parked => "SN SA PARKIRANIM VOZILIMA",
            Self::Pedestrian => "SN SA PEŠACIMA",
        }
    }

    /// Returns the human-readable label for this category.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SingleVehicle => "Jedno vozilo",
            Self::MultiVehicleNoTurn => "Najmanje dva vozila – bez skretanja",
            Self::MultiVehicleTurn => "Najmanje dva vozila – skretanje ili prelazak",
            Self::Parked => "Parkirana vozila",
            Self::Pedestrian => "Pešaci",
        }
    }

    /// Returns all variants of this enum in display order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::SingleVehicle,
            Self::MultiVehicleNoTurn,
            Self::MultiVehicleTurn,
            Self::Parked,
            Self::Pedestrian,
        ]
    }

    /// Looks up the category whose storage string equals `value` exactly.
    #[must_use]
    pub fn from_storage_value(value: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|c| c.storage_value() == value)
    }
}

//! Coordinate repair for spreadsheet imports.
//!
//! Some exports strip the decimal point from coordinates, turning
//! `20.63443` into `2063443`. Values that overshoot Serbia's bounding box
//! are shifted back into range by repeated division by ten. Missing or
//! unusable values become `0.0`, the "unavailable" sentinel, so that bad
//! geodata never rejects an otherwise valid record.

/// Longitude bounds of Serbia's bounding box.
pub const SERBIA_LONGITUDE: (f64, f64) = (18.5, 23.0);

/// Latitude bounds of Serbia's bounding box.
pub const SERBIA_LATITUDE: (f64, f64) = (41.8, 46.2);

/// Sentinel stored when a coordinate is missing or unrepairable.
pub const UNAVAILABLE: f64 = 0.0;

/// Which geographic axis a coordinate belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// East-west position.
    Longitude,
    /// North-south position.
    Latitude,
}

impl Axis {
    /// Returns the inclusive `(min, max)` bounds for this axis.
    #[must_use]
    pub const fn bounds(self) -> (f64, f64) {
        match self {
            Self::Longitude => SERBIA_LONGITUDE,
            Self::Latitude => SERBIA_LATITUDE,
        }
    }

    /// Whether `value` lies within this axis' bounds.
    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        let (min, max) = self.bounds();
        (min..=max).contains(&value)
    }
}

/// Repairs a numeric coordinate.
///
/// In-range values are returned unchanged. Values above the axis maximum
/// are divided by ten until they no longer exceed it. Values below the
/// minimum are returned as they are; there is no multiplication-based
/// repair. Zero and non-finite input yield [`UNAVAILABLE`].
#[must_use]
pub fn normalize_coordinate(value: f64, axis: Axis) -> f64 {
    if !value.is_finite() || value == 0.0 {
        return UNAVAILABLE;
    }

    if axis.contains(value) {
        return value;
    }

    let (_, max) = axis.bounds();
    let mut repaired = value;
    while repaired > max {
        repaired /= 10.0;
    }

    if !axis.contains(repaired) {
        log::debug!("Coordinate {value} ({axis:?}) is outside Serbia after repair: {repaired}");
    }

    repaired
}

/// Parses and repairs a coordinate cell.
///
/// Absent, blank, or unparseable cells yield [`UNAVAILABLE`].
#[must_use]
pub fn parse_coordinate(raw: Option<&str>, axis: Axis) -> f64 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return UNAVAILABLE;
    };

    raw.parse::<f64>().map_or_else(
        |_| {
            log::debug!("Unparseable {axis:?} value {raw:?}, storing sentinel");
            UNAVAILABLE
        },
        |value| normalize_coordinate(value, axis),
    )
}

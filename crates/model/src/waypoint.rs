use chrono::{DateTime, TimeZone, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};

use crate::{category::Category, coordinates::Coordinates, ExampleData};

/// Number of decimal places a coordinate is rounded to when deriving a
/// waypoint id. Five places are about 1.1 m at the equator.
pub const ID_PRECISION: usize = 5;

/// A user placed and persisted point annotation.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    pub description: String,
    pub category: Option<Category>,
    pub coordinates: Coordinates,
    pub timestamp: DateTime<Utc>,
}

impl HasId for Waypoint {
    type IdType = String;
}

impl Waypoint {
    pub fn new(
        description: impl Into<String>,
        category: Option<Category>,
        coordinates: Coordinates,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            description: description.into(),
            category,
            coordinates,
            timestamp,
        }
    }

    /// The id this waypoint is stored under when duplicates are deduplicated.
    pub fn derived_id(&self) -> Id<Waypoint> {
        waypoint_id(self.coordinates.latitude, self.coordinates.longitude)
    }
}

impl ExampleData for Waypoint {
    fn example_data() -> Self {
        Waypoint::new(
            "Stolen bike",
            Some(Category::Theft),
            Coordinates::new(30.4515, -91.1871),
            Utc.with_ymd_and_hms(2024, 10, 1, 18, 30, 0)
                .single()
                .unwrap_or_default(),
        )
    }
}

/// Exact ties are rounded away from zero, so `0.015625` becomes `0.01563`.
/// `{:.5}` alone would round them to even.
fn round_tie_away_from_zero(value: f64) -> Option<String> {
    // every finite f64 has at most 1074 fractional digits, so this is exact
    let exact = format!("{:.1074}", value.abs());
    let (whole, fraction) = exact.split_once('.')?;
    let (kept, rest) = fraction.split_at(ID_PRECISION);
    if !rest.starts_with('5') || rest[1..].bytes().any(|digit| digit != b'0') {
        return None;
    }
    let units = format!("{}{}", whole, kept).parse::<u128>().ok()? + 1;
    let digits = format!("{:0>width$}", units, width = ID_PRECISION + 1);
    let (whole, kept) = digits.split_at(digits.len() - ID_PRECISION);
    let sign = if value.is_sign_negative() { "-" } else { "" };
    Some(format!("{}{}.{}", sign, whole, kept))
}

fn format_rounded(value: f64) -> String {
    let formatted = round_tie_away_from_zero(value)
        .unwrap_or_else(|| format!("{:.*}", ID_PRECISION, value));
    // -0.000001 rounds to "-0.00000"; it has to collide with 0.000001.
    match formatted.strip_prefix('-') {
        Some(unsigned) if unsigned.bytes().all(|b| b == b'0' || b == b'.') => {
            unsigned.to_owned()
        }
        _ => formatted,
    }
}

/// Derives the id of a waypoint from its position: both values rounded to
/// five decimal places and joined as `"{latitude}_{longitude}"`.
pub fn waypoint_id(latitude: f64, longitude: f64) -> Id<Waypoint> {
    Id::new(format!(
        "{}_{}",
        format_rounded(latitude),
        format_rounded(longitude)
    ))
}

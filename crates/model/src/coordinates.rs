use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::geo;

use crate::ValidationError;

/// A geographic position in degrees. This is what gets persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Same as `new`, but rejects values that are not finite or lie outside
    /// of the valid degree ranges.
    pub fn checked(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if valid {
            Ok(Self::new(latitude, longitude))
        } else {
            Err(ValidationError::InvalidCoordinates)
        }
    }

    pub fn from_projected(point: ProjectedCoordinate) -> Self {
        let (longitude, latitude) = geo::to_lon_lat(point.x, point.y);
        Self::new(latitude, longitude)
    }

    pub fn to_projected(self) -> ProjectedCoordinate {
        let (x, y) = geo::from_lon_lat(self.longitude, self.latitude);
        ProjectedCoordinate::new(x, y)
    }
}

/// A position in the map's Web Mercator coordinate system, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProjectedCoordinate {
    pub x: f64,
    pub y: f64,
}

impl ProjectedCoordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance_to(&self, other: &ProjectedCoordinate) -> f64 {
        geo::projected_distance((self.x, self.y), (other.x, other.y))
    }
}

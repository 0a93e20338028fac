use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use utility::geo::HALF_WORLD_M;

use crate::{
    city::City,
    coordinates::{Coordinates, ProjectedCoordinate},
    ValidationError,
};

pub const DEFAULT_ZOOM: f64 = 12.0;
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 18.0;

const TILE_SIZE: f64 = 256.0;

/// Projected metres covered by one screen pixel at `zoom`.
pub fn resolution_at(zoom: f64) -> f64 {
    2.0 * HALF_WORLD_M / (TILE_SIZE * 2f64.powf(zoom.clamp(MIN_ZOOM, MAX_ZOOM)))
}

/// Initial view of the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ViewSettings {
    pub center: ProjectedCoordinate,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            center: City::BatonRouge.coordinates().to_projected(),
            zoom: DEFAULT_ZOOM,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

/// A pan/zoom request for the view collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ViewRequest {
    pub center: ProjectedCoordinate,
    pub zoom: f64,
    pub center_duration_ms: u32,
    pub zoom_duration_ms: u32,
}

impl ViewRequest {
    pub fn center_at(coordinates: Coordinates) -> Self {
        Self {
            center: coordinates.to_projected(),
            zoom: DEFAULT_ZOOM,
            center_duration_ms: 1000,
            zoom_duration_ms: 500,
        }
    }

    /// Parses the text of the longitude and latitude inputs. Any finite
    /// number is accepted; the projection clamps latitudes beyond the poles.
    pub fn center_on(longitude: &str, latitude: &str) -> Result<Self, ValidationError> {
        let parse = |value: &str| {
            value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or(ValidationError::InvalidCoordinates)
        };
        let coordinates = Coordinates::new(parse(latitude)?, parse(longitude)?);
        Ok(Self::center_at(coordinates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centers_on_parsed_input() {
        let request = ViewRequest::center_on(" 13.405", "52.52 ").unwrap();
        let expected = Coordinates::new(52.52, 13.405).to_projected();
        assert_eq!(request.center, expected);
        assert_eq!(request.zoom, 12.0);
        assert_eq!(request.center_duration_ms, 1000);
        assert_eq!(request.zoom_duration_ms, 500);
    }

    #[test]
    fn rejects_unparsable_input() {
        assert_eq!(
            ViewRequest::center_on("abc", "52.52"),
            Err(ValidationError::InvalidCoordinates)
        );
        assert_eq!(
            ViewRequest::center_on("13.4", ""),
            Err(ValidationError::InvalidCoordinates)
        );
        assert_eq!(
            ViewRequest::center_on("NaN", "1"),
            Err(ValidationError::InvalidCoordinates)
        );
    }

    #[test]
    fn accepts_values_outside_the_geographic_range() {
        let request = ViewRequest::center_on("200", "95").unwrap();
        assert!(request.center.is_finite());
        assert_eq!(request.center, Coordinates::new(95.0, 200.0).to_projected());
        assert_eq!(
            ViewRequest::center_on("inf", "0"),
            Err(ValidationError::InvalidCoordinates)
        );
    }

    #[test]
    fn resolution_halves_per_zoom_level() {
        assert!((resolution_at(0.0) - 156_543.033_928).abs() < 1e-3);
        assert!((resolution_at(DEFAULT_ZOOM) * 2.0 - resolution_at(11.0)).abs() < 1e-9);
        assert_eq!(resolution_at(40.0), resolution_at(MAX_ZOOM));
    }

    #[test]
    fn default_view_is_baton_rouge() {
        let view = ViewSettings::default();
        let back = Coordinates::from_projected(view.center);
        assert!((back.longitude - -91.1871).abs() < 1e-9);
        assert_eq!(view.max_zoom, 18.0);
    }
}

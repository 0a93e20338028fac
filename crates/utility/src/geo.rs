//! Conversions between geographic coordinates (longitude/latitude in degrees)
//! and the spherical Web Mercator projection (EPSG:3857) used by the map layer.

use std::f64::consts::PI;

/// Radius of the sphere used by Web Mercator, in metres.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Half the width of the projected world, in metres.
pub const HALF_WORLD_M: f64 = PI * EARTH_RADIUS_M;

/// Latitude beyond which Web Mercator is undefined in practice.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

fn to_radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

fn to_degrees(radians: f64) -> f64 {
    radians * 180.0 / PI
}

/// Projects a geographic coordinate to Web Mercator metres. Latitudes are
/// clamped to the valid range of the projection.
pub fn from_lon_lat(longitude: f64, latitude: f64) -> (f64, f64) {
    let latitude = latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = EARTH_RADIUS_M * to_radians(longitude);
    let y = EARTH_RADIUS_M * (PI / 4.0 + to_radians(latitude) / 2.0).tan().ln();
    (x, y.clamp(-HALF_WORLD_M, HALF_WORLD_M))
}

/// Converts Web Mercator metres back to `(longitude, latitude)`. Longitudes of
/// points on a wrapped copy of the world are normalized into `[-180, 180]`.
pub fn to_lon_lat(x: f64, y: f64) -> (f64, f64) {
    let mut longitude = to_degrees(x / EARTH_RADIUS_M);
    if !(-180.0..=180.0).contains(&longitude) {
        longitude = (longitude + 180.0).rem_euclid(360.0) - 180.0;
    }
    let latitude = to_degrees(2.0 * (y / EARTH_RADIUS_M).exp().atan() - PI / 2.0);
    (longitude, latitude)
}

/// Planar distance between two projected points, in projected units.
pub fn projected_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

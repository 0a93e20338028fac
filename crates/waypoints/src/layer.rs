use model::{coordinates::ProjectedCoordinate, marker::Marker};

/// The map's feature layer, as seen by the controller. Rendering itself
/// happens elsewhere; implementations only have to keep what was drawn.
pub trait MapLayer: Send + 'static {
    fn add_marker(&mut self, marker: Marker);

    fn markers(&self) -> &[Marker];

    /// Returns the marker hit by a click at `point`. `resolution` is the size
    /// of one screen pixel in projected units, so a marker is hit when the
    /// click lands within its drawn circle. The nearest hit wins.
    fn feature_at(&self, point: &ProjectedCoordinate, resolution: f64) -> Option<&Marker> {
        self.markers()
            .iter()
            .map(|marker| (marker.position.distance_to(point), marker))
            .filter(|(distance, marker)| {
                *distance <= (marker.style.radius + marker.style.stroke_width) * resolution
            })
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, marker)| marker)
    }
}

/// Keeps markers in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct FeatureLayer {
    markers: Vec<Marker>,
}

impl FeatureLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

impl MapLayer for FeatureLayer {
    fn add_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    fn markers(&self) -> &[Marker] {
        &self.markers
    }
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::Id;

use crate::{
    category::Category, coordinates::ProjectedCoordinate, waypoint::Waypoint, WithId,
};

/// Fill colors of waypoint markers, serialized as css color names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MarkerColor {
    Red,
    Orange,
    Purple,
    DarkBlue,
    Green,
    Black,
}

impl MarkerColor {
    /// Fixed lookup from category to fill color. Anything without a color of
    /// its own is drawn black.
    pub fn for_category(category: Option<&Category>) -> Self {
        match category {
            Some(Category::Theft) => Self::Red,
            Some(Category::Vandalism) => Self::Orange,
            Some(Category::Assault) => Self::Purple,
            Some(Category::AccidentHitAndRun) => Self::DarkBlue,
            Some(Category::TransactionScammed) => Self::Green,
            _ => Self::Black,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    pub radius: f64,
    pub fill: MarkerColor,
    pub stroke: MarkerColor,
    pub stroke_width: f64,
}

impl MarkerStyle {
    pub fn circle(fill: MarkerColor) -> Self {
        Self {
            radius: 10.0,
            fill,
            stroke: MarkerColor::Black,
            stroke_width: 2.0,
        }
    }
}

/// A styled point feature, as handed to the rendering layer.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub waypoint_id: Option<Id<Waypoint>>,
    pub position: ProjectedCoordinate,
    pub description: String,
    pub category: Option<Category>,
    pub style: MarkerStyle,
}

impl Marker {
    pub fn new(
        position: ProjectedCoordinate,
        description: impl Into<String>,
        category: Option<Category>,
    ) -> Self {
        let style = MarkerStyle::circle(MarkerColor::for_category(category.as_ref()));
        Self {
            waypoint_id: None,
            position,
            description: description.into(),
            category,
            style,
        }
    }

    pub fn with_waypoint_id(mut self, id: Id<Waypoint>) -> Self {
        self.waypoint_id = Some(id);
        self
    }

    /// Builds the marker of a stored waypoint, projecting its coordinates.
    pub fn for_waypoint(waypoint: &WithId<Waypoint>) -> Self {
        Self::new(
            waypoint.content.coordinates.to_projected(),
            waypoint.content.description.clone(),
            waypoint.content.category.clone(),
        )
        .with_waypoint_id(waypoint.id.clone())
    }
}

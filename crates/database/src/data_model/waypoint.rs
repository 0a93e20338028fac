use chrono::{DateTime, Utc};
use sqlx::prelude::FromRow;
use waypoints::database::{RawWaypoint, StoredWaypoint};

/// A stored waypoint.
/// Table: `waypoints`
///
/// Every column but the id is optional here: rows written by older clients
/// may lack fields, and are validated when converted.
#[derive(Debug, Clone, FromRow)]
pub struct WaypointRow {
    pub id: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<WaypointRow> for RawWaypoint {
    fn from(row: WaypointRow) -> Self {
        RawWaypoint {
            id: row.id,
            description: row.description,
            category: row.category,
            latitude: row.latitude,
            longitude: row.longitude,
            timestamp: row.timestamp,
        }
    }
}

impl WaypointRow {
    pub fn validate(self) -> StoredWaypoint {
        RawWaypoint::from(self).validate()
    }
}

#[cfg(test)]
mod tests {
    use model::category::Category;

    use super::*;

    #[test]
    fn row_without_coordinates_is_malformed() {
        let row = WaypointRow {
            id: "x".to_owned(),
            description: Some("lost".to_owned()),
            category: None,
            latitude: Some(1.0),
            longitude: None,
            timestamp: None,
        };
        assert!(matches!(row.validate(), StoredWaypoint::Malformed { .. }));
    }

    #[test]
    fn complete_row_is_valid() {
        let row = WaypointRow {
            id: "30.45150_-91.18710".to_owned(),
            description: Some("Stolen bike".to_owned()),
            category: Some("Theft".to_owned()),
            latitude: Some(30.4515),
            longitude: Some(-91.1871),
            timestamp: Some(Utc::now()),
        };
        let waypoint = row.validate().valid().unwrap();
        assert_eq!(waypoint.content.category, Some(Category::Theft));
    }
}

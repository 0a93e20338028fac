use std::{error, fmt, result};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use model::{category::Category, coordinates::Coordinates, waypoint::Waypoint, WithId};
use utility::id::Id;

#[derive(Debug)]
pub enum DatabaseError {
    NotFound,
    /// The backing service could not be reached.
    Unavailable(Box<dyn error::Error + Send + Sync>),
    Malformed(String),
    Other(Box<dyn error::Error + Send + Sync>),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::Unavailable(why) => write!(f, "unavailable: {}", why),
            Self::Malformed(why) => write!(f, "malformed record: {}", why),
            Self::Other(why) => write!(f, "{}", why),
        }
    }
}

impl error::Error for DatabaseError {}

pub type Result<T> = result::Result<T, DatabaseError>;

/// A record as returned by a full listing. Records that do not pass
/// validation at the store boundary are reported instead of dropped, so the
/// caller can log and skip them.
#[derive(Debug, Clone)]
pub enum StoredWaypoint {
    Valid(WithId<Waypoint>),
    Malformed { id: Id<Waypoint>, reason: String },
}

impl StoredWaypoint {
    pub fn valid(self) -> Option<WithId<Waypoint>> {
        match self {
            Self::Valid(waypoint) => Some(waypoint),
            Self::Malformed { .. } => None,
        }
    }
}

/// The untyped shape of a stored record, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawWaypoint {
    pub id: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl RawWaypoint {
    pub fn from_model(waypoint: &WithId<Waypoint>) -> Self {
        Self {
            id: waypoint.id.raw(),
            description: Some(waypoint.content.description.clone()),
            category: waypoint
                .content
                .category
                .as_ref()
                .map(|category| category.to_string()),
            latitude: Some(waypoint.content.coordinates.latitude),
            longitude: Some(waypoint.content.coordinates.longitude),
            timestamp: Some(waypoint.content.timestamp),
        }
    }

    pub fn validate(self) -> StoredWaypoint {
        let id = Id::new(self.id);
        let malformed = |reason: &str| StoredWaypoint::Malformed {
            id: id.clone(),
            reason: reason.to_owned(),
        };

        let (latitude, longitude) = match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => (latitude, longitude),
            _ => return malformed("missing coordinates"),
        };
        let coordinates = match Coordinates::checked(latitude, longitude) {
            Ok(coordinates) => coordinates,
            Err(_) => return malformed("coordinates out of range"),
        };
        let description = match self.description {
            Some(description) => description,
            None => return malformed("missing description"),
        };
        // Legacy records carry no timestamp; they sort first.
        let timestamp = self.timestamp.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        let category = self.category.as_deref().and_then(Category::parse);

        StoredWaypoint::Valid(WithId::new(
            id,
            Waypoint::new(description, category, coordinates, timestamp),
        ))
    }
}

/// The "waypoints" collection.
#[async_trait]
pub trait WaypointRepo {
    /// Returns whether a record with that key is present.
    async fn exists(&mut self, id: &Id<Waypoint>) -> Result<bool>;

    async fn get(&mut self, id: &Id<Waypoint>) -> Result<WithId<Waypoint>>;

    /// Writes a new record keyed by its id. An existing record is never
    /// overwritten; the return value tells whether a record was written.
    async fn create(&mut self, waypoint: WithId<Waypoint>) -> Result<bool>;

    /// Returns every stored record, ordered by timestamp and id.
    async fn list_all(&mut self) -> Result<Vec<StoredWaypoint>>;

    /// Inserts a record under a service generated id, without checking for
    /// other records at the same position.
    async fn append(&mut self, waypoint: Waypoint) -> Result<WithId<Waypoint>>;
}

/// trait to implement a waypoint store.
/// multiple concurrent accesses should be possible by e.g. cloning the database object.
pub trait Database: Clone + Send + Sync + Sized + 'static {
    type Autocommit: WaypointRepo + Send;

    fn auto(&self) -> Self::Autocommit;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawWaypoint {
        RawWaypoint {
            id: "30.45150_-91.18710".to_owned(),
            description: Some("Stolen bike".to_owned()),
            category: Some("Theft".to_owned()),
            latitude: Some(30.4515),
            longitude: Some(-91.1871),
            timestamp: None,
        }
    }

    #[test]
    fn valid_record_converts() {
        let waypoint = raw().validate().valid().unwrap();
        assert_eq!(waypoint.id.raw(), "30.45150_-91.18710");
        assert_eq!(waypoint.content.category, Some(Category::Theft));
        assert_eq!(waypoint.content.timestamp, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn missing_coordinates_are_malformed() {
        let mut record = raw();
        record.longitude = None;
        match record.validate() {
            StoredWaypoint::Malformed { id, reason } => {
                assert_eq!(id.raw(), "30.45150_-91.18710");
                assert_eq!(reason, "missing coordinates");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn empty_category_becomes_none() {
        let mut record = raw();
        record.category = Some(String::new());
        let waypoint = record.validate().valid().unwrap();
        assert_eq!(waypoint.content.category, None);
    }
}

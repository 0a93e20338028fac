use std::str::FromStr;

use chrono::Utc;
use model::{
    coordinates::Coordinates,
    form::ValidForm,
    waypoint::{waypoint_id, Waypoint},
    WithId,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::Id;

use crate::{
    database::{Database, StoredWaypoint, WaypointRepo},
    RequestResult,
};

/// How submissions at an already used position are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum DuplicatePolicy {
    /// Waypoints are keyed by their rounded position; a second submission at
    /// the same position is not written.
    #[default]
    Dedupe,
    /// Every submission is written under a generated id.
    Append,
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dedupe" => Ok(Self::Dedupe),
            "append" => Ok(Self::Append),
            other => Err(format!("unknown duplicate policy '{}'", other)),
        }
    }
}

/// Result of a save that reached the store.
#[derive(Debug, Clone)]
pub enum SaveOutcome {
    Created(WithId<Waypoint>),
    Duplicate(Id<Waypoint>),
}

#[derive(Debug, Clone)]
pub struct Client<D>
where
    D: Database,
{
    pub database: D,
}

impl<D> Client<D>
where
    D: Database,
{
    pub fn new(database: D) -> Self {
        Self { database }
    }

    pub async fn exists(&self, id: &Id<Waypoint>) -> RequestResult<bool> {
        Ok(self.database.auto().exists(id).await?)
    }

    pub async fn create(&self, waypoint: WithId<Waypoint>) -> RequestResult<bool> {
        Ok(self.database.auto().create(waypoint).await?)
    }

    pub async fn append(&self, waypoint: Waypoint) -> RequestResult<WithId<Waypoint>> {
        Ok(self.database.auto().append(waypoint).await?)
    }

    pub async fn list_all(&self) -> RequestResult<Vec<StoredWaypoint>> {
        Ok(self.database.auto().list_all().await?)
    }

    pub async fn get_waypoint(&self, id: &Id<Waypoint>) -> RequestResult<WithId<Waypoint>> {
        Ok(self.database.auto().get(id).await?)
    }

    /// All stored waypoints that pass validation.
    pub async fn get_waypoints(&self) -> RequestResult<Vec<WithId<Waypoint>>> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .filter_map(StoredWaypoint::valid)
            .collect())
    }

    /// Persists a validated form at `coordinates`.
    ///
    /// With `Dedupe` the existence check and the write are two separate
    /// calls; a concurrent writer at the same position can slip in between.
    /// The store never overwrites, so the loser gets `Duplicate`.
    pub async fn save(
        &self,
        form: ValidForm,
        coordinates: Coordinates,
        policy: DuplicatePolicy,
    ) -> RequestResult<SaveOutcome> {
        let waypoint = Waypoint::new(form.description, form.category, coordinates, Utc::now());
        match policy {
            DuplicatePolicy::Append => {
                let waypoint = self.append(waypoint).await?;
                Ok(SaveOutcome::Created(waypoint))
            }
            DuplicatePolicy::Dedupe => {
                let id = waypoint_id(coordinates.latitude, coordinates.longitude);
                if self.exists(&id).await? {
                    return Ok(SaveOutcome::Duplicate(id));
                }
                let waypoint = WithId::new(id.clone(), waypoint);
                if self.create(waypoint.clone()).await? {
                    Ok(SaveOutcome::Created(waypoint))
                } else {
                    Ok(SaveOutcome::Duplicate(id))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use model::{category::Category, form::FormInput};

    use super::*;
    use crate::memory::MemoryDatabase;

    fn form(description: &str) -> ValidForm {
        FormInput::new(description, Some("Theft")).validate(true).unwrap()
    }

    #[tokio::test]
    async fn write_then_list_round_trips() {
        let client = Client::new(MemoryDatabase::new());
        let coordinates = Coordinates::new(30.4515, -91.1871);
        let outcome = client
            .save(form("Stolen bike"), coordinates, DuplicatePolicy::Dedupe)
            .await
            .unwrap();
        assert!(matches!(outcome, SaveOutcome::Created(_)));

        let stored = client.get_waypoints().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id.raw(), "30.45150_-91.18710");
        assert_eq!(stored[0].content.description, "Stolen bike");
        assert_eq!(stored[0].content.category, Some(Category::Theft));
        assert_eq!(stored[0].content.coordinates, coordinates);
    }

    #[tokio::test]
    async fn dedupe_saves_once() {
        let database = MemoryDatabase::new();
        let client = Client::new(database.clone());
        let coordinates = Coordinates::new(52.52, 13.405);
        client
            .save(form("first"), coordinates, DuplicatePolicy::Dedupe)
            .await
            .unwrap();
        let outcome = client
            .save(form("first"), coordinates, DuplicatePolicy::Dedupe)
            .await
            .unwrap();
        assert!(matches!(outcome, SaveOutcome::Duplicate(id) if id.raw() == "52.52000_13.40500"));
        assert_eq!(database.len(), 1);
    }

    #[tokio::test]
    async fn append_saves_every_submission() {
        let database = MemoryDatabase::new();
        let client = Client::new(database.clone());
        let coordinates = Coordinates::new(52.52, 13.405);
        for _ in 0..2 {
            client
                .save(form("again"), coordinates, DuplicatePolicy::Append)
                .await
                .unwrap();
        }
        assert_eq!(database.len(), 2);
    }

    #[tokio::test]
    async fn unavailable_store_surfaces_as_store_unavailable() {
        let client = Client::new(MemoryDatabase::unavailable());
        let result = client
            .save(
                form("x"),
                Coordinates::new(0.0, 0.0),
                DuplicatePolicy::Dedupe,
            )
            .await;
        assert!(matches!(result, Err(ref why) if why.is_unavailable()));
    }

    #[test]
    fn policy_parses_from_env_values() {
        assert_eq!("Append".parse::<DuplicatePolicy>(), Ok(DuplicatePolicy::Append));
        assert_eq!(" dedupe ".parse::<DuplicatePolicy>(), Ok(DuplicatePolicy::Dedupe));
        assert!("sometimes".parse::<DuplicatePolicy>().is_err());
    }
}

//! Map sessions. Every browser gets a controller of its own, so one
//! client's open form never receives another client's double-click.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;
use uuid::Uuid;
use waypoints::{
    client::Client,
    controller::{ControllerRef, LoadOutcome},
    database::Database,
    layer::FeatureLayer,
    server::Server,
    RequestError, RequestResult,
};

pub struct Sessions<D>
where
    D: Database,
{
    server: Arc<Server<D>>,
    controllers: Arc<RwLock<HashMap<String, ControllerRef>>>,
}

impl<D> Clone for Sessions<D>
where
    D: Database,
{
    fn clone(&self) -> Self {
        Self {
            server: self.server.clone(),
            controllers: self.controllers.clone(),
        }
    }
}

impl<D> Sessions<D>
where
    D: Database,
{
    pub fn new(server: Server<D>) -> Self {
        Self {
            server: Arc::new(server),
            controllers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn client(&self) -> Client<D> {
        self.server.client()
    }

    /// Starts a controller with its own feature layer, replays the stored
    /// waypoints into it and registers it under a fresh session id.
    pub async fn open(&self) -> RequestResult<(String, LoadOutcome)> {
        let (controller, outcome) = self.server.controller(FeatureLayer::new()).await?;
        let id = Uuid::new_v4().to_string();
        self.controllers
            .write()
            .await
            .insert(id.clone(), controller);
        log::debug!("opened map session {} ({} waypoints)", id, outcome.loaded);
        Ok((id, outcome))
    }

    pub async fn get(&self, id: &str) -> RequestResult<ControllerRef> {
        self.controllers
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(RequestError::NotFound)
    }

    /// Drops the session. Its controller stops once the last handle is gone.
    pub async fn close(&self, id: &str) -> RequestResult<()> {
        self.controllers
            .write()
            .await
            .remove(id)
            .map(|_| log::debug!("closed map session {}", id))
            .ok_or(RequestError::NotFound)
    }

    pub async fn len(&self) -> usize {
        self.controllers.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use model::{coordinates::Coordinates, form::FormInput};
    use waypoints::{
        controller::{ControllerSettings, ControllerState},
        memory::MemoryDatabase,
    };

    use super::*;

    fn sessions(database: &MemoryDatabase) -> Sessions<MemoryDatabase> {
        Sessions::new(Server::new(database.clone(), ControllerSettings::default()))
    }

    #[tokio::test]
    async fn sessions_keep_separate_pending_positions() {
        let sessions = sessions(&MemoryDatabase::new());
        let (a, _) = sessions.open().await.unwrap();
        let (b, _) = sessions.open().await.unwrap();
        assert_ne!(a, b);

        let berlin = Coordinates::new(52.52, 13.405).to_projected();
        sessions.get(&a).await.unwrap().cancel().await.unwrap();
        sessions.get(&b).await.unwrap().double_click(berlin).await.unwrap();

        let state_a = sessions.get(&a).await.unwrap().state().await.unwrap();
        let state_b = sessions.get(&b).await.unwrap().state().await.unwrap();
        assert_eq!(state_a, ControllerState::Idle);
        assert_eq!(state_b, ControllerState::Pending { coordinate: berlin });
    }

    #[tokio::test]
    async fn new_session_replays_what_others_stored() {
        let database = MemoryDatabase::new();
        let sessions = sessions(&database);
        let (first, _) = sessions.open().await.unwrap();
        let controller = sessions.get(&first).await.unwrap();
        controller
            .double_click(Coordinates::new(30.4515, -91.1871).to_projected())
            .await
            .unwrap();
        controller
            .submit(FormInput::new("Stolen bike", Some("Theft")))
            .await
            .unwrap();

        let (_, outcome) = sessions.open().await.unwrap();
        assert_eq!(outcome.loaded, 1);
    }

    #[tokio::test]
    async fn closed_session_is_gone() {
        let sessions = sessions(&MemoryDatabase::new());
        let (id, _) = sessions.open().await.unwrap();
        sessions.close(&id).await.unwrap();
        assert!(matches!(sessions.get(&id).await, Err(RequestError::NotFound)));
        assert!(matches!(sessions.close(&id).await, Err(RequestError::NotFound)));
        assert_eq!(sessions.len().await, 0);
    }
}

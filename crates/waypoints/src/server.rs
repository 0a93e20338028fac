use crate::{
    client::Client,
    controller::{self, Controller, ControllerRef, ControllerSettings, LoadOutcome},
    database::Database,
    layer::MapLayer,
    RequestResult,
};

/// Owns the store and hands out clients and running controllers.
pub struct Server<D>
where
    D: Database,
{
    database: D,
    settings: ControllerSettings,
}

impl<D> Server<D>
where
    D: Database,
{
    pub fn new(database: D, settings: ControllerSettings) -> Self {
        Self { database, settings }
    }

    pub fn settings(&self) -> ControllerSettings {
        self.settings
    }

    pub fn client(&self) -> Client<D> {
        Client::new(self.database.clone())
    }

    /// Spawns a controller drawing into `layer` and replays the stored
    /// waypoints into it before returning.
    pub async fn controller<L: MapLayer>(
        &self,
        layer: L,
    ) -> RequestResult<(ControllerRef, LoadOutcome)> {
        let controller = controller::spawn(Controller::new(self.client(), layer, self.settings));
        let outcome = controller.load().await?;
        Ok((controller, outcome))
    }
}

//! The waypoint sync controller.
//!
//! One interaction runs through `Idle -> Pending -> (validate, check, write)
//! -> Idle`. The pending position lives in the `Pending` state itself. A
//! controller is driven through its event queue: `spawn` moves it onto a
//! task that handles one `ControllerEvent` at a time, and `ControllerRef` is
//! the handle used to send those events.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use model::{
    coordinates::{Coordinates, ProjectedCoordinate},
    form::FormInput,
    marker::Marker,
    waypoint::Waypoint,
    ValidationError, WithId,
};
use schemars::JsonSchema;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use utility::id::Id;

use crate::{
    client::{Client, DuplicatePolicy, SaveOutcome},
    database::{Database, StoredWaypoint},
    layer::MapLayer,
    RequestResult,
};

const MAILBOX_SIZE: usize = 32;

const SAVE_FAILED_NOTICE: &str = "The waypoint could not be saved. Please try again later.";
const LOAD_FAILED_NOTICE: &str = "Saved waypoints could not be loaded.";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ControllerState {
    Idle,
    /// The form is open for a waypoint at `coordinate`.
    Pending { coordinate: ProjectedCoordinate },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerSettings {
    pub policy: DuplicatePolicy,
    /// Whether the form has a category field that must be filled in.
    pub require_category: bool,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            policy: DuplicatePolicy::Dedupe,
            require_category: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum SubmitOutcome {
    /// Stored and drawn.
    Created {
        waypoint: WithId<Waypoint>,
        marker: Marker,
    },
    /// A waypoint already exists at this position. Nothing was written or drawn.
    Duplicate { id: Id<Waypoint> },
    /// The form is incomplete. The controller stays in its current state.
    Invalid { error: ValidationError },
    /// The store failed. Nothing was drawn and the form stays open.
    Failed { notice: String },
}

#[derive(Debug, Clone, Default, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoadOutcome {
    pub loaded: usize,
    pub skipped: Vec<Id<Waypoint>>,
    pub error: Option<String>,
}

pub struct Controller<D, L>
where
    D: Database,
    L: MapLayer,
{
    client: Client<D>,
    layer: L,
    state: ControllerState,
    settings: ControllerSettings,
    replayed: bool,
}

impl<D, L> Controller<D, L>
where
    D: Database,
    L: MapLayer,
{
    pub fn new(client: Client<D>, layer: L, settings: ControllerSettings) -> Self {
        Self {
            client,
            layer,
            state: ControllerState::Idle,
            settings,
            replayed: false,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn layer(&self) -> &L {
        &self.layer
    }

    /// Opens the form for `coordinate`. A form that is already open is
    /// retargeted; its previous position is dropped.
    pub fn double_click(&mut self, coordinate: ProjectedCoordinate) -> ControllerState {
        if coordinate.is_finite() {
            self.state = ControllerState::Pending { coordinate };
        } else {
            log::warn!("Ignoring double-click at {:?}", coordinate);
        }
        self.state
    }

    pub fn cancel(&mut self) -> ControllerState {
        self.state = ControllerState::Idle;
        self.state
    }

    /// The marker whose popup a click at `coordinate` opens.
    pub fn click(&self, coordinate: &ProjectedCoordinate, resolution: f64) -> Option<Marker> {
        self.layer.feature_at(coordinate, resolution).cloned()
    }

    pub async fn submit(&mut self, form: FormInput) -> SubmitOutcome {
        let coordinate = match self.state {
            ControllerState::Pending { coordinate } => coordinate,
            ControllerState::Idle => {
                log::warn!("Waypoint form submitted without a position");
                return SubmitOutcome::Invalid {
                    error: ValidationError::NoPendingCoordinate,
                };
            }
        };

        let form = match form.validate(self.settings.require_category) {
            Ok(form) => form,
            Err(error) => {
                log::warn!("Waypoint form rejected: {:?}", error);
                return SubmitOutcome::Invalid { error };
            }
        };

        let description = form.description.clone();
        let coordinates = Coordinates::from_projected(coordinate);
        match self
            .client
            .save(form, coordinates, self.settings.policy)
            .await
        {
            Ok(SaveOutcome::Created(waypoint)) => {
                let marker = Marker::new(
                    coordinate,
                    waypoint.content.description.clone(),
                    waypoint.content.category.clone(),
                )
                .with_waypoint_id(waypoint.id.clone());
                self.layer.add_marker(marker.clone());
                self.state = ControllerState::Idle;
                log::info!("Waypoint added: {} ({})", description, waypoint.id);
                SubmitOutcome::Created { waypoint, marker }
            }
            Ok(SaveOutcome::Duplicate(id)) => {
                self.state = ControllerState::Idle;
                log::info!("Waypoint already exists: {} ({})", description, id);
                SubmitOutcome::Duplicate { id }
            }
            // the form stays open at the same position, so it can be sent again
            Err(why) => {
                log::error!("Error adding waypoint {}: {}", description, why);
                SubmitOutcome::Failed {
                    notice: SAVE_FAILED_NOTICE.to_owned(),
                }
            }
        }
    }

    /// Draws every stored waypoint. Only the first successful load has an
    /// effect; records that fail validation are skipped.
    pub async fn load(&mut self) -> LoadOutcome {
        if self.replayed {
            log::warn!("Waypoints were already loaded");
            return LoadOutcome::default();
        }

        let records = match self.client.list_all().await {
            Ok(records) => records,
            Err(why) => {
                log::error!("Error loading waypoints: {}", why);
                return LoadOutcome {
                    error: Some(LOAD_FAILED_NOTICE.to_owned()),
                    ..Default::default()
                };
            }
        };

        let mut outcome = LoadOutcome::default();
        for record in records {
            match record {
                StoredWaypoint::Valid(waypoint) => {
                    self.layer.add_marker(Marker::for_waypoint(&waypoint));
                    log::info!("Loaded waypoint: {}", waypoint.content.description);
                    outcome.loaded += 1;
                }
                StoredWaypoint::Malformed { id, reason } => {
                    log::warn!("Skipping waypoint {}: {}", id, reason);
                    outcome.skipped.push(id);
                }
            }
        }
        self.replayed = true;
        outcome
    }

    async fn handle(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::DoubleClick {
                coordinate,
                respond_to,
            } => respond(respond_to, self.double_click(coordinate)),
            ControllerEvent::Submit { form, respond_to } => {
                let outcome = self.submit(form).await;
                respond(respond_to, outcome)
            }
            ControllerEvent::Cancel { respond_to } => respond(respond_to, self.cancel()),
            ControllerEvent::Click {
                coordinate,
                resolution,
                respond_to,
            } => respond(respond_to, self.click(&coordinate, resolution)),
            ControllerEvent::Load { respond_to } => {
                let outcome = self.load().await;
                respond(respond_to, outcome)
            }
            ControllerEvent::Markers { respond_to } => {
                respond(respond_to, self.layer.markers().to_vec())
            }
            ControllerEvent::State { respond_to } => respond(respond_to, self.state),
        }
    }
}

fn respond<T>(respond_to: oneshot::Sender<T>, value: T) {
    respond_to
        .send(value)
        .unwrap_or_else(|_| log::error!("Can not respond to controller event!"));
}

#[derive(Debug)]
pub enum ControllerEvent {
    DoubleClick {
        coordinate: ProjectedCoordinate,
        respond_to: oneshot::Sender<ControllerState>,
    },
    Submit {
        form: FormInput,
        respond_to: oneshot::Sender<SubmitOutcome>,
    },
    Cancel {
        respond_to: oneshot::Sender<ControllerState>,
    },
    Click {
        coordinate: ProjectedCoordinate,
        resolution: f64,
        respond_to: oneshot::Sender<Option<Marker>>,
    },
    Load {
        respond_to: oneshot::Sender<LoadOutcome>,
    },
    Markers {
        respond_to: oneshot::Sender<Vec<Marker>>,
    },
    State {
        respond_to: oneshot::Sender<ControllerState>,
    },
}

/// Runs the controller on its own task. If handling an event panics, the
/// event is dropped, the panic is logged and the controller returns to
/// `Idle` with its layer intact.
pub fn spawn<D, L>(mut controller: Controller<D, L>) -> ControllerRef
where
    D: Database,
    L: MapLayer,
{
    let (sender, mut receiver) = mpsc::channel(MAILBOX_SIZE);

    tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            let result = AssertUnwindSafe(controller.handle(event))
                .catch_unwind()
                .await;
            if let Err(why) = result {
                log::error!("controller panicked: {:?}", why);
                controller.state = ControllerState::Idle;
            }
        }
        log::debug!("controller stopped, all handles dropped");
    });

    ControllerRef { sender }
}

#[derive(Debug, Clone)]
pub struct ControllerRef {
    sender: mpsc::Sender<ControllerEvent>,
}

impl ControllerRef {
    async fn ask<R, F>(&self, event: F) -> RequestResult<R>
    where
        F: FnOnce(oneshot::Sender<R>) -> ControllerEvent,
    {
        let (respond_to, response) = oneshot::channel();
        self.sender.send(event(respond_to)).await?;
        Ok(response.await?)
    }

    pub async fn double_click(
        &self,
        coordinate: ProjectedCoordinate,
    ) -> RequestResult<ControllerState> {
        self.ask(|respond_to| ControllerEvent::DoubleClick {
            coordinate,
            respond_to,
        })
        .await
    }

    pub async fn submit(&self, form: FormInput) -> RequestResult<SubmitOutcome> {
        self.ask(|respond_to| ControllerEvent::Submit { form, respond_to })
            .await
    }

    pub async fn cancel(&self) -> RequestResult<ControllerState> {
        self.ask(|respond_to| ControllerEvent::Cancel { respond_to })
            .await
    }

    pub async fn click(
        &self,
        coordinate: ProjectedCoordinate,
        resolution: f64,
    ) -> RequestResult<Option<Marker>> {
        self.ask(|respond_to| ControllerEvent::Click {
            coordinate,
            resolution,
            respond_to,
        })
        .await
    }

    pub async fn load(&self) -> RequestResult<LoadOutcome> {
        self.ask(|respond_to| ControllerEvent::Load { respond_to })
            .await
    }

    pub async fn markers(&self) -> RequestResult<Vec<Marker>> {
        self.ask(|respond_to| ControllerEvent::Markers { respond_to })
            .await
    }

    pub async fn state(&self) -> RequestResult<ControllerState> {
        self.ask(|respond_to| ControllerEvent::State { respond_to })
            .await
    }
}

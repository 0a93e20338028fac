use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, State},
    http::{Method, StatusCode},
    routing::{delete, get, on, post},
    Extension, Json, Router,
};
use model::{
    coordinates::ProjectedCoordinate,
    form::FormInput,
    marker::Marker,
    view::{resolution_at, DEFAULT_ZOOM},
    waypoint::Waypoint,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::{id::Id, let_also::LetAlso};
use waypoints::{
    controller::{ControllerRef, ControllerState, LoadOutcome, SubmitOutcome},
    database::Database,
    RequestError,
};

use crate::{
    common::{
        route_not_found, HateoasResult, RouteErrorResponse, RouteResult, VecResponse,
        METHOD_FILTER_ALL,
    },
    hateoas,
    middleware::base_url::{base_url_middleware, BaseUrl},
    session::Sessions,
    WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::resource!("/map{}", format_args!($($arg)*))
    };
}

pub(crate) fn routes<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .route("/markers", get(get_markers::<D>))
        .route("/sessions", post(open_session::<D>))
        .route("/sessions/:session", delete(close_session::<D>))
        .route("/sessions/:session/markers", get(get_session_markers::<D>))
        .route("/sessions/:session/state", get(get_state::<D>))
        .route("/sessions/:session/dblclick", post(double_click::<D>))
        .route("/sessions/:session/click", post(click::<D>))
        .route("/sessions/:session/submit", post(submit::<D>))
        .route("/sessions/:session/cancel", post(cancel::<D>))
        .layer(axum::middleware::from_fn(base_url_middleware))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

fn route_error(method: Method, uri: &str) -> impl FnOnce(RequestError) -> RouteErrorResponse + '_ {
    move |why| {
        RouteErrorResponse::from(why)
            .with_method(&method)
            .with_uri(uri)
    }
}

async fn controller<D: Database>(
    sessions: &Sessions<D>,
    session: &str,
    method: Method,
    uri: &str,
) -> RouteResult<ControllerRef> {
    sessions
        .get(session)
        .await
        .map_err(route_error(method, uri))
}

fn markers_response(
    markers: Vec<Marker>,
    base_url: Arc<BaseUrl>,
) -> Json<hateoas::Response<VecResponse<hateoas::Response<Marker>>>> {
    markers
        .into_iter()
        .map(|marker| marker_hateoas(marker, base_url.clone()))
        .collect::<Vec<_>>()
        .let_owned(|data| VecResponse::new(data).hateoas().json())
}

/// Markers of every stored waypoint, as any new session would draw them.
async fn get_markers<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { client, .. }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<hateoas::Response<Marker>>> {
    client
        .get_waypoints()
        .await
        .map(|waypoints| {
            waypoints
                .iter()
                .map(Marker::for_waypoint)
                .collect::<Vec<_>>()
                .let_owned(|markers| markers_response(markers, base_url))
        })
        .map_err(route_error(Method::GET, original_uri.path()))
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionDto {
    session: String,
    #[serde(flatten)]
    replay: LoadOutcome,
}

async fn open_session<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { sessions, .. }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> RouteResult<(StatusCode, Json<hateoas::Response<SessionDto>>)> {
    let (session, replay) = sessions
        .open()
        .await
        .map_err(route_error(Method::POST, original_uri.path()))?;
    let response = hateoas::Response::builder(
        SessionDto {
            session: session.clone(),
            replay,
        },
        base_url,
    )
    .link("self", resource!("/sessions/{}", session))
    .link("state", resource!("/sessions/{}/state", session))
    .link("markers", resource!("/sessions/{}/markers", session))
    .link("dblclick", resource!("/sessions/{}/dblclick", session))
    .link("submit", resource!("/sessions/{}/submit", session))
    .build();
    Ok((StatusCode::CREATED, response.json()))
}

async fn close_session<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(session): Path<String>,
    State(WebState { sessions, .. }): State<WebState<D>>,
) -> RouteResult<StatusCode> {
    sessions
        .close(&session)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(route_error(Method::DELETE, original_uri.path()))
}

/// The session's own feature layer.
async fn get_session_markers<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(session): Path<String>,
    State(WebState { sessions, .. }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<hateoas::Response<Marker>>> {
    controller(&sessions, &session, Method::GET, original_uri.path())
        .await?
        .markers()
        .await
        .map(|markers| markers_response(markers, base_url))
        .map_err(route_error(Method::GET, original_uri.path()))
}

async fn get_state<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(session): Path<String>,
    State(WebState { sessions, .. }): State<WebState<D>>,
) -> RouteResult<Json<ControllerState>> {
    controller(&sessions, &session, Method::GET, original_uri.path())
        .await?
        .state()
        .await
        .map(Json)
        .map_err(route_error(Method::GET, original_uri.path()))
}

async fn double_click<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(session): Path<String>,
    State(WebState { sessions, .. }): State<WebState<D>>,
    Json(coordinate): Json<ProjectedCoordinate>,
) -> RouteResult<Json<ControllerState>> {
    controller(&sessions, &session, Method::POST, original_uri.path())
        .await?
        .double_click(coordinate)
        .await
        .map(Json)
        .map_err(route_error(Method::POST, original_uri.path()))
}

async fn cancel<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(session): Path<String>,
    State(WebState { sessions, .. }): State<WebState<D>>,
) -> RouteResult<Json<ControllerState>> {
    controller(&sessions, &session, Method::POST, original_uri.path())
        .await?
        .cancel()
        .await
        .map(Json)
        .map_err(route_error(Method::POST, original_uri.path()))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClickBody {
    x: f64,
    y: f64,
    /// Projected metres per screen pixel. Derived from `zoom` when absent.
    resolution: Option<f64>,
    zoom: Option<f64>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PopupDto {
    description: Option<String>,
    waypoint_id: Option<Id<Waypoint>>,
}

async fn click<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(session): Path<String>,
    State(WebState { sessions, .. }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    Json(body): Json<ClickBody>,
) -> HateoasResult<PopupDto> {
    let resolution = body
        .resolution
        .unwrap_or_else(|| resolution_at(body.zoom.unwrap_or(DEFAULT_ZOOM)));
    let marker = controller(&sessions, &session, Method::POST, original_uri.path())
        .await?
        .click(ProjectedCoordinate::new(body.x, body.y), resolution)
        .await
        .map_err(route_error(Method::POST, original_uri.path()))?;

    let popup = PopupDto {
        description: marker.as_ref().map(|marker| marker.description.clone()),
        waypoint_id: marker.and_then(|marker| marker.waypoint_id),
    };
    let link = popup
        .waypoint_id
        .as_ref()
        .map(|id| super::waypoints::resource!("/{}", id.raw()));
    Ok(hateoas::Response::builder(popup, base_url)
        .link_option("waypoint", link)
        .build()
        .json())
}

async fn submit<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(session): Path<String>,
    State(WebState { sessions, .. }): State<WebState<D>>,
    Json(form): Json<FormInput>,
) -> RouteResult<(StatusCode, Json<SubmitOutcome>)> {
    let outcome = controller(&sessions, &session, Method::POST, original_uri.path())
        .await?
        .submit(form)
        .await
        .map_err(route_error(Method::POST, original_uri.path()))?;
    let status = match &outcome {
        SubmitOutcome::Created { .. } => StatusCode::CREATED,
        SubmitOutcome::Duplicate { .. } => StatusCode::OK,
        SubmitOutcome::Invalid { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SubmitOutcome::Failed { .. } => StatusCode::SERVICE_UNAVAILABLE,
    };
    Ok((status, Json(outcome)))
}

pub(crate) fn marker_hateoas(marker: Marker, base_url: Arc<BaseUrl>) -> hateoas::Response<Marker> {
    let waypoint_id = marker.waypoint_id.as_ref().map(|id| id.raw());
    hateoas::Response::builder(marker, base_url)
        .link_option(
            "waypoint",
            waypoint_id.map(|id| super::waypoints::resource!("/{}", id)),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use model::{coordinates::Coordinates, marker::MarkerColor, ValidationError};
    use waypoints::memory::MemoryDatabase;

    use super::*;
    use crate::{
        api::v1::test_support::{base_url, state, uri},
        WebState,
    };

    fn stolen_bike() -> Json<FormInput> {
        Json(FormInput::new("Stolen bike", Some("Theft")))
    }

    fn baton_rouge() -> ProjectedCoordinate {
        Coordinates::new(30.4515, -91.1871).to_projected()
    }

    fn berlin() -> ProjectedCoordinate {
        Coordinates::new(52.52, 13.405).to_projected()
    }

    async fn open(state: &WebState<MemoryDatabase>) -> String {
        let (status, Json(response)) =
            open_session(uri("/api/v1/map/sessions"), State(state.clone()), base_url())
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        response.content.session
    }

    async fn place(
        state: &WebState<MemoryDatabase>,
        session: &str,
        coordinate: ProjectedCoordinate,
    ) {
        double_click(
            uri("/api/v1/map/sessions/_/dblclick"),
            Path(session.to_owned()),
            State(state.clone()),
            Json(coordinate),
        )
        .await
        .unwrap();
    }

    async fn send(
        state: &WebState<MemoryDatabase>,
        session: &str,
        form: Json<FormInput>,
    ) -> (StatusCode, SubmitOutcome) {
        let (status, Json(outcome)) = submit(
            uri("/api/v1/map/sessions/_/submit"),
            Path(session.to_owned()),
            State(state.clone()),
            form,
        )
        .await
        .unwrap();
        (status, outcome)
    }

    async fn current_state(state: &WebState<MemoryDatabase>, session: &str) -> ControllerState {
        get_state(
            uri("/api/v1/map/sessions/_/state"),
            Path(session.to_owned()),
            State(state.clone()),
        )
        .await
        .unwrap()
        .0
    }

    #[tokio::test]
    async fn submit_creates_waypoint_and_marker() {
        let database = MemoryDatabase::new();
        let state = state(&database).await;
        let session = open(&state).await;
        place(&state, &session, baton_rouge()).await;

        let (status, outcome) = send(&state, &session, stolen_bike()).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(matches!(
            outcome,
            SubmitOutcome::Created { ref waypoint, .. } if waypoint.id.raw() == "30.45150_-91.18710"
        ));

        let markers = get_session_markers(
            uri("/api/v1/map/sessions/_/markers"),
            Path(session.clone()),
            State(state.clone()),
            base_url(),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(markers.content.total_items, 1);
        let marker = &markers.content.data[0];
        assert_eq!(marker.content.style.fill, MarkerColor::Red);
        assert_eq!(
            marker.link("waypoint"),
            Some("http://localhost/api/v1/waypoints/30.45150_-91.18710")
        );
        assert_eq!(current_state(&state, &session).await, ControllerState::Idle);
    }

    #[tokio::test]
    async fn interleaved_sessions_store_at_their_own_positions() {
        let database = MemoryDatabase::new();
        let state = state(&database).await;
        let a = open(&state).await;
        let b = open(&state).await;

        place(&state, &a, baton_rouge()).await;
        place(&state, &b, berlin()).await;
        let (_, outcome_a) = send(
            &state,
            &a,
            Json(FormInput::new("Stolen bike in Baton Rouge", Some("Theft"))),
        )
        .await;
        let (_, outcome_b) = send(
            &state,
            &b,
            Json(FormInput::new("Graffiti in Berlin", Some("Vandalism"))),
        )
        .await;

        assert!(matches!(
            outcome_a,
            SubmitOutcome::Created { ref waypoint, .. }
                if waypoint.id.raw() == "30.45150_-91.18710"
                    && waypoint.content.description == "Stolen bike in Baton Rouge"
        ));
        assert!(matches!(
            outcome_b,
            SubmitOutcome::Created { ref waypoint, .. }
                if waypoint.id.raw() == "52.52000_13.40500"
                    && waypoint.content.description == "Graffiti in Berlin"
        ));

        let shared = get_markers(uri("/api/v1/map/markers"), State(state), base_url())
            .await
            .unwrap()
            .0;
        assert_eq!(shared.content.total_items, 2);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let database = MemoryDatabase::new();
        let state = state(&database).await;
        let result = get_state(
            uri("/api/v1/map/sessions/nope/state"),
            Path("nope".to_owned()),
            State(state),
        )
        .await;
        assert!(matches!(result, Err(ref why) if why.status_code == StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn closed_session_rejects_further_calls() {
        let database = MemoryDatabase::new();
        let state = state(&database).await;
        let session = open(&state).await;
        let status = close_session(
            uri("/api/v1/map/sessions/_"),
            Path(session.clone()),
            State(state.clone()),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        let result = get_state(
            uri("/api/v1/map/sessions/_/state"),
            Path(session),
            State(state),
        )
        .await;
        assert!(matches!(result, Err(ref why) if why.status_code == StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn second_submit_at_same_position_is_duplicate() {
        let database = MemoryDatabase::new();
        let state = state(&database).await;
        let session = open(&state).await;
        for expected in [StatusCode::CREATED, StatusCode::OK] {
            place(&state, &session, baton_rouge()).await;
            let (status, _) = send(&state, &session, stolen_bike()).await;
            assert_eq!(status, expected);
        }
        assert_eq!(database.len(), 1);
    }

    #[tokio::test]
    async fn empty_description_is_unprocessable_and_keeps_form_open() {
        let database = MemoryDatabase::new();
        let state = state(&database).await;
        let session = open(&state).await;
        place(&state, &session, baton_rouge()).await;
        let operations = database.operations();

        let blank = Json(FormInput::new("   ", Some("Theft")));
        let (status, outcome) = send(&state, &session, blank).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(matches!(
            outcome,
            SubmitOutcome::Invalid { error: ValidationError::MissingDescription }
        ));
        assert_eq!(database.operations(), operations);
        assert!(matches!(
            current_state(&state, &session).await,
            ControllerState::Pending { .. }
        ));
    }

    #[tokio::test]
    async fn store_failure_is_service_unavailable_and_keeps_form_open() {
        let database = MemoryDatabase::new();
        let state = state(&database).await;
        let session = open(&state).await;
        database.set_available(false);
        place(&state, &session, baton_rouge()).await;

        let (status, outcome) = send(&state, &session, stolen_bike()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(matches!(outcome, SubmitOutcome::Failed { .. }));
        assert_eq!(
            current_state(&state, &session).await,
            ControllerState::Pending {
                coordinate: baton_rouge()
            }
        );

        database.set_available(true);
        let (status, _) = send(&state, &session, stolen_bike()).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(database.len(), 1);
    }

    #[tokio::test]
    async fn click_returns_popup_of_hit_marker() {
        let database = MemoryDatabase::new();
        let state = state(&database).await;
        let session = open(&state).await;
        place(&state, &session, baton_rouge()).await;
        send(&state, &session, stolen_bike()).await;

        let at = baton_rouge();
        let body = ClickBody {
            x: at.x + 5.0,
            y: at.y,
            resolution: None,
            zoom: None,
        };
        let popup = click(
            uri("/api/v1/map/sessions/_/click"),
            Path(session.clone()),
            State(state.clone()),
            base_url(),
            Json(body),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(popup.content.description.as_deref(), Some("Stolen bike"));
        assert!(popup.link("waypoint").is_some());

        let far = ClickBody {
            x: at.x + 100_000.0,
            y: at.y,
            resolution: Some(1.0),
            zoom: None,
        };
        let popup = click(
            uri("/api/v1/map/sessions/_/click"),
            Path(session),
            State(state),
            base_url(),
            Json(far),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(popup.content.description, None);
        assert!(popup.links.is_empty());
    }

    #[tokio::test]
    async fn cancel_closes_the_form() {
        let database = MemoryDatabase::new();
        let state = state(&database).await;
        let session = open(&state).await;
        place(&state, &session, baton_rouge()).await;
        let Json(current) = cancel(
            uri("/api/v1/map/sessions/_/cancel"),
            Path(session),
            State(state),
        )
        .await
        .unwrap();
        assert_eq!(current, ControllerState::Idle);
    }
}

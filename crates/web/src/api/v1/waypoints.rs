use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, State},
    http::Method,
    routing::{get, on},
    Extension, Router,
};
use model::{waypoint::Waypoint, WithId};
use utility::{id::Id, let_also::LetAlso};
use waypoints::database::{Database, StoredWaypoint};

use crate::{
    common::{
        route_not_found, schema, HateoasResult, RouteErrorResponse, VecResponse,
        METHOD_FILTER_ALL,
    },
    hateoas,
    middleware::base_url::{base_url_middleware, BaseUrl},
    WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::resource!("/waypoints{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .route("/schema", get(schema::<Waypoint>))
        .route("/:id", get(get_waypoint::<D>))
        .route("/", get(get_waypoints::<D>))
        .layer(axum::middleware::from_fn(base_url_middleware))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

async fn get_waypoints<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { client, .. }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<hateoas::Response<Waypoint>>> {
    let stored = client.list_all().await.map_err(|why| {
        RouteErrorResponse::from(why)
            .with_method(&Method::GET)
            .with_uri(original_uri.path())
    })?;

    let mut skipped = vec![];
    let waypoints = stored
        .into_iter()
        .filter_map(|record| match record {
            StoredWaypoint::Valid(waypoint) => Some(waypoint_hateoas(waypoint, base_url.clone())),
            StoredWaypoint::Malformed { id, .. } => {
                skipped.push(id);
                None
            }
        })
        .collect::<Vec<_>>();

    VecResponse::new(waypoints)
        .let_owned(|data| hateoas::Response::builder(data, base_url))
        .let_owned(|builder| {
            if skipped.is_empty() {
                builder
            } else {
                builder.debug_info("skippedMalformed", skipped)
            }
        })
        .link("self", resource!("/"))
        .link("schema", resource!("/schema"))
        .build()
        .json()
        .let_owned(Ok)
}

async fn get_waypoint<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<String>,
    State(WebState { client, .. }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<Waypoint> {
    client
        .get_waypoint(&Id::new(id))
        .await
        .map(|waypoint| waypoint_hateoas(waypoint, base_url).json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

pub(crate) fn waypoint_hateoas(
    waypoint: WithId<Waypoint>,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<Waypoint> {
    hateoas::Response::builder(waypoint.content, base_url)
        .link("self", resource!("/{}", waypoint.id.raw()))
        .build()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::Utc;
    use model::{category::Category, coordinates::Coordinates};
    use waypoints::{
        database::{RawWaypoint, WaypointRepo},
        memory::MemoryDatabase,
    };

    use super::*;
    use crate::api::v1::test_support::{base_url, state, uri};

    async fn seeded() -> MemoryDatabase {
        let database = MemoryDatabase::new();
        let waypoint = Waypoint::new(
            "Stolen bike",
            Some(Category::Theft),
            Coordinates::new(30.4515, -91.1871),
            Utc::now(),
        );
        database
            .auto()
            .create(WithId::new(waypoint.derived_id(), waypoint))
            .await
            .unwrap();
        database.insert_raw(RawWaypoint {
            id: "broken".to_owned(),
            description: Some("no position".to_owned()),
            category: None,
            latitude: None,
            longitude: None,
            timestamp: Some(Utc::now()),
        });
        database
    }

    #[tokio::test]
    async fn lists_valid_waypoints_and_reports_skipped() {
        let database = seeded().await;
        let response = get_waypoints(
            uri("/api/v1/waypoints"),
            State(state(&database).await),
            base_url(),
        )
        .await
        .unwrap()
        .0;

        assert_eq!(response.content.total_items, 1);
        let waypoint = &response.content.data[0];
        assert_eq!(waypoint.content.description, "Stolen bike");
        assert_eq!(
            waypoint.link("self"),
            Some("http://localhost/api/v1/waypoints/30.45150_-91.18710")
        );
        assert_eq!(
            response.debug_info["skippedMalformed"],
            serde_json::json!(["broken"])
        );
    }

    #[tokio::test]
    async fn missing_waypoint_is_not_found() {
        let database = MemoryDatabase::new();
        let result = get_waypoint(
            uri("/api/v1/waypoints/1.00000_2.00000"),
            Path("1.00000_2.00000".to_owned()),
            State(state(&database).await),
            base_url(),
        )
        .await;
        assert!(matches!(result, Err(ref why) if why.status_code == StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn unavailable_store_is_service_unavailable() {
        let database = MemoryDatabase::new();
        let state = state(&database).await;
        database.set_available(false);
        let result = get_waypoints(uri("/api/v1/waypoints"), State(state), base_url()).await;
        assert!(
            matches!(result, Err(ref why) if why.status_code == StatusCode::SERVICE_UNAVAILABLE)
        );
    }
}

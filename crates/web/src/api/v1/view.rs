use axum::{
    extract::{OriginalUri, Query},
    http::Method,
    routing::{get, on},
    Json, Router,
};
use model::view::{ViewRequest, ViewSettings};
use serde::Deserialize;

use crate::common::{route_not_found, RouteErrorResponse, RouteResult, METHOD_FILTER_ALL};

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::resource!("/view{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes() -> Router {
    Router::new()
        .route("/default", get(default_view))
        .route("/", get(center_view))
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

/// The raw text of the center inputs.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CenterQuery {
    #[serde(default)]
    lon: String,
    #[serde(default)]
    lat: String,
}

async fn default_view() -> Json<ViewSettings> {
    Json(ViewSettings::default())
}

async fn center_view(
    OriginalUri(original_uri): OriginalUri,
    Query(query): Query<CenterQuery>,
) -> RouteResult<Json<ViewRequest>> {
    ViewRequest::center_on(&query.lon, &query.lat)
        .map(Json)
        .map_err(|why| {
            log::warn!("Invalid coordinates: lon={:?} lat={:?}", query.lon, query.lat);
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use model::{coordinates::Coordinates, ValidationError};

    use super::*;
    use crate::api::v1::test_support::uri;

    fn query(lon: &str, lat: &str) -> Query<CenterQuery> {
        Query(CenterQuery {
            lon: lon.to_owned(),
            lat: lat.to_owned(),
        })
    }

    #[tokio::test]
    async fn centers_on_valid_input() {
        let Json(request) = center_view(uri("/api/v1/view"), query("12.316", "45.4404"))
            .await
            .unwrap();
        assert_eq!(request.center, Coordinates::new(45.4404, 12.316).to_projected());
        assert_eq!(request.zoom, 12.0);
    }

    #[tokio::test]
    async fn rejects_invalid_input() {
        let why = center_view(uri("/api/v1/view"), query("east", ""))
            .await
            .unwrap_err();
        assert_eq!(why.status_code, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(why.validation, Some(ValidationError::InvalidCoordinates));
    }

    #[tokio::test]
    async fn default_view_uses_zoom_limits() {
        let Json(view) = default_view().await;
        assert_eq!(view.min_zoom, 0.0);
        assert_eq!(view.max_zoom, 18.0);
    }
}

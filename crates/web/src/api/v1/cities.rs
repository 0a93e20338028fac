use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path},
    http::Method,
    routing::{get, on},
    Extension, Router,
};
use model::city::{CenterInput, City};
use schemars::JsonSchema;
use serde::Serialize;
use utility::let_also::LetAlso;

use crate::{
    common::{
        route_not_found, HateoasResult, RouteErrorResponse, VecResponse, METHOD_FILTER_ALL,
    },
    hateoas,
    middleware::base_url::{base_url_middleware, BaseUrl},
};

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::resource!("/cities{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes() -> Router {
    Router::new()
        .route("/:name", get(get_city))
        .route("/", get(get_cities))
        .layer(axum::middleware::from_fn(base_url_middleware))
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

/// A dropdown entry and the values it fills into the center inputs.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CityDto {
    name: &'static str,
    #[serde(flatten)]
    input: CenterInput,
}

async fn get_cities(
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<hateoas::Response<CityDto>>> {
    City::ALL
        .iter()
        .map(|city| city_hateoas(*city, base_url.clone()))
        .collect::<Vec<_>>()
        .let_owned(|data| Ok(VecResponse::new(data).hateoas().json()))
}

async fn get_city(
    OriginalUri(original_uri): OriginalUri,
    Path(name): Path<String>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<CityDto> {
    City::from_name(&name)
        .map(|city| city_hateoas(city, base_url).json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

fn city_hateoas(city: City, base_url: Arc<BaseUrl>) -> hateoas::Response<CityDto> {
    let input = city.fill_input();
    hateoas::Response::builder(
        CityDto {
            name: city.name(),
            input,
        },
        base_url,
    )
    .link("self", resource!("/{}", city.name()))
    .link(
        "view",
        super::view::resource!("?lon={}&lat={}", input.longitude, input.latitude),
    )
    .build()
}

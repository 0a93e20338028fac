use ::waypoints::database::Database;
use axum::{routing::on, Router};

use crate::{
    common::{route_not_found, METHOD_FILTER_ALL},
    middleware::base_url::base_url_middleware,
    WebState,
};

mod cities;
mod map;
mod view;
mod waypoints;

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::resource!("/v1{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .nest_service("/waypoints", waypoints::routes(state.clone()))
        .nest_service("/map", map::routes(state.clone()))
        .nest_service("/cities", cities::routes())
        .nest_service("/view", view::routes())
        .layer(axum::middleware::from_fn(base_url_middleware))
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

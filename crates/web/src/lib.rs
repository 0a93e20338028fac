pub use crate::common::RouteResult;

use std::path::Path;

use axum::{routing::get_service, Router};
use config::ServerConfig;
use session::Sessions;
use tokio::net::TcpListener;
use tower_http::services::{ServeDir, ServeFile};
use waypoints::{client::Client, database::Database};

pub mod api;
pub mod common;
pub mod config;
pub mod hateoas;
pub mod middleware;
pub mod session;

#[derive(Clone)]
pub struct WebState<D>
where
    D: Database,
{
    pub client: Client<D>,
    pub sessions: Sessions<D>,
}

impl<D> WebState<D>
where
    D: Database,
{
    pub fn new(sessions: Sessions<D>) -> Self {
        Self {
            client: sessions.client(),
            sessions,
        }
    }
}

pub async fn start_web_server<D: Database>(
    state: WebState<D>,
    config: &ServerConfig,
) -> std::io::Result<()> {
    let routes = Router::new()
        .nest_service("/api", api::routes(state))
        .fallback_service(static_content_router(&config.static_dir));

    let listener = TcpListener::bind(config.bind_address).await?;
    log::info!(
        "serving waypoints on http://{} (static files from {})",
        config.bind_address,
        config.static_dir.display()
    );
    axum::serve(listener, routes.into_make_service()).await?;

    Ok(())
}

fn static_content_router(static_dir: &Path) -> Router {
    Router::new().nest_service(
        "/",
        get_service(
            ServeDir::new(static_dir)
                .not_found_service(ServeFile::new(static_dir.join("error404.html"))),
        ),
    )
}

use database::{DatabaseConnectionInfo, PgDatabase};
use waypoints::{database::Database, memory::MemoryDatabase, server::Server};
use web::{config::ServerConfig, session::Sessions, start_web_server, WebState};

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = ServerConfig::from_env();

    // database
    let database_connection_info = DatabaseConnectionInfo::from_env()
        .unwrap_or_else(|why| panic!("invalid database connection info in env: {}", why));
    match database_connection_info {
        Some(database_connection_info) => {
            let database = PgDatabase::connect(database_connection_info)
                .await
                .expect("could not connect to database.");
            serve(database, config).await;
        }
        None => {
            log::warn!("no database configured, waypoints are kept in memory only");
            serve(MemoryDatabase::new(), config).await;
        }
    }
}

async fn serve<D: Database>(database: D, config: ServerConfig) {
    // every map session gets its own controller
    let state = WebState::new(Sessions::new(Server::new(database, config.controller)));
    match state.client.list_all().await {
        Ok(records) => log::info!("{} waypoints stored", records.len()),
        Err(why) => log::error!("waypoint store is not reachable yet: {}", why),
    }

    if let Err(why) = start_web_server(state, &config).await {
        log::error!("web server stopped: {}", why);
    }
}

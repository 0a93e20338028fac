use std::{env, error::Error};

use async_trait::async_trait;
use model::{waypoint::Waypoint, WithId};
use utility::id::Id;
use waypoints::database::{Database, Result, StoredWaypoint, WaypointRepo};

pub mod data_model;
pub mod queries;

pub struct DatabaseConnectionInfo {
    pub username: String,
    pub password: String,
    pub hostname: String,
    pub port: u16,
    pub database: String,
}

const CONNECTION_VARIABLES: [&str; 5] = [
    "DATABASE_USER",
    "DATABASE_PASSWORD",
    "DATABASE_HOST",
    "DATABASE_PORT",
    "DATABASE_NAME",
];

impl DatabaseConnectionInfo {
    /// Reads `DATABASE_USER`, `DATABASE_PASSWORD`, `DATABASE_HOST`,
    /// `DATABASE_PORT` and `DATABASE_NAME`. Returns `Ok(None)` if none of them
    /// is set, and an error naming the culprit if only some are set or the
    /// port is not a number.
    pub fn from_env() -> std::result::Result<Option<Self>, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> std::result::Result<Option<Self>, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if CONNECTION_VARIABLES.iter().all(|&key| lookup(key).is_none()) {
            return Ok(None);
        }
        let require = |key: &str| lookup(key).ok_or_else(|| format!("{} is not set", key));

        let port = require("DATABASE_PORT")?;
        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|why| format!("DATABASE_PORT={:?} is not a valid port: {}", port, why))?;
        Ok(Some(Self {
            username: require("DATABASE_USER")?,
            password: require("DATABASE_PASSWORD")?,
            hostname: require("DATABASE_HOST")?,
            port,
            database: require("DATABASE_NAME")?,
        }))
    }

    pub(self) fn postgres_url(self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.hostname, self.port, self.database
        )
    }
}

#[derive(Clone)]
pub struct PgDatabase {
    connection: sqlx::PgPool,
}

pub struct PgDatabaseAutocommit {
    pool: sqlx::PgPool,
}

impl PgDatabase {
    pub async fn connect(
        database_connection_info: DatabaseConnectionInfo,
    ) -> std::result::Result<Self, Box<dyn Error>> {
        let hostname = database_connection_info.hostname.clone();
        let url = database_connection_info.postgres_url();
        let pool = sqlx::postgres::PgPool::connect(&url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        log::info!("connected to waypoint database at {}", hostname);

        Ok(Self { connection: pool })
    }
}

impl Database for PgDatabase {
    type Autocommit = PgDatabaseAutocommit;

    fn auto(&self) -> Self::Autocommit {
        PgDatabaseAutocommit {
            pool: self.connection.clone(),
        }
    }
}

#[async_trait]
impl WaypointRepo for PgDatabaseAutocommit {
    async fn exists(&mut self, id: &Id<Waypoint>) -> Result<bool> {
        queries::waypoint::exists(&self.pool, id).await
    }

    async fn get(&mut self, id: &Id<Waypoint>) -> Result<WithId<Waypoint>> {
        queries::waypoint::get(&self.pool, id).await
    }

    async fn create(&mut self, waypoint: WithId<Waypoint>) -> Result<bool> {
        queries::waypoint::create(&self.pool, waypoint).await
    }

    async fn list_all(&mut self) -> Result<Vec<StoredWaypoint>> {
        queries::waypoint::get_all(&self.pool).await
    }

    async fn append(&mut self, waypoint: Waypoint) -> Result<WithId<Waypoint>> {
        queries::waypoint::append(&self.pool, waypoint).await
    }
}

use model::{waypoint::Waypoint, WithId};
use sqlx::{Executor, Postgres};
use utility::{id::Id, let_also::LetAlso};
use waypoints::database::{DatabaseError, RawWaypoint, Result, StoredWaypoint};

use crate::data_model::waypoint::WaypointRow;

use super::convert_error;

pub async fn exists<'c, E>(executor: E, id: &Id<Waypoint>) -> Result<bool>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM waypoints WHERE id = $1);")
        .bind(id.raw_ref::<str>())
        .fetch_one(executor)
        .await
        .map_err(convert_error)
}

pub async fn get<'c, E>(executor: E, id: &Id<Waypoint>) -> Result<WithId<Waypoint>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as::<_, WaypointRow>(
        "
        SELECT
            id, description, category, latitude, longitude, \"timestamp\"
        FROM
            waypoints
        WHERE
            id = $1;
        ",
    )
    .bind(id.raw_ref::<str>())
    .fetch_optional(executor)
    .await
    .map_err(convert_error)?
    .ok_or(DatabaseError::NotFound)?
    .let_owned(|row: WaypointRow| match row.validate() {
        StoredWaypoint::Valid(waypoint) => Ok(waypoint),
        StoredWaypoint::Malformed { reason, .. } => Err(DatabaseError::Malformed(reason)),
    })
}

pub async fn get_all<'c, E>(executor: E) -> Result<Vec<StoredWaypoint>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT
            id, description, category, latitude, longitude, \"timestamp\"
        FROM
            waypoints
        ORDER BY
            \"timestamp\" ASC, id ASC;
        ",
    )
    .fetch_all(executor)
    .await
    .map_err(convert_error)?
    .into_iter()
    .map(WaypointRow::validate)
    .collect::<Vec<_>>()
    .let_owned(Ok)
}

/// Inserts the waypoint unless its id is taken. Returns whether a row was
/// written.
pub async fn create<'c, E>(executor: E, waypoint: WithId<Waypoint>) -> Result<bool>
where
    E: Executor<'c, Database = Postgres>,
{
    let raw = RawWaypoint::from_model(&waypoint);
    sqlx::query(
        "
        INSERT INTO waypoints(
            id,
            description,
            category,
            latitude,
            longitude,
            \"timestamp\"
        )
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (id)
        DO NOTHING;
        ",
    )
    .bind(raw.id)
    .bind(raw.description)
    .bind(raw.category)
    .bind(raw.latitude)
    .bind(raw.longitude)
    .bind(raw.timestamp)
    .execute(executor)
    .await
    .map_err(convert_error)
    .map(|result| result.rows_affected() == 1)
}

/// Inserts the waypoint under an id generated by the database.
pub async fn append<'c, E>(executor: E, waypoint: Waypoint) -> Result<WithId<Waypoint>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as::<_, WaypointRow>(
        "
        INSERT INTO waypoints(
            description,
            category,
            latitude,
            longitude,
            \"timestamp\"
        )
        VALUES ($1, $2, $3, $4, $5)
        RETURNING
            id, description, category, latitude, longitude, \"timestamp\";
        ",
    )
    .bind(waypoint.description)
    .bind(waypoint.category.map(|category| category.to_string()))
    .bind(waypoint.coordinates.latitude)
    .bind(waypoint.coordinates.longitude)
    .bind(waypoint.timestamp)
    .fetch_one(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|row: WaypointRow| match row.validate() {
        StoredWaypoint::Valid(waypoint) => Ok(waypoint),
        StoredWaypoint::Malformed { reason, .. } => Err(DatabaseError::Malformed(reason)),
    })
}

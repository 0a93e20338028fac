use waypoints::database::DatabaseError;

pub mod waypoint;

/// Maps sqlx errors onto store errors. Connection level failures mean the
/// service could not be reached.
pub(crate) fn convert_error(why: sqlx::Error) -> DatabaseError {
    match why {
        sqlx::Error::RowNotFound => DatabaseError::NotFound,
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => DatabaseError::Unavailable(Box::new(why)),
        _ => DatabaseError::Other(Box::new(why)),
    }
}

use std::{error::Error, fmt};

use tokio::sync::{mpsc, oneshot};

use crate::controller::ControllerEvent;

pub mod client;
pub mod controller;
pub mod database;
pub mod layer;
pub mod memory;
pub mod server;

#[derive(Debug)]
pub enum RequestError {
    NotFound,
    StoreUnavailable(Box<dyn Error + Send + Sync>),
    SendError(mpsc::error::SendError<ControllerEvent>),
    ResponseError(oneshot::error::RecvError),
    Other(Box<dyn Error + Send + Sync>),
}

impl RequestError {
    pub fn other<T: Error + Send + Sync + 'static>(why: T) -> Self {
        Self::Other(Box::new(why))
    }

    /// Whether the backing store could not be reached.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::StoreUnavailable(why) => write!(f, "store unavailable: {}", why),
            Self::SendError(_) => write!(f, "controller is not running"),
            Self::ResponseError(_) => write!(f, "controller dropped the request"),
            Self::Other(why) => write!(f, "{}", why),
        }
    }
}

impl Error for RequestError {}

impl From<database::DatabaseError> for RequestError {
    fn from(value: database::DatabaseError) -> Self {
        match value {
            database::DatabaseError::NotFound => Self::NotFound,
            database::DatabaseError::Unavailable(why) => Self::StoreUnavailable(why),
            database::DatabaseError::Malformed(why) => Self::Other(why.into()),
            database::DatabaseError::Other(why) => Self::Other(why),
        }
    }
}

impl From<mpsc::error::SendError<ControllerEvent>> for RequestError {
    fn from(why: mpsc::error::SendError<ControllerEvent>) -> Self {
        Self::SendError(why)
    }
}

impl From<oneshot::error::RecvError> for RequestError {
    fn from(why: oneshot::error::RecvError) -> Self {
        Self::ResponseError(why)
    }
}

pub type RequestResult<O> = Result<O, RequestError>;

pub fn not_found_to_none<O>(result: RequestResult<O>) -> RequestResult<Option<O>> {
    if let Err(RequestError::NotFound) = result {
        Ok(None)
    } else {
        result.map(Some)
    }
}

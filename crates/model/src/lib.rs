use std::{error::Error, fmt};

use schemars::JsonSchema;
use serde::Serialize;
pub use serde_with;
use std::fmt::Debug;
use utility::id::{HasId, Id};

pub mod category;
pub mod city;
pub mod coordinates;
pub mod form;
pub mod marker;
pub mod view;
pub mod waypoint;

pub trait ExampleData {
    fn example_data() -> Self;
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WithId<V>
where
    V: HasId,
    V::IdType: Serialize + Debug + Clone,
{
    pub id: Id<V>,
    #[serde(flatten)]
    pub content: V,
}

impl<V> WithId<V>
where
    V: HasId,
    V::IdType: Serialize + Debug + Clone,
{
    pub fn new(id: Id<V>, content: V) -> Self {
        Self { id, content }
    }
}

/// Rejected user input. Never reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ValidationError {
    MissingDescription,
    MissingCategory,
    NoPendingCoordinate,
    InvalidCoordinates,
    UnknownCity {
        name: String,
        suggestion: Option<String>,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDescription | Self::MissingCategory => {
                write!(f, "Please enter all information.")
            }
            Self::NoPendingCoordinate => {
                write!(f, "Double-click the map to place a waypoint first.")
            }
            Self::InvalidCoordinates => write!(f, "Invalid coordinates"),
            Self::UnknownCity {
                name,
                suggestion: Some(suggestion),
            } => write!(f, "Unknown city '{}', did you mean '{}'?", name, suggestion),
            Self::UnknownCity { name, .. } => write!(f, "Unknown city '{}'", name),
        }
    }
}

impl Error for ValidationError {}

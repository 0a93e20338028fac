use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::edit_distance;

use crate::{coordinates::Coordinates, ValidationError};

/// Cities offered by the "jump to" dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum City {
    Atyrau,
    BatonRouge,
    Berlin,
    Lagos,
    London,
    Yokohama,
    Venice,
}

/// The values the dropdown writes into the longitude and latitude inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CenterInput {
    pub longitude: f64,
    pub latitude: f64,
}

impl City {
    pub const ALL: [City; 7] = [
        City::Atyrau,
        City::BatonRouge,
        City::Berlin,
        City::Lagos,
        City::London,
        City::Yokohama,
        City::Venice,
    ];

    /// The dropdown value of the city.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Atyrau => "Atyrau",
            Self::BatonRouge => "BatonRouge",
            Self::Berlin => "Berlin",
            Self::Lagos => "Lagos",
            Self::London => "London",
            Self::Yokohama => "Yokohama",
            Self::Venice => "Venice",
        }
    }

    pub fn fill_input(&self) -> CenterInput {
        let (longitude, latitude) = match self {
            Self::Atyrau => (51.9238, 47.0945),
            Self::BatonRouge => (-91.1871, 30.4515),
            Self::Berlin => (13.405, 52.52),
            Self::Lagos => (3.3792, 6.5244),
            Self::London => (-0.1276, 51.5072),
            Self::Yokohama => (139.6380, 35.4437),
            Self::Venice => (12.316, 45.4404),
        };
        CenterInput {
            longitude,
            latitude,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        let input = self.fill_input();
        Coordinates::new(input.latitude, input.longitude)
    }

    /// Looks a city up by its dropdown value, ignoring case. Unknown names
    /// come back with the closest known name as a suggestion.
    pub fn from_name(name: &str) -> Result<City, ValidationError> {
        let name = name.trim();
        City::ALL
            .into_iter()
            .find(|city| city.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| ValidationError::UnknownCity {
                name: name.to_owned(),
                suggestion: edit_distance::closest(
                    name,
                    City::ALL.iter().map(City::name),
                    3,
                )
                .map(str::to_owned),
            })
    }
}

use std::{borrow::Cow, fmt};

use schemars::{
    gen::SchemaGenerator,
    schema::{InstanceType, Schema, SchemaObject},
    JsonSchema,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The kind of incident a waypoint reports.
///
/// Categories are stored as their display string. Strings that are not part
/// of the fixed set are kept verbatim in `Unrecognized`, so records written by
/// other clients still load and render.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Theft,
    Vandalism,
    Assault,
    AccidentHitAndRun,
    TransactionScammed,
    Other,
    Unrecognized(String),
}

impl Category {
    /// Categories offered by the waypoint form, in dropdown order.
    pub const SELECTABLE: [Category; 6] = [
        Category::Theft,
        Category::Vandalism,
        Category::Assault,
        Category::AccidentHitAndRun,
        Category::TransactionScammed,
        Category::Other,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Theft => "Theft",
            Self::Vandalism => "Vandalism",
            Self::Assault => "Assault",
            Self::AccidentHitAndRun => "Accident/HitandRun",
            Self::TransactionScammed => "Transaction Scammed",
            Self::Other => "Other",
            Self::Unrecognized(value) => value,
        }
    }

    /// Parses a form value. Empty (or whitespace only) input means no category
    /// was selected.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(Self::from(value))
        }
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        match value {
            "Theft" => Self::Theft,
            "Vandalism" => Self::Vandalism,
            "Assault" => Self::Assault,
            "Accident/HitandRun" => Self::AccidentHitAndRun,
            "Transaction Scammed" => Self::TransactionScammed,
            "Other" => Self::Other,
            other => Self::Unrecognized(other.to_owned()),
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match Self::from(value.as_str()) {
            Self::Unrecognized(_) => Self::Unrecognized(value),
            known => known,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Category::from)
    }
}

impl JsonSchema for Category {
    fn schema_name() -> String {
        "Category".to_owned()
    }

    fn schema_id() -> Cow<'static, str> {
        Cow::Borrowed(concat!(module_path!(), "::Category"))
    }

    fn json_schema(_gen: &mut SchemaGenerator) -> Schema {
        SchemaObject {
            instance_type: Some(InstanceType::String.into()),
            enum_values: Some(
                Category::SELECTABLE
                    .iter()
                    .map(|category| category.as_str().into())
                    .collect(),
            ),
            ..Default::default()
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_strings_round_trip() {
        for category in Category::SELECTABLE {
            assert_eq!(Category::from(category.as_str()), category);
        }
    }

    #[test]
    fn unknown_strings_are_preserved() {
        let category = Category::from("Graffiti".to_owned());
        assert_eq!(category, Category::Unrecognized("Graffiti".to_owned()));
        assert_eq!(category.to_string(), "Graffiti");
    }

    #[test]
    fn empty_form_value_is_no_category() {
        assert_eq!(Category::parse(""), None);
        assert_eq!(Category::parse("  "), None);
        assert_eq!(Category::parse("Theft"), Some(Category::Theft));
    }

    #[test]
    fn serializes_as_display_string() {
        let json = serde_json::to_string(&Category::AccidentHitAndRun).unwrap();
        assert_eq!(json, "\"Accident/HitandRun\"");
        let parsed: Category = serde_json::from_str("\"Transaction Scammed\"").unwrap();
        assert_eq!(parsed, Category::TransactionScammed);
    }
}

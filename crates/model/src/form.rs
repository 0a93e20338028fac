use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{category::Category, ValidationError};

/// The fields of the waypoint form, as submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormInput {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// Form input that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidForm {
    pub description: String,
    pub category: Option<Category>,
}

impl FormInput {
    pub fn new(description: impl Into<String>, category: Option<&str>) -> Self {
        Self {
            description: description.into(),
            category: category.map(str::to_owned),
        }
    }

    /// Checks the required fields. The description must contain more than
    /// whitespace and is kept as typed; a category is required only if
    /// `require_category` is set.
    pub fn validate(&self, require_category: bool) -> Result<ValidForm, ValidationError> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingDescription);
        }
        let category = self.category.as_deref().and_then(Category::parse);
        if require_category && category.is_none() {
            return Err(ValidationError::MissingCategory);
        }
        Ok(ValidForm {
            description: self.description.clone(),
            category,
        })
    }
}

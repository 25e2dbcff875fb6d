use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::{validate_non_negative, validate_not_blank, FieldNames};

/// An item owned by exactly one user
///
/// `owner_id` is fixed at creation and maps to the `user_id` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = 1)]
    #[sqlx(rename = "user_id")]
    pub owner_id: i32,
    #[schema(example = "Book", max_length = 250)]
    pub name: String,
    #[schema(example = 10, minimum = 0)]
    pub price: i32,
    pub created_at: DateTime<Utc>,
    /// Advances on every update
    pub updated_at: DateTime<Utc>,
}

/// Body of item create and update requests
///
/// Updates replace both fields, so the same rules apply to both.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ItemRequest {
    #[validate(required, custom = "validate_not_blank", length(max = 250))]
    #[schema(example = "Book", max_length = 250)]
    pub name: Option<String>,
    #[validate(required, custom = "validate_non_negative")]
    #[schema(example = 10, minimum = 0)]
    pub price: Option<i32>,
}

impl FieldNames for ItemRequest {
    const FIELD_NAMES: &'static [(&'static str, &'static str)] = &[("name", "Name"), ("price", "Price")];
}

impl ItemRequest {
    /// Split a validated request into its parts
    ///
    /// Only called after `validate` succeeded, so both fields are present.
    pub fn into_parts(self) -> Option<(String, i32)> {
        Some((self.name?, self.price?))
    }
}

/// Listing envelope
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ItemList {
    pub data: Vec<Item>,
}

use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow};
use validator::Validate;

/// A user-owned name attached to recipes through a link table.
///
/// Tags and ingredients share storage layout and semantics; the constants
/// name the tables a generic service queries.
pub trait RecipeAttr: for<'r> FromRow<'r, SqliteRow> + Send + Unpin {
    const TABLE: &'static str;
    const LINK_TABLE: &'static str;
    const LINK_COLUMN: &'static str;
    /// Human readable name used in error messages
    const LABEL: &'static str;
}

/// Nested `{ "name": ... }` payload for tags and ingredients.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NameForm {
    #[validate(length(min = 1, max = 255, message = "Ensure this field has between 1 and 255 characters."))]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AttrListQuery {
    pub assigned_only: Option<u8>,
}

impl AttrListQuery {
    pub fn assigned_only(&self) -> bool {
        self.assigned_only.unwrap_or(0) != 0
    }
}

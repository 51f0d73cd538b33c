use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::recipe_attr::RecipeAttr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: i64,
    #[serde(skip)]
    pub user_id: String,
    pub name: String,
}

impl RecipeAttr for Tag {
    const TABLE: &'static str = "tag";
    const LINK_TABLE: &'static str = "recipe_tag";
    const LINK_COLUMN: &'static str = "tag_id";
    const LABEL: &'static str = "Tag";
}

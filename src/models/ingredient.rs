use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::recipe_attr::RecipeAttr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Ingredient {
    pub id: i64,
    #[serde(skip)]
    pub user_id: String,
    pub name: String,
}

impl RecipeAttr for Ingredient {
    const TABLE: &'static str = "ingredient";
    const LINK_TABLE: &'static str = "recipe_ingredient";
    const LINK_COLUMN: &'static str = "ingredient_id";
    const LABEL: &'static str = "Ingredient";
}

pub mod auth;
pub mod ingredient;
pub mod recipe;
pub mod recipe_attr;
pub mod tag;
pub mod user;

pub use auth::*;
pub use ingredient::Ingredient;
pub use recipe::*;
pub use recipe_attr::{AttrListQuery, NameForm, RecipeAttr};
pub use tag::Tag;
pub use user::*;

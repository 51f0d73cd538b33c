pub mod auth;
pub mod image;
pub mod recipe;
pub mod recipe_attr;
pub mod user;

pub use auth::AuthService;
pub use image::ImageStore;
pub use recipe::RecipeService;
pub use recipe_attr::RecipeAttrService;
pub use user::UserService;

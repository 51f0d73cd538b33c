use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Account as seen by handlers. The password hash is only ever read through
/// [`super::LoginRecord`].
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    /// Stored lower-cased
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub date_joined: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserForm {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,

    #[validate(length(min = 5, message = "Ensure this field has at least 5 characters."))]
    pub password: String,

    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

/// Body of `PUT`/`PATCH /me`; absent fields are left as they are.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserForm {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    #[validate(length(min = 5, message = "Ensure this field has at least 5 characters."))]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub email: String,
    pub name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            email: user.email,
            name: user.name,
        }
    }
}

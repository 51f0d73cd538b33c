use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// The slice of a `user` row a login is checked against.
#[derive(Debug, FromRow)]
pub struct LoginRecord {
    pub id: String,
    pub password_hash: String,
    pub is_active: bool,
}

/// Body of `POST /user/token`.
#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,

    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    /// Always `Bearer`
    pub token_type: String,
    pub expires_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Owning user id
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

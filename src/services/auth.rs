use uuid::Uuid;

use crate::db::Database;
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::models::{LoginRecord, User};
use crate::services::UserService;
use crate::utils::password::{hash_password, verify_password};
use crate::utils::time::current_timestamp_seconds;

/// Account registration and password checks.
pub struct AuthService<'a> {
    db: &'a Database,
}

impl<'a> AuthService<'a> {
    pub fn new(db: &'a Database) -> Self {
        AuthService { db }
    }

    /// Creates an active account. `email` is expected lower-cased already.
    ///
    /// The row and its password hash are written by a single statement, so a
    /// concurrent signup with the same email either wins or gets
    /// [`AppError::UserAlreadyExists`]; nothing is left half-created.
    pub async fn register(&self, email: &str, name: &str, password: &str) -> AppResult<User> {
        let id = Uuid::new_v4().to_string();
        let password_hash = hash_password(password)?;

        sqlx::query(
            r#"
            INSERT INTO "user" (id, email, name, password_hash, is_active, date_joined)
            VALUES ($1, $2, $3, $4, 1, $5)
            "#,
        )
        .bind(&id)
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .bind(current_timestamp_seconds())
        .execute(&self.db.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::UserAlreadyExists
            } else {
                AppError::Database(e)
            }
        })?;

        tracing::info!("Registered user {}", id);

        UserService::new(self.db)
            .get_user_by_id(&id)
            .await?
            .ok_or_else(|| AppError::InternalServerError("Failed to create user".to_string()))
    }

    /// Returns the id of the account `email` belongs to when `password` matches.
    ///
    /// Unknown emails and wrong passwords are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<String> {
        let record = sqlx::query_as::<_, LoginRecord>(
            r#"SELECT id, password_hash, is_active FROM "user" WHERE email = $1"#,
        )
        .bind(email)
        .fetch_optional(&self.db.pool)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &record.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }
        if !record.is_active {
            return Err(AppError::Unauthorized("User account is disabled".to_string()));
        }

        Ok(record.id)
    }

    pub async fn set_password(&self, user_id: &str, password: &str) -> AppResult<()> {
        let password_hash = hash_password(password)?;

        sqlx::query(r#"UPDATE "user" SET password_hash = $1 WHERE id = $2"#)
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.db.pool)
            .await?;

        Ok(())
    }
}

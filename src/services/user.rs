use crate::db::Database;
use crate::error::AppResult;
use crate::models::User;

pub struct UserService<'a> {
    db: &'a Database,
}

impl<'a> UserService<'a> {
    pub fn new(db: &'a Database) -> Self {
        UserService { db }
    }

    pub async fn get_user_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let result = sqlx::query_as::<_, User>(
            r#"SELECT id, email, name, is_active, date_joined FROM "user" WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(result)
    }

    pub async fn rename(&self, id: &str, name: &str) -> AppResult<()> {
        sqlx::query(r#"UPDATE "user" SET name = $1 WHERE id = $2"#)
            .bind(name)
            .bind(id)
            .execute(&self.db.pool)
            .await?;

        Ok(())
    }
}

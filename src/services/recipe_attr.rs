use std::marker::PhantomData;

use sqlx::SqliteConnection;
use validator::{ValidationError, ValidationErrors};

use crate::db::Database;
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::models::{NameForm, RecipeAttr};

/// Queries for a user-owned recipe attribute (tags, ingredients).
pub struct RecipeAttrService<'a, T: RecipeAttr> {
    db: &'a Database,
    _marker: PhantomData<T>,
}

impl<'a, T: RecipeAttr> RecipeAttrService<'a, T> {
    pub fn new(db: &'a Database) -> Self {
        RecipeAttrService {
            db,
            _marker: PhantomData,
        }
    }

    /// Rows owned by `user_id`, by descending name.
    ///
    /// With `assigned_only`, rows not attached to any recipe are left out.
    pub async fn list_for_user(&self, user_id: &str, assigned_only: bool) -> AppResult<Vec<T>> {
        let assigned_filter = if assigned_only {
            format!(
                "AND EXISTS (SELECT 1 FROM {} l WHERE l.{} = a.id)",
                T::LINK_TABLE,
                T::LINK_COLUMN
            )
        } else {
            String::new()
        };

        let rows = sqlx::query_as::<_, T>(&format!(
            "SELECT a.id, a.user_id, a.name FROM {} a WHERE a.user_id = $1 {} ORDER BY a.name DESC",
            T::TABLE,
            assigned_filter
        ))
        .bind(user_id)
        .fetch_all(&self.db.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get_for_user(&self, id: i64, user_id: &str) -> AppResult<Option<T>> {
        let row = sqlx::query_as::<_, T>(&format!(
            "SELECT id, user_id, name FROM {} WHERE id = $1 AND user_id = $2",
            T::TABLE
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_for_recipe(&self, recipe_id: i64) -> AppResult<Vec<T>> {
        let rows = sqlx::query_as::<_, T>(&format!(
            r#"
            SELECT a.id, a.user_id, a.name
            FROM {table} a
            INNER JOIN {link} l ON l.{column} = a.id
            WHERE l.recipe_id = $1
            ORDER BY a.id
            "#,
            table = T::TABLE,
            link = T::LINK_TABLE,
            column = T::LINK_COLUMN
        ))
        .bind(recipe_id)
        .fetch_all(&self.db.pool)
        .await?;

        Ok(rows)
    }

    /// Renames a row owned by `user_id`; the new name must be free for that user.
    pub async fn rename(&self, id: i64, user_id: &str, name: &str) -> AppResult<T> {
        let result = sqlx::query(&format!(
            "UPDATE {} SET name = $1 WHERE id = $2 AND user_id = $3",
            T::TABLE
        ))
        .bind(name)
        .bind(id)
        .bind(user_id)
        .execute(&self.db.pool)
        .await
        .map_err(|e| {
            if !is_unique_violation(&e) {
                return AppError::Database(e);
            }
            let mut errors = ValidationErrors::new();
            errors.add(
                "name",
                ValidationError::new("unique")
                    .with_message(format!("{} with this name already exists.", T::LABEL).into()),
            );
            AppError::Validation(errors)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{} not found", T::LABEL)));
        }

        self.get_for_user(id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} not found", T::LABEL)))
    }

    pub async fn delete_for_user(&self, id: i64, user_id: &str) -> AppResult<()> {
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE id = $1 AND user_id = $2",
            T::TABLE
        ))
        .bind(id)
        .bind(user_id)
        .execute(&self.db.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{} not found", T::LABEL)));
        }

        Ok(())
    }
}

/// Returns the id of the (user, name) row, inserting it first if needed.
pub async fn get_or_create<T: RecipeAttr>(
    conn: &mut SqliteConnection,
    user_id: &str,
    name: &str,
) -> AppResult<i64> {
    sqlx::query(&format!(
        "INSERT INTO {} (user_id, name) VALUES ($1, $2) ON CONFLICT (user_id, name) DO NOTHING",
        T::TABLE
    ))
    .bind(user_id)
    .bind(name)
    .execute(&mut *conn)
    .await?;

    let (id,): (i64,) = sqlx::query_as(&format!(
        "SELECT id FROM {} WHERE user_id = $1 AND name = $2",
        T::TABLE
    ))
    .bind(user_id)
    .bind(name)
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}

/// Makes `items` the complete set of `T` attached to `recipe_id`.
///
/// An empty slice clears every association.
pub async fn replace_links<T: RecipeAttr>(
    conn: &mut SqliteConnection,
    user_id: &str,
    recipe_id: i64,
    items: &[NameForm],
) -> AppResult<()> {
    sqlx::query(&format!("DELETE FROM {} WHERE recipe_id = $1", T::LINK_TABLE))
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    for item in items {
        let attr_id = get_or_create::<T>(&mut *conn, user_id, &item.name).await?;

        sqlx::query(&format!(
            "INSERT OR IGNORE INTO {} (recipe_id, {}) VALUES ($1, $2)",
            T::LINK_TABLE,
            T::LINK_COLUMN
        ))
        .bind(recipe_id)
        .bind(attr_id)
        .execute(&mut *conn)
        .await?;
    }

    tracing::debug!(
        "Linked {} {} row(s) to recipe {}",
        items.len(),
        T::TABLE,
        recipe_id
    );

    Ok(())
}

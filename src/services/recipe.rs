use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::{canonical_price, Ingredient, Recipe, RecipeForm, Tag, WriteMode};
use crate::services::recipe_attr::{replace_links, RecipeAttrService};

const RECIPE_COLUMNS: &str = "id, user_id, title, description, time_minutes, price, link, image";

/// Scalar column values of a recipe after a form has been applied.
struct RecipeValues {
    title: String,
    description: String,
    time_minutes: i64,
    price: String,
    link: String,
}

fn required<T: Clone>(value: &Option<T>, field: &str) -> AppResult<T> {
    value
        .clone()
        .ok_or_else(|| AppError::BadRequest(format!("{} is required", field)))
}

impl RecipeValues {
    /// `Create` and `Replace` take every scalar from the form and reset the
    /// optional text fields when they are omitted. `Partial` falls back to
    /// `existing` for anything the form leaves out.
    fn resolve(form: &RecipeForm, existing: Option<&Recipe>, mode: WriteMode) -> AppResult<Self> {
        match (mode, existing) {
            (WriteMode::Partial, Some(existing)) => Ok(RecipeValues {
                title: form.title.clone().unwrap_or_else(|| existing.title.clone()),
                description: form
                    .description
                    .clone()
                    .unwrap_or_else(|| existing.description.clone()),
                time_minutes: form.time_minutes.unwrap_or(existing.time_minutes),
                price: form
                    .price
                    .as_ref()
                    .map(canonical_price)
                    .unwrap_or_else(|| existing.price.clone()),
                link: form.link.clone().unwrap_or_else(|| existing.link.clone()),
            }),
            (WriteMode::Partial, None) => Err(AppError::InternalServerError(
                "Partial update without an existing recipe".to_string(),
            )),
            _ => Ok(RecipeValues {
                title: required(&form.title, "title")?,
                description: form.description.clone().unwrap_or_default(),
                time_minutes: required(&form.time_minutes, "time_minutes")?,
                price: canonical_price(&required(&form.price, "price")?),
                link: form.link.clone().unwrap_or_default(),
            }),
        }
    }
}

/// Replaces whichever association sets the form carries; omitted lists are left alone.
async fn apply_links(
    conn: &mut SqliteConnection,
    user_id: &str,
    recipe_id: i64,
    form: &RecipeForm,
) -> AppResult<()> {
    if let Some(tags) = &form.tags {
        replace_links::<Tag>(&mut *conn, user_id, recipe_id, tags).await?;
    }
    if let Some(ingredients) = &form.ingredients {
        replace_links::<Ingredient>(&mut *conn, user_id, recipe_id, ingredients).await?;
    }
    Ok(())
}

pub struct RecipeService<'a> {
    db: &'a Database,
}

impl<'a> RecipeService<'a> {
    pub fn new(db: &'a Database) -> Self {
        RecipeService { db }
    }

    /// Recipes owned by `user_id`, newest first.
    ///
    /// A non-empty `tag_ids` keeps recipes carrying at least one of the tags;
    /// `ingredient_ids` works the same way. Both filters must hold when both
    /// are given.
    pub async fn list_for_user(
        &self,
        user_id: &str,
        tag_ids: &[i64],
        ingredient_ids: &[i64],
    ) -> AppResult<Vec<Recipe>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM recipe WHERE user_id = ",
            RECIPE_COLUMNS
        ));
        query.push_bind(user_id.to_string());

        for (link_table, link_column, ids) in [
            ("recipe_tag", "tag_id", tag_ids),
            ("recipe_ingredient", "ingredient_id", ingredient_ids),
        ] {
            if ids.is_empty() {
                continue;
            }

            query.push(format!(
                " AND id IN (SELECT recipe_id FROM {} WHERE {} IN (",
                link_table, link_column
            ));
            let mut separated = query.separated(", ");
            for id in ids {
                separated.push_bind(*id);
            }
            separated.push_unseparated("))");
        }

        query.push(" ORDER BY id DESC");

        let recipes = query
            .build_query_as::<Recipe>()
            .fetch_all(&self.db.pool)
            .await?;

        Ok(recipes)
    }

    pub async fn get_for_user(&self, id: i64, user_id: &str) -> AppResult<Option<Recipe>> {
        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {} FROM recipe WHERE id = $1 AND user_id = $2",
            RECIPE_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(recipe)
    }

    /// Like [`Self::get_for_user`], but another user's recipe is reported
    /// exactly like a missing one.
    pub async fn require_for_user(&self, id: i64, user_id: &str) -> AppResult<Recipe> {
        self.get_for_user(id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Recipe not found".to_string()))
    }

    pub async fn tags(&self, recipe_id: i64) -> AppResult<Vec<Tag>> {
        RecipeAttrService::<Tag>::new(self.db)
            .list_for_recipe(recipe_id)
            .await
    }

    pub async fn ingredients(&self, recipe_id: i64) -> AppResult<Vec<Ingredient>> {
        RecipeAttrService::<Ingredient>::new(self.db)
            .list_for_recipe(recipe_id)
            .await
    }

    /// Inserts the recipe and its nested tags and ingredients atomically.
    pub async fn create(&self, user_id: &str, form: &RecipeForm) -> AppResult<Recipe> {
        let values = RecipeValues::resolve(form, None, WriteMode::Create)?;

        let mut tx = self.db.pool.begin().await?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO recipe (user_id, title, description, time_minutes, price, link)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(&values.title)
        .bind(&values.description)
        .bind(values.time_minutes)
        .bind(&values.price)
        .bind(&values.link)
        .fetch_one(&mut *tx)
        .await?;

        apply_links(&mut *tx, user_id, id, form).await?;

        tx.commit().await?;

        tracing::info!("Created recipe {} for user {}", id, user_id);
        self.require_for_user(id, user_id).await
    }

    /// Applies `form` to `recipe` as a full (`Replace`) or partial update.
    pub async fn update(&self, recipe: &Recipe, form: &RecipeForm, mode: WriteMode) -> AppResult<Recipe> {
        let values = RecipeValues::resolve(form, Some(recipe), mode)?;

        let mut tx = self.db.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE recipe
            SET title = $1, description = $2, time_minutes = $3, price = $4, link = $5
            WHERE id = $6 AND user_id = $7
            "#,
        )
        .bind(&values.title)
        .bind(&values.description)
        .bind(values.time_minutes)
        .bind(&values.price)
        .bind(&values.link)
        .bind(recipe.id)
        .bind(&recipe.user_id)
        .execute(&mut *tx)
        .await?;

        apply_links(&mut *tx, &recipe.user_id, recipe.id, form).await?;

        tx.commit().await?;

        self.require_for_user(recipe.id, &recipe.user_id).await
    }

    /// Deletes the recipe and returns the removed row so its image can be cleaned up.
    pub async fn delete_for_user(&self, id: i64, user_id: &str) -> AppResult<Recipe> {
        let recipe = self.require_for_user(id, user_id).await?;

        sqlx::query("DELETE FROM recipe WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db.pool)
            .await?;

        tracing::info!("Deleted recipe {} for user {}", id, user_id);
        Ok(recipe)
    }

    pub async fn set_image(&self, id: i64, user_id: &str, image: &str) -> AppResult<Recipe> {
        sqlx::query("UPDATE recipe SET image = $1 WHERE id = $2 AND user_id = $3")
            .bind(image)
            .bind(id)
            .bind(user_id)
            .execute(&self.db.pool)
            .await?;

        self.require_for_user(id, user_id).await
    }
}

//! PostgreSQL recipe repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{RecipeRepository, RepositoryResult};
use crate::models::{Cuisine, NewRecipe, Recipe, RecipeSearch, Review, ReviewInput, TagSet};

const RECIPE_COLUMNS: &str = "id, title, ingredients, cuisine, tags, author_id, reviews, created_at";

/// Recipe repository backed by the `recipes` table
#[derive(Clone)]
pub struct PgRecipeRepository {
    pool: PgPool,
}

impl PgRecipeRepository {
    /// Create a new recipe repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load a recipe under a row lock, apply `mutate` to it and write the
    /// review list back in the same transaction.
    ///
    /// Returns None without writing when the recipe is missing or `mutate`
    /// returns None.
    async fn mutate_reviews<T, F>(&self, recipe_id: Uuid, mutate: F) -> RepositoryResult<Option<T>>
    where
        T: Send,
        F: FnOnce(&mut Recipe) -> Option<T> + Send,
    {
        let mut tx = self.pool.begin().await?;

        let query = format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1 FOR UPDATE");
        let row = sqlx::query(&query)
            .bind(recipe_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut recipe = recipe_from_row(&row)?;

        let Some(outcome) = mutate(&mut recipe) else {
            return Ok(None);
        };

        sqlx::query("UPDATE recipes SET reviews = $2 WHERE id = $1")
            .bind(recipe_id)
            .bind(Json(&recipe.reviews))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(outcome))
    }
}

fn recipe_from_row(row: &PgRow) -> RepositoryResult<Recipe> {
    let cuisine: Option<String> = row.try_get("cuisine")?;
    let tags: Vec<String> = row.try_get("tags")?;
    let reviews: Json<Vec<Review>> = row.try_get("reviews")?;

    Ok(Recipe {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        ingredients: row.try_get("ingredients")?,
        cuisine: parse_stored_cuisine(cuisine.as_deref()),
        tags: TagSet::from_submitted(tags),
        author_id: row.try_get("author_id")?,
        reviews: reviews.0,
        created_at: row.try_get("created_at")?,
    })
}

/// Stored cuisines outside [`Cuisine::ALL`] read back as none, with a warning
fn parse_stored_cuisine(value: Option<&str>) -> Option<Cuisine> {
    let value = value?;
    match value.parse() {
        Ok(cuisine) => Some(cuisine),
        Err(e) => {
            warn!("Ignoring stored recipe cuisine: {}", e);
            None
        }
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside ILIKE
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl RecipeRepository for PgRecipeRepository {
    async fn create(&self, new_recipe: NewRecipe) -> RepositoryResult<Recipe> {
        info!("Creating new recipe: {}", new_recipe.title);

        let row = sqlx::query(
            r#"
            INSERT INTO recipes (title, ingredients, cuisine, tags, author_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, created_at
            "#,
        )
        .bind(&new_recipe.title)
        .bind(&new_recipe.ingredients)
        .bind(new_recipe.cuisine.as_str())
        .bind(new_recipe.tags.to_vec())
        .bind(new_recipe.author_id)
        .fetch_one(&self.pool)
        .await?;

        let id: Uuid = row.try_get("id")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;

        Ok(new_recipe.into_recipe(id, created_at))
    }

    async fn search(&self, criteria: &RecipeSearch) -> RepositoryResult<Vec<Recipe>> {
        debug!("Searching recipes with {:?}", criteria);

        let select = format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE TRUE");
        let mut builder = QueryBuilder::<Postgres>::new(select);

        if let Some(title) = &criteria.title {
            builder
                .push(" AND title ILIKE ")
                .push_bind(format!("%{}%", escape_like(title)));
        }

        if let Some(ingredient) = &criteria.ingredient {
            builder
                .push(" AND ")
                .push_bind(ingredient.clone())
                .push(" = ANY(ingredients)");
        }

        builder.push(" ORDER BY created_at ASC");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(recipe_from_row).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Recipe>> {
        debug!("Finding recipe by ID: {}", id);

        let query = format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(recipe_from_row).transpose()
    }

    async fn update_details(
        &self,
        id: Uuid,
        title: &str,
        ingredients: &[String],
    ) -> RepositoryResult<bool> {
        info!("Updating recipe: {}", id);

        let result = sqlx::query("UPDATE recipes SET title = $2, ingredients = $3 WHERE id = $1")
            .bind(id)
            .bind(title)
            .bind(ingredients)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        info!("Deleting recipe: {}", id);

        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_review(
        &self,
        recipe_id: Uuid,
        review_id: Uuid,
    ) -> RepositoryResult<Option<Review>> {
        let row = sqlx::query(
            r#"
            SELECT review
            FROM recipes, jsonb_array_elements(recipes.reviews) AS review
            WHERE recipes.id = $1 AND review->>'id' = $2
            "#,
        )
        .bind(recipe_id)
        .bind(review_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let review: Json<Review> = row.try_get("review")?;
                Ok(Some(review.0))
            }
            None => Ok(None),
        }
    }

    async fn add_review(
        &self,
        recipe_id: Uuid,
        input: ReviewInput,
    ) -> RepositoryResult<Option<Review>> {
        info!("Adding review to recipe: {}", recipe_id);
        self.mutate_reviews(recipe_id, |recipe| Some(recipe.add_review(input)))
            .await
    }

    async fn replace_review(
        &self,
        recipe_id: Uuid,
        review_id: Uuid,
        input: ReviewInput,
    ) -> RepositoryResult<bool> {
        info!("Replacing review {} on recipe {}", review_id, recipe_id);
        let outcome = self
            .mutate_reviews(recipe_id, |recipe| {
                recipe.replace_review(review_id, input).then_some(())
            })
            .await?;
        Ok(outcome.is_some())
    }

    async fn remove_review(&self, recipe_id: Uuid, review_id: Uuid) -> RepositoryResult<bool> {
        info!("Removing review {} from recipe {}", review_id, recipe_id);
        let outcome = self
            .mutate_reviews(recipe_id, |recipe| {
                recipe.remove_review(review_id).then_some(())
            })
            .await?;
        Ok(outcome.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("pasta"), "pasta");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[test]
    fn test_parse_stored_cuisine() {
        assert_eq!(parse_stored_cuisine(None), None);
        assert_eq!(parse_stored_cuisine(Some("malay")), Some(Cuisine::Malay));
        assert_eq!(parse_stored_cuisine(Some("martian")), None);
        assert_eq!(parse_stored_cuisine(Some("")), None);
    }
}

//! In-process repositories
//!
//! Used when the service runs with `RECIPES_STORAGE=memory` and by the test
//! suites. Data lives as long as the process.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RecipeRepository, RepositoryError, RepositoryResult, UserRepository};
use crate::models::{NewRecipe, NewUser, Recipe, RecipeSearch, Review, ReviewInput, User};

/// Recipe repository holding recipes in insertion order
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecipeRepository {
    recipes: Arc<RwLock<Vec<Recipe>>>,
}

impl InMemoryRecipeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn with_recipe<T>(&self, id: Uuid, f: impl FnOnce(&mut Recipe) -> T) -> Option<T> {
        let mut recipes = self.recipes.write().await;
        recipes.iter_mut().find(|r| r.id == id).map(f)
    }
}

#[async_trait]
impl RecipeRepository for InMemoryRecipeRepository {
    async fn create(&self, new_recipe: NewRecipe) -> RepositoryResult<Recipe> {
        let recipe = new_recipe.into_recipe(Uuid::new_v4(), Utc::now());
        self.recipes.write().await.push(recipe.clone());
        Ok(recipe)
    }

    async fn search(&self, criteria: &RecipeSearch) -> RepositoryResult<Vec<Recipe>> {
        let recipes = self.recipes.read().await;
        Ok(recipes
            .iter()
            .filter(|r| criteria.matches(r))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Recipe>> {
        let recipes = self.recipes.read().await;
        Ok(recipes.iter().find(|r| r.id == id).cloned())
    }

    async fn update_details(
        &self,
        id: Uuid,
        title: &str,
        ingredients: &[String],
    ) -> RepositoryResult<bool> {
        let updated = self
            .with_recipe(id, |recipe| {
                recipe.title = title.to_string();
                recipe.ingredients = ingredients.to_vec();
            })
            .await;
        Ok(updated.is_some())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let mut recipes = self.recipes.write().await;
        let before = recipes.len();
        recipes.retain(|r| r.id != id);
        Ok(recipes.len() != before)
    }

    async fn find_review(
        &self,
        recipe_id: Uuid,
        review_id: Uuid,
    ) -> RepositoryResult<Option<Review>> {
        let recipes = self.recipes.read().await;
        Ok(recipes
            .iter()
            .find(|r| r.id == recipe_id)
            .and_then(|r| r.review(review_id))
            .cloned())
    }

    async fn add_review(
        &self,
        recipe_id: Uuid,
        input: ReviewInput,
    ) -> RepositoryResult<Option<Review>> {
        Ok(self
            .with_recipe(recipe_id, |recipe| recipe.add_review(input))
            .await)
    }

    async fn replace_review(
        &self,
        recipe_id: Uuid,
        review_id: Uuid,
        input: ReviewInput,
    ) -> RepositoryResult<bool> {
        let replaced = self
            .with_recipe(recipe_id, |recipe| recipe.replace_review(review_id, input))
            .await;
        Ok(replaced.unwrap_or(false))
    }

    async fn remove_review(&self, recipe_id: Uuid, review_id: Uuid) -> RepositoryResult<bool> {
        let removed = self
            .with_recipe(recipe_id, |recipe| recipe.remove_review(review_id))
            .await;
        Ok(removed.unwrap_or(false))
    }
}

/// User repository keyed by email
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<Vec<User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> RepositoryResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(RepositoryError::DuplicateEmail(new_user.email));
        }

        let user = new_user.into_user(Uuid::new_v4(), Utc::now());
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cuisine, TagSet};

    fn new_recipe(title: &str) -> NewRecipe {
        NewRecipe {
            title: title.to_string(),
            ingredients: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            cuisine: Cuisine::Western,
            tags: TagSet::default(),
            author_id: None,
        }
    }

    fn review(email: &str) -> ReviewInput {
        ReviewInput {
            email: email.to_string(),
            text: format!("review by {email}"),
        }
    }

    #[tokio::test]
    async fn test_recipe_crud() -> RepositoryResult<()> {
        let repo = InMemoryRecipeRepository::new();
        let created = repo.create(new_recipe("Omelette")).await?;

        assert_eq!(repo.find_by_id(created.id).await?, Some(created.clone()));

        let ingredients = vec!["eggs".to_string(), "salt".to_string()];
        assert!(repo.update_details(created.id, "Plain omelette", &ingredients).await?);
        let updated = repo.find_by_id(created.id).await?.unwrap();
        assert_eq!(updated.title, "Plain omelette");
        assert_eq!(updated.ingredients, ingredients);
        assert_eq!(updated.cuisine, Some(Cuisine::Western));

        assert!(repo.delete(created.id).await?);
        assert!(!repo.delete(created.id).await?);
        assert_eq!(repo.find_by_id(created.id).await?, None);
        assert!(!repo.update_details(created.id, "gone", &ingredients).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_review_lifecycle() -> RepositoryResult<()> {
        let repo = InMemoryRecipeRepository::new();
        let recipe = repo.create(new_recipe("Curry")).await?;

        let first = repo.add_review(recipe.id, review("a@x.io")).await?.unwrap();
        let second = repo.add_review(recipe.id, review("b@x.io")).await?.unwrap();

        assert_eq!(repo.find_review(recipe.id, second.id).await?, Some(second.clone()));
        assert!(repo.remove_review(recipe.id, first.id).await?);

        let stored = repo.find_by_id(recipe.id).await?.unwrap();
        assert_eq!(stored.reviews, vec![second]);

        assert_eq!(repo.add_review(Uuid::new_v4(), review("c@x.io")).await?, None);
        assert!(!repo.remove_review(recipe.id, first.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() -> RepositoryResult<()> {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .create(NewUser {
                email: "cook@example.com".to_string(),
                password: "pw".to_string(),
            })
            .await?;

        let duplicate = repo
            .create(NewUser {
                email: "cook@example.com".to_string(),
                password: "other".to_string(),
            })
            .await;

        assert!(matches!(duplicate, Err(RepositoryError::DuplicateEmail(_))));
        assert_eq!(repo.find_by_email("cook@example.com").await?, Some(user.clone()));
        assert_eq!(repo.find_by_id(user.id).await?, Some(user));
        Ok(())
    }
}

//! Repositories for persistence operations
//!
//! Handlers talk to the traits defined here. [`recipe::PgRecipeRepository`]
//! and [`user::PgUserRepository`] store data in PostgreSQL, while the
//! [`memory`] module keeps everything in process for local runs and tests.

use async_trait::async_trait;
use common::error::DatabaseError;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewRecipe, NewUser, Recipe, RecipeSearch, Review, ReviewInput, User};

pub mod memory;
pub mod recipe;
pub mod user;

pub use memory::{InMemoryRecipeRepository, InMemoryUserRepository};
pub use recipe::PgRecipeRepository;
pub use user::PgUserRepository;

/// Errors surfaced by repositories
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database failure
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// A user with this email already exists
    #[error("Email {0} is already registered")]
    DuplicateEmail(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        Self::Database(DatabaseError::Query(error))
    }
}

/// Type alias for repository results
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Recipe persistence, including the reviews embedded in each recipe
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Insert a recipe and return it with its assigned id
    async fn create(&self, new_recipe: NewRecipe) -> RepositoryResult<Recipe>;

    /// Recipes matching the criteria, oldest first
    async fn search(&self, criteria: &RecipeSearch) -> RepositoryResult<Vec<Recipe>>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Recipe>>;

    /// Overwrite title and ingredients. Returns false if the recipe is missing
    async fn update_details(
        &self,
        id: Uuid,
        title: &str,
        ingredients: &[String],
    ) -> RepositoryResult<bool>;

    /// Returns false if the recipe is missing
    async fn delete(&self, id: Uuid) -> RepositoryResult<bool>;

    /// Fetch a single embedded review
    async fn find_review(
        &self,
        recipe_id: Uuid,
        review_id: Uuid,
    ) -> RepositoryResult<Option<Review>>;

    /// Append a review. Returns None if the recipe is missing
    async fn add_review(
        &self,
        recipe_id: Uuid,
        input: ReviewInput,
    ) -> RepositoryResult<Option<Review>>;

    /// Replace a review's email and text. Returns false if either id is unknown
    async fn replace_review(
        &self,
        recipe_id: Uuid,
        review_id: Uuid,
        input: ReviewInput,
    ) -> RepositoryResult<bool>;

    /// Remove a review. Returns false if either id is unknown
    async fn remove_review(&self, recipe_id: Uuid, review_id: Uuid) -> RepositoryResult<bool>;
}

/// User persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user; fails with [`RepositoryError::DuplicateEmail`] on a taken email
    async fn create(&self, new_user: NewUser) -> RepositoryResult<User>;

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>>;
}

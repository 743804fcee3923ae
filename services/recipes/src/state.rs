//! Application state shared across handlers

use std::sync::Arc;

use crate::repositories::{RecipeRepository, UserRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub recipe_repository: Arc<dyn RecipeRepository>,
    pub user_repository: Arc<dyn UserRepository>,
}

impl AppState {
    pub fn new(
        recipe_repository: Arc<dyn RecipeRepository>,
        user_repository: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            recipe_repository,
            user_repository,
        }
    }
}

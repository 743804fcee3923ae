//! Recipe service models

pub mod recipe;
pub mod review;
pub mod user;

// Re-export for convenience
pub use recipe::{Cuisine, NewRecipe, Recipe, RecipeForm, RecipeSearch, TagSet, split_ingredients};
pub use review::{Review, ReviewInput};
pub use user::{LoginCredentials, NewUser, User};

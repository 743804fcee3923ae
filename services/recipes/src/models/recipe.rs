//! Recipe model and related functionality

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::review::{Review, ReviewInput};

/// Cuisine a recipe belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cuisine {
    Chinese,
    Indian,
    Italian,
    Japanese,
    Malay,
    Western,
}

impl Cuisine {
    /// Every cuisine, in the order forms list them
    pub const ALL: [Cuisine; 6] = [
        Cuisine::Chinese,
        Cuisine::Indian,
        Cuisine::Italian,
        Cuisine::Japanese,
        Cuisine::Malay,
        Cuisine::Western,
    ];

    /// Value used in forms and in the database
    pub fn as_str(self) -> &'static str {
        match self {
            Cuisine::Chinese => "chinese",
            Cuisine::Indian => "indian",
            Cuisine::Italian => "italian",
            Cuisine::Japanese => "japanese",
            Cuisine::Malay => "malay",
            Cuisine::Western => "western",
        }
    }

    /// Human readable name
    pub fn label(self) -> &'static str {
        match self {
            Cuisine::Chinese => "Chinese",
            Cuisine::Indian => "Indian",
            Cuisine::Italian => "Italian",
            Cuisine::Japanese => "Japanese",
            Cuisine::Malay => "Malay",
            Cuisine::Western => "Western",
        }
    }
}

impl fmt::Display for Cuisine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned when a cuisine value is not one of [`Cuisine::ALL`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown cuisine: {0}")]
pub struct UnknownCuisine(pub String);

impl FromStr for Cuisine {
    type Err = UnknownCuisine;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        Cuisine::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| UnknownCuisine(value.to_string()))
    }
}

/// Canonical set of selected tags
///
/// Tags arrive from forms as nothing, one value, or a repeated field. All
/// three shapes collapse into this sorted, de-duplicated set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    /// Tags offered on the recipe form
    pub const AVAILABLE: [&'static str; 5] = ["easy", "healthy", "quick", "spicy", "vegetarian"];

    /// Build a set from submitted values, trimming and dropping blanks
    pub fn from_submitted<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            values
                .into_iter()
                .map(|v| v.as_ref().trim().to_string())
                .filter(|v| !v.is_empty())
                .collect(),
        )
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

/// Split a comma separated ingredient list into trimmed, non-empty tokens
pub fn split_ingredients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Recipe entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Uuid,
    pub title: String,
    pub ingredients: Vec<String>,
    pub cuisine: Option<Cuisine>,
    #[serde(default)]
    pub tags: TagSet,
    pub author_id: Option<Uuid>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    pub created_at: DateTime<Utc>,
}

impl Recipe {
    /// Find a review by id
    pub fn review(&self, review_id: Uuid) -> Option<&Review> {
        self.reviews.iter().find(|r| r.id == review_id)
    }

    /// Append a review with a fresh identifier and return it
    pub fn add_review(&mut self, input: ReviewInput) -> Review {
        let review = Review::new(input);
        self.reviews.push(review.clone());
        review
    }

    /// Replace the email and text of a review in place.
    /// Returns false when no review has that id.
    pub fn replace_review(&mut self, review_id: Uuid, input: ReviewInput) -> bool {
        match self.reviews.iter_mut().find(|r| r.id == review_id) {
            Some(review) => {
                review.email = input.email;
                review.text = input.text;
                true
            }
            None => false,
        }
    }

    /// Remove a review by id, keeping the order of the others.
    /// Returns false when no review has that id.
    pub fn remove_review(&mut self, review_id: Uuid) -> bool {
        let before = self.reviews.len();
        self.reviews.retain(|r| r.id != review_id);
        self.reviews.len() != before
    }
}

/// New recipe creation payload, produced by validation
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecipe {
    pub title: String,
    pub ingredients: Vec<String>,
    pub cuisine: Cuisine,
    pub tags: TagSet,
    pub author_id: Option<Uuid>,
}

impl NewRecipe {
    /// Materialise the recipe once the store has assigned an id
    pub fn into_recipe(self, id: Uuid, created_at: DateTime<Utc>) -> Recipe {
        Recipe {
            id,
            title: self.title,
            ingredients: self.ingredients,
            cuisine: Some(self.cuisine),
            tags: self.tags,
            author_id: self.author_id,
            reviews: Vec::new(),
            created_at,
        }
    }
}

/// Recipe form as submitted by the browser
///
/// Every field defaults to empty so a partial submission still reaches
/// validation and can be echoed back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RecipeForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub ingredients: String,
    #[serde(default)]
    pub cuisine: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl RecipeForm {
    /// Pre-fill the form from a stored recipe
    pub fn from_recipe(recipe: &Recipe) -> Self {
        Self {
            title: recipe.title.clone(),
            ingredients: recipe.ingredients.join(","),
            cuisine: recipe
                .cuisine
                .map(|c| c.as_str().to_string())
                .unwrap_or_default(),
            tags: recipe.tags.to_vec(),
        }
    }
}

/// Search criteria built from the search form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeSearch {
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    /// Exact ingredient that must be present
    pub ingredient: Option<String>,
}

impl RecipeSearch {
    /// Build criteria, ignoring blank parameters
    pub fn new(title: Option<&str>, ingredient: Option<&str>) -> Self {
        fn non_blank(value: Option<&str>) -> Option<String> {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }

        Self {
            title: non_blank(title),
            ingredient: non_blank(ingredient),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.ingredient.is_none()
    }

    /// Whether a recipe satisfies every criterion
    pub fn matches(&self, recipe: &Recipe) -> bool {
        let title_ok = self.title.as_ref().is_none_or(|needle| {
            recipe
                .title
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        let ingredient_ok = self
            .ingredient
            .as_ref()
            .is_none_or(|wanted| recipe.ingredients.iter().any(|i| i == wanted));

        title_ok && ingredient_ok
    }
}

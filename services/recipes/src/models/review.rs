//! Review model, embedded in a recipe

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Review entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub email: String,
    pub text: String,
}

impl Review {
    /// Create a review with a freshly generated id
    pub fn new(input: ReviewInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: input.email,
            text: input.text,
        }
    }
}

/// Review creation and update payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReviewInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub text: String,
}

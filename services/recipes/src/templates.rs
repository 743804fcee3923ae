//! HTML templates and their view models

use askama::Template;
use axum::response::Html;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Cuisine, Recipe, RecipeForm, Review, TagSet},
};

/// Render a template into an HTML response body
pub fn render<T: Template>(template: &T) -> AppResult<Html<String>> {
    Ok(Html(template.render()?))
}

/// One row of the recipe list
pub struct RecipeRow {
    pub id: Uuid,
    pub title: String,
    pub ingredients: String,
    pub cuisine: String,
    pub tags: String,
    pub review_count: usize,
}

impl From<&Recipe> for RecipeRow {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title.clone(),
            ingredients: recipe.ingredients.join(", "),
            cuisine: recipe.cuisine.map(|c| c.label().to_string()).unwrap_or_default(),
            tags: recipe.tags.iter().collect::<Vec<_>>().join(", "),
            review_count: recipe.reviews.len(),
        }
    }
}

#[derive(Template)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub title: String,
    pub ingredients: String,
    pub recipes: Vec<RecipeRow>,
}

pub struct CuisineOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

pub struct TagOption {
    pub value: String,
    pub checked: bool,
}

#[derive(Template)]
#[template(path = "recipe_form.html")]
pub struct RecipeFormTemplate {
    pub heading: &'static str,
    pub action: String,
    pub title: String,
    pub ingredients: String,
    pub cuisines: Vec<CuisineOption>,
    pub tags: Vec<TagOption>,
    pub errors: Vec<String>,
}

impl RecipeFormTemplate {
    /// Build the form view, echoing whatever was submitted
    pub fn new(
        heading: &'static str,
        action: impl Into<String>,
        form: &RecipeForm,
        errors: Vec<String>,
    ) -> Self {
        let selected = TagSet::from_submitted(&form.tags);

        let cuisines = Cuisine::ALL
            .into_iter()
            .map(|c| CuisineOption {
                value: c.as_str(),
                label: c.label(),
                selected: c.as_str().eq_ignore_ascii_case(form.cuisine.trim()),
            })
            .collect();

        let mut tags: Vec<TagOption> = TagSet::AVAILABLE
            .into_iter()
            .map(|t| TagOption {
                value: t.to_string(),
                checked: selected.contains(t),
            })
            .collect();
        tags.extend(
            selected
                .iter()
                .filter(|t| !TagSet::AVAILABLE.contains(t))
                .map(|t| TagOption {
                    value: t.to_string(),
                    checked: true,
                }),
        );

        Self {
            heading,
            action: action.into(),
            title: form.title.clone(),
            ingredients: form.ingredients.clone(),
            cuisines,
            tags,
            errors,
        }
    }
}

#[derive(Template)]
#[template(path = "delete_recipe.html")]
pub struct DeleteRecipeTemplate {
    pub id: Uuid,
    pub title: String,
}

#[derive(Template)]
#[template(path = "reviews.html")]
pub struct ReviewsTemplate {
    pub recipe_id: Uuid,
    pub recipe_title: String,
    pub reviews: Vec<Review>,
}

#[derive(Template)]
#[template(path = "review_form.html")]
pub struct ReviewFormTemplate {
    pub heading: &'static str,
    pub action: String,
    pub recipe_id: Uuid,
    pub email: String,
    pub text: String,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub email: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub email: Option<String>,
}

#[derive(Template)]
#[template(path = "logout.html")]
pub struct LogoutTemplate {
    pub email: Option<String>,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub id: Uuid,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_form_echoes_input() {
        let form = RecipeForm {
            title: "Pad <Thai>".to_string(),
            ingredients: "noodles, tamarind".to_string(),
            cuisine: "malay".to_string(),
            tags: vec!["quick".to_string(), "street food".to_string()],
        };

        let template = RecipeFormTemplate::new(
            "Add a recipe",
            "/add-recipe",
            &form,
            vec!["Please provide at least 3 ingredients, separated by commas".to_string()],
        );

        assert!(template.cuisines.iter().any(|c| c.value == "malay" && c.selected));
        assert_eq!(template.cuisines.iter().filter(|c| c.selected).count(), 1);
        assert!(template.tags.iter().any(|t| t.value == "quick" && t.checked));
        assert!(template.tags.iter().any(|t| t.value == "street food" && t.checked));

        let html = template.render().unwrap();
        assert!(html.contains("Pad &#60;Thai&#62;"));
        assert!(!html.contains("Pad <Thai>"));
        assert!(html.contains("noodles, tamarind"));
        assert!(html.contains("Please provide at least 3 ingredients"));
    }

    #[test]
    fn test_empty_form_selects_nothing() {
        let template =
            RecipeFormTemplate::new("Add a recipe", "/add-recipe", &RecipeForm::default(), vec![]);

        assert!(template.cuisines.iter().all(|c| !c.selected));
        assert!(template.tags.iter().all(|t| !t.checked));
        assert_eq!(template.tags.len(), TagSet::AVAILABLE.len());
    }
}

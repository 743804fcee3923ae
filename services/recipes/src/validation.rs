//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::models::{Cuisine, NewRecipe, NewUser, RecipeForm, TagSet, split_ingredients};

/// Minimum number of ingredients a new recipe needs
pub const MIN_INGREDIENTS: usize = 3;

/// Validate recipe title
pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Please provide the title".to_string());
    }

    Ok(())
}

/// Validate and parse the selected cuisine
pub fn validate_cuisine(cuisine: &str) -> Result<Cuisine, String> {
    if cuisine.trim().is_empty() {
        return Err("Please select a cuisine".to_string());
    }

    cuisine
        .parse()
        .map_err(|_| "Please select a valid cuisine".to_string())
}

/// Validate ingredient tokens
pub fn validate_ingredients(ingredients: &[String]) -> Result<(), String> {
    if ingredients.len() < MIN_INGREDIENTS {
        return Err(format!(
            "Please provide at least {} ingredients, separated by commas",
            MIN_INGREDIENTS
        ));
    }

    Ok(())
}

/// Validate a submitted recipe form, collecting every error
pub fn validate_recipe(
    form: &RecipeForm,
    author_id: Option<Uuid>,
) -> Result<NewRecipe, Vec<String>> {
    let mut errors = Vec::new();

    let cuisine = match validate_cuisine(&form.cuisine) {
        Ok(cuisine) => Some(cuisine),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    if let Err(e) = validate_title(&form.title) {
        errors.push(e);
    }

    let ingredients = split_ingredients(&form.ingredients);
    if let Err(e) = validate_ingredients(&ingredients) {
        errors.push(e);
    }

    match cuisine {
        Some(cuisine) if errors.is_empty() => Ok(NewRecipe {
            title: form.title.trim().to_string(),
            ingredients,
            cuisine,
            tags: TagSet::from_submitted(&form.tags),
            author_id,
        }),
        _ => Err(errors),
    }
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate a registration form, collecting every error
pub fn validate_registration(form: &NewUser) -> Result<(), Vec<String>> {
    let errors: Vec<String> = [
        validate_email(form.email.trim()),
        validate_password(&form.password),
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect();

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, ingredients: &str, cuisine: &str, tags: &[&str]) -> RecipeForm {
        RecipeForm {
            title: title.to_string(),
            ingredients: ingredients.to_string(),
            cuisine: cuisine.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_valid_recipe() {
        let author = Uuid::new_v4();
        let recipe = validate_recipe(
            &form(" Carbonara ", "spaghetti, eggs, pecorino, guanciale", "italian", &["quick"]),
            Some(author),
        )
        .unwrap();

        assert_eq!(recipe.title, "Carbonara");
        assert_eq!(recipe.ingredients.len(), 4);
        assert_eq!(recipe.cuisine, Cuisine::Italian);
        assert!(recipe.tags.contains("quick"));
        assert_eq!(recipe.author_id, Some(author));
    }

    #[test]
    fn test_recipe_errors_are_collected() {
        let errors = validate_recipe(&form("", "salt, pepper", "", &[]), None).unwrap_err();

        assert_eq!(
            errors,
            vec![
                "Please select a cuisine".to_string(),
                "Please provide the title".to_string(),
                "Please provide at least 3 ingredients, separated by commas".to_string(),
            ]
        );
    }

    #[test]
    fn test_unknown_cuisine_is_rejected() {
        let errors = validate_recipe(&form("Soup", "water, salt, leek", "martian", &[]), None)
            .unwrap_err();

        assert_eq!(errors, vec!["Please select a valid cuisine".to_string()]);
    }

    #[test]
    fn test_blank_ingredient_tokens_do_not_count() {
        assert!(validate_recipe(&form("Toast", "bread, , butter,", "western", &[]), None).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("cook@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
    }

    #[test]
    fn test_validate_registration() {
        let ok = NewUser {
            email: "cook@example.com".to_string(),
            password: "secret".to_string(),
        };
        let bad = NewUser {
            email: "cook".to_string(),
            password: String::new(),
        };

        assert!(validate_registration(&ok).is_ok());
        assert_eq!(validate_registration(&bad).unwrap_err().len(), 2);
    }
}

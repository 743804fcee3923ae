//! Recipe listing, creation, editing and deletion

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{RecipeForm, RecipeSearch, split_ingredients},
    session::current_user,
    templates::{DeleteRecipeTemplate, RecipeFormTemplate, RecipeRow, SearchTemplate, render},
    validation::validate_recipe,
};

/// Query string of the search page
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub title: Option<String>,
    pub ingredients: Option<String>,
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Html<String>> {
    let criteria = RecipeSearch::new(query.title.as_deref(), query.ingredients.as_deref());
    let recipes = state.recipe_repository.search(&criteria).await?;
    debug!("Search {:?} matched {} recipes", criteria, recipes.len());

    render(&SearchTemplate {
        title: query.title.unwrap_or_default(),
        ingredients: query.ingredients.unwrap_or_default(),
        recipes: recipes.iter().map(RecipeRow::from).collect(),
    })
}

pub async fn add_form() -> AppResult<Html<String>> {
    render(&RecipeFormTemplate::new(
        "Add a recipe",
        "/add-recipe",
        &RecipeForm::default(),
        Vec::new(),
    ))
}

pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RecipeForm>,
) -> AppResult<Response> {
    let author_id = current_user(&session).await?.map(|user| user.id);

    match validate_recipe(&form, author_id) {
        Ok(new_recipe) => {
            let recipe = state.recipe_repository.create(new_recipe).await?;
            info!("Recipe created: {} ({})", recipe.title, recipe.id);
            Ok(Redirect::to("/search-recipes").into_response())
        }
        Err(errors) => {
            warn!("Rejected recipe submission: {}", errors.join("; "));
            let page = render(&RecipeFormTemplate::new(
                "Add a recipe",
                "/add-recipe",
                &form,
                errors,
            ))?;
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
    }
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Html<String>> {
    let recipe = state
        .recipe_repository
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Recipe"))?;

    render(&RecipeFormTemplate::new(
        "Edit recipe",
        format!("/edit-recipe/{}", id),
        &RecipeForm::from_recipe(&recipe),
        Vec::new(),
    ))
}

/// Title and ingredients are stored as submitted, without validation
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<RecipeForm>,
) -> AppResult<Redirect> {
    let ingredients = split_ingredients(&form.ingredients);
    let updated = state
        .recipe_repository
        .update_details(id, form.title.trim(), &ingredients)
        .await?;

    if !updated {
        return Err(AppError::NotFound("Recipe"));
    }

    info!("Recipe updated: {}", id);
    Ok(Redirect::to("/search-recipes"))
}

pub async fn delete_confirm(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Html<String>> {
    let recipe = state
        .recipe_repository
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Recipe"))?;

    render(&DeleteRecipeTemplate {
        id: recipe.id,
        title: recipe.title,
    })
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Redirect> {
    if state.recipe_repository.delete(id).await? {
        info!("Recipe deleted: {}", id);
    } else {
        debug!("Delete of unknown recipe {}", id);
    }

    Ok(Redirect::to("/search-recipes"))
}

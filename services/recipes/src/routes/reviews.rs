//! Reviews embedded in a recipe

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
};
use axum_extra::extract::Form;
use tower_sessions::Session;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::ReviewInput,
    session::current_user,
    templates::{ReviewFormTemplate, ReviewsTemplate, render},
};

fn reviews_url(recipe_id: Uuid) -> String {
    format!("/recipes/{}/reviews", recipe_id)
}

pub async fn list(
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
) -> AppResult<Html<String>> {
    let recipe = state
        .recipe_repository
        .find_by_id(recipe_id)
        .await?
        .ok_or(AppError::NotFound("Recipe"))?;

    render(&ReviewsTemplate {
        recipe_id: recipe.id,
        recipe_title: recipe.title,
        reviews: recipe.reviews,
    })
}

/// Review form, with the email pre-filled for logged-in users
pub async fn add_form(
    State(state): State<AppState>,
    session: Session,
    Path(recipe_id): Path<Uuid>,
) -> AppResult<Html<String>> {
    if state.recipe_repository.find_by_id(recipe_id).await?.is_none() {
        return Err(AppError::NotFound("Recipe"));
    }

    render(&ReviewFormTemplate {
        heading: "Add a review",
        action: format!("{}/add", reviews_url(recipe_id)),
        recipe_id,
        email: current_user(&session)
            .await?
            .map(|user| user.email)
            .unwrap_or_default(),
        text: String::new(),
    })
}

pub async fn add(
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
    Form(input): Form<ReviewInput>,
) -> AppResult<Redirect> {
    let review = state
        .recipe_repository
        .add_review(recipe_id, input)
        .await?
        .ok_or(AppError::NotFound("Recipe"))?;

    info!("Review {} added to recipe {}", review.id, recipe_id);
    Ok(Redirect::to(&reviews_url(recipe_id)))
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path((recipe_id, review_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Html<String>> {
    let review = state
        .recipe_repository
        .find_review(recipe_id, review_id)
        .await?
        .ok_or(AppError::NotFound("Review"))?;

    render(&ReviewFormTemplate {
        heading: "Edit review",
        action: format!("{}/{}", reviews_url(recipe_id), review_id),
        recipe_id,
        email: review.email,
        text: review.text,
    })
}

pub async fn edit(
    State(state): State<AppState>,
    Path((recipe_id, review_id)): Path<(Uuid, Uuid)>,
    Form(input): Form<ReviewInput>,
) -> AppResult<Redirect> {
    let replaced = state
        .recipe_repository
        .replace_review(recipe_id, review_id, input)
        .await?;

    if !replaced {
        return Err(AppError::NotFound("Review"));
    }

    info!("Review {} updated on recipe {}", review_id, recipe_id);
    Ok(Redirect::to(&reviews_url(recipe_id)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((recipe_id, review_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Redirect> {
    if state
        .recipe_repository
        .remove_review(recipe_id, review_id)
        .await?
    {
        info!("Review {} removed from recipe {}", review_id, recipe_id);
    } else {
        debug!("Delete of unknown review {} on recipe {}", review_id, recipe_id);
    }

    Ok(Redirect::to(&reviews_url(recipe_id)))
}

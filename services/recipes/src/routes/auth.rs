//! Registration, login, logout and profile

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use tower_sessions::Session;
use tracing::{info, warn};

use crate::{
    AppState,
    error::AppResult,
    models::{LoginCredentials, NewUser},
    repositories::RepositoryError,
    session::{current_user, log_in, log_out},
    templates::{LoginTemplate, LogoutTemplate, ProfileTemplate, RegisterTemplate, render},
    validation::validate_registration,
};

pub async fn register_form() -> AppResult<Html<String>> {
    render(&RegisterTemplate {
        email: String::new(),
        errors: Vec::new(),
    })
}

fn registration_failed(email: String, errors: Vec<String>) -> AppResult<Response> {
    let page = render(&RegisterTemplate { email, errors })?;
    Ok((StatusCode::BAD_REQUEST, page).into_response())
}

pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<NewUser>,
) -> AppResult<Response> {
    let new_user = NewUser {
        email: form.email.trim().to_string(),
        password: form.password,
    };

    if let Err(errors) = validate_registration(&new_user) {
        warn!("Rejected registration: {}", errors.join("; "));
        return registration_failed(new_user.email, errors);
    }

    match state.user_repository.create(new_user).await {
        Ok(user) => {
            info!("User registered: {}", user.id);
            Ok(Redirect::to("/login").into_response())
        }
        Err(RepositoryError::DuplicateEmail(email)) => {
            warn!("Registration with taken email: {}", email);
            registration_failed(email, vec!["Email is already registered".to_string()])
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn login_form(session: Session) -> AppResult<Html<String>> {
    render(&LoginTemplate {
        email: current_user(&session).await?.map(|user| user.email),
    })
}

/// Exact email and password match; the reply is plain text either way
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(credentials): Form<LoginCredentials>,
) -> AppResult<&'static str> {
    let email = credentials.email.trim();
    info!("Login attempt for user: {}", email);

    match state.user_repository.find_by_email(email).await? {
        Some(user) if user.password_matches(&credentials.password) => {
            log_in(&session, &user).await?;
            Ok("Login successful")
        }
        _ => {
            warn!("Login failed for user: {}", email);
            Ok("Login failed")
        }
    }
}

pub async fn logout_form(session: Session) -> AppResult<Html<String>> {
    render(&LogoutTemplate {
        email: current_user(&session).await?.map(|user| user.email),
    })
}

pub async fn logout(session: Session) -> AppResult<Redirect> {
    if let Some(user) = current_user(&session).await? {
        info!("User logged out: {}", user.id);
    }
    log_out(&session).await?;
    Ok(Redirect::to("/login"))
}

/// Profile of the logged-in user
pub async fn profile(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    let Some(current) = current_user(&session).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    let Some(user) = state.user_repository.find_by_id(current.id).await? else {
        warn!("Session refers to missing user {}", current.id);
        log_out(&session).await?;
        return Ok(Redirect::to("/login").into_response());
    };

    let page = render(&ProfileTemplate {
        id: user.id,
        email: user.email,
    })?;
    Ok(page.into_response())
}

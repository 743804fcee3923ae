//! Recipe sharing web application
//!
//! Server-rendered pages for searching, adding, editing and deleting
//! recipes, reviews embedded in each recipe, user registration and
//! cookie-based login. Handlers reach storage through the repository
//! traits in [`repositories`] and the logged-in user through [`session::current_user`].

pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod state;
pub mod templates;
pub mod validation;

pub use state::AppState;

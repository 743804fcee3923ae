use std::sync::Arc;

use anyhow::Result;
use common::{
    cache::{KeyValueStore, MemoryStore, RedisConfig, RedisPool},
    database::{self as db, DatabaseConfig},
};
use recipes::{
    AppState,
    config::{ServerConfig, StorageBackend},
    database::run_migrations,
    repositories::{
        InMemoryRecipeRepository, InMemoryUserRepository, PgRecipeRepository, PgUserRepository,
        RecipeRepository, UserRepository,
    },
    routes,
    session::create_session_layer,
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting recipe service");

    let config = ServerConfig::from_env()?;

    let (recipe_repository, user_repository, session_store): (
        Arc<dyn RecipeRepository>,
        Arc<dyn UserRepository>,
        Arc<dyn KeyValueStore>,
    ) = match config.storage {
        StorageBackend::Postgres => {
            // Initialize database connection pool
            let db_config = DatabaseConfig::from_env()?;
            let pool = db::init_pool(&db_config).await?;

            // Check database connectivity
            if db::health_check(&pool).await? {
                info!("Database connection successful");
            } else {
                anyhow::bail!("Failed to connect to database");
            }

            run_migrations(&pool).await?;

            // Initialize Redis connection pool
            let redis_config = RedisConfig::from_env()?;
            let redis_pool = RedisPool::new(&redis_config).await?;
            if !redis_pool.health_check().await? {
                anyhow::bail!("Failed to connect to Redis");
            }

            (
                Arc::new(PgRecipeRepository::new(pool.clone())),
                Arc::new(PgUserRepository::new(pool)),
                Arc::new(redis_pool),
            )
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage, data is lost on restart");
            (
                Arc::new(InMemoryRecipeRepository::new()),
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(MemoryStore::new()),
            )
        }
    };

    let sessions = create_session_layer(session_store, &config.session_settings());
    let app_state = AppState::new(recipe_repository, user_repository);

    // Start the web server
    let app = routes::create_router(app_state, sessions);

    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Recipe service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}

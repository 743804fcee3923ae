//! Common library for the Recipe Box application
//!
//! This crate provides shared functionality used by the services of the
//! workspace: PostgreSQL connectivity, the key-value store used for
//! sessions, and the shared error types.
//!
//! ```rust,no_run
//! use common::cache::{KeyValueStore, RedisConfig, RedisPool};
//! use common::database::{DatabaseConfig, health_check, init_pool};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = init_pool(&DatabaseConfig::from_env()?).await?;
//!     let redis = RedisPool::new(&RedisConfig::from_env()?).await?;
//!     println!("database: {}", health_check(&pool).await?);
//!     println!("redis: {}", redis.health_check().await?);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod database;
pub mod error;

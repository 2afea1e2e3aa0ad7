//! Core persistence for the Cookbook app.
//! This crate owns the recipe schema, the on-device store and the live
//! queries that screens subscribe to.

pub mod config;
pub mod db;
pub mod lifecycle;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::StoreConfig;
pub use lifecycle::DatabaseManager;
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::recipe::{NewRecipe, Recipe, RecipeId, RecipeValidationError};
pub use repo::recipe_repo::{RecipeRepository, RepoError, RepoResult, SqliteRecipeRepository};
pub use service::recipe_service::{RecipeService, ServiceError, ServiceResult};
pub use store::{
    LiveQuery, RecipeDao, RecipeDatabase, StoreError, StoreResult, SubscriptionHandle,
    SubscriptionScope,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

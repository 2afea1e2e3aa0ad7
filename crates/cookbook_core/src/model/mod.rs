//! Domain model for persisted recipes.
//!
//! # Responsibility
//! - Define the single persisted entity and its insert-time shape.
//! - Provide caller-side validation used before any write reaches storage.
//!
//! # Invariants
//! - Every stored recipe is identified by an engine-assigned `RecipeId`.
//! - Deletion is permanent; there is no tombstone state.

pub mod recipe;

//! Repository layer over the recipe table.
//!
//! # Responsibility
//! - Define the blocking data access contract used by the async store.
//! - Keep SQL text and row mapping inside the persistence boundary.
//!
//! # Invariants
//! - Repositories never validate user input; the calling layer does.
//! - Zero-row updates and deletes are no-ops, not errors.

pub mod recipe_repo;

//! Use-case services for recipe screens.
//!
//! # Responsibility
//! - Enforce caller-side rules before writes reach the store.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod recipe_service;

//! Flutter-facing bindings for the Cookbook core.

pub mod api;

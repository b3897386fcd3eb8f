//! Repository layer over the SQLite meal store.
//!
//! # Responsibility
//! - Expose the store operations consumed by catalog, planner and shopping
//!   list services.
//! - Keep SQL text and row parsing out of the service layer.
//!
//! # Invariants
//! - Repositories only accept connections at the latest schema version.
//! - Read paths reject rows with unknown category/day values instead of
//!   masking them.

pub mod meal_repo;
pub mod plan_repo;

//! Domain model for meals, weekly plans and shopping lists.
//!
//! # Responsibility
//! - Define the data shapes shared by repositories and services.
//! - Own input validation rules for meal names and ingredients.
//!
//! # Invariants
//! - Meal names are unique within a category, not globally.
//! - A stored plan holds either zero or all 21 slots.

pub mod catalog;
pub mod meal;
pub mod plan;
pub mod shopping;

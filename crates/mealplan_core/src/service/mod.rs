//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the add/show/plan/save use-cases.
//! - Return explicit outcomes so the interactive layer decides what to print.
//!
//! # Invariants
//! - Services never keep a catalog between calls; callers pass a fresh one.

pub mod catalog_service;
pub mod export;
pub mod planner;
pub mod shopping_service;

//! Core domain logic for the meal planner.
//! This crate owns meal validation, weekly planning and shopping list
//! aggregation on top of a SQLite store.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::catalog::Catalog;
pub use model::meal::{
    parse_ingredient_line, validate_ingredient, validate_meal_name, IngredientId, Meal,
    MealCategory, MealId, MealValidationError, Weekday,
};
pub use model::plan::{DayMenu, Plan, PlanDraft, PlanSlot, NO_MEAL_PLANNED, SLOTS_PER_WEEK};
pub use model::shopping::{format_line, ShoppingList};
pub use repo::meal_repo::{MealRepository, MealRow, RepoError, RepoResult, SqliteMealRepository};
pub use repo::plan_repo::{PlanRepository, SqlitePlanRepository};
pub use service::catalog_service::{AddMealOutcome, CatalogError, IngredientFailure, MealCatalog};
pub use service::planner::{MealSelector, PlanError, PlanOutcome, Planner, PlannerState};
pub use service::shopping_service::{SaveError, SaveReport, ShoppingListBuilder};
pub use tokio_util::sync::CancellationToken;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Meal catalog use-case service.
//!
//! # Responsibility
//! - Load the grouped meal catalog from the store.
//! - Validate and persist new meals with process-local id allocation.
//!
//! # Invariants
//! - Id counters start at `max(stored id) + 1` and only move forward; an id
//!   is consumed even when its insert fails.
//! - A meal header is never rolled back because an ingredient insert failed.

use crate::model::catalog::Catalog;
use crate::model::meal::{
    validate_ingredient, validate_meal_name, IngredientId, Meal, MealCategory, MealId,
    MealValidationError,
};
use crate::repo::meal_repo::{MealRepository, RepoError, RepoResult};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from catalog service operations.
#[derive(Debug)]
pub enum CatalogError {
    /// Name or ingredient text failed validation.
    Validation(MealValidationError),
    /// A meal with this name already exists in the category.
    DuplicateMeal {
        category: MealCategory,
        name: String,
    },
    /// Meal header could not be persisted.
    Repo(RepoError),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateMeal { category, name } => {
                write!(f, "meal `{name}` already exists in {category}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::DuplicateMeal { .. } => None,
        }
    }
}

impl From<MealValidationError> for CatalogError {
    fn from(value: MealValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for CatalogError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Ingredient row that could not be stored.
#[derive(Debug)]
pub struct IngredientFailure {
    pub ingredient: String,
    pub error: RepoError,
}

/// Result of a successful meal header insert.
#[derive(Debug)]
pub struct AddMealOutcome {
    pub meal_id: MealId,
    /// Ingredients persisted for the new meal, in input order.
    pub stored_ingredients: Vec<String>,
    /// Ingredients whose rows failed; the meal stays without them.
    pub failed_ingredients: Vec<IngredientFailure>,
}

impl AddMealOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed_ingredients.is_empty()
    }
}

/// Catalog facade over a meal repository.
pub struct MealCatalog<R: MealRepository> {
    repo: R,
    next_meal_id: MealId,
    next_ingredient_id: IngredientId,
}

impl<R: MealRepository> MealCatalog<R> {
    /// Creates the service and seeds id counters from stored rows.
    pub fn try_new(repo: R) -> RepoResult<Self> {
        let next_meal_id = repo.max_meal_id()?.map_or(1, |id| id + 1);
        let next_ingredient_id = repo.max_ingredient_id()?.map_or(1, |id| id + 1);
        Ok(Self {
            repo,
            next_meal_id,
            next_ingredient_id,
        })
    }

    /// Reads every meal with its ingredients into a fresh catalog.
    pub fn load(&self) -> RepoResult<Catalog> {
        let mut catalog = Catalog::new();
        for row in self.repo.list_meals()? {
            let ingredients = self.repo.list_ingredients(row.id)?;
            catalog.insert(Meal {
                id: row.id,
                category: row.category,
                name: row.name,
                ingredients,
            });
        }
        info!(
            "event=catalog_load module=catalog status=ok meals={}",
            catalog.len()
        );
        Ok(catalog)
    }

    /// Validates and stores a new meal.
    ///
    /// # Contract
    /// - Fails without writing anything on validation or duplicate errors.
    /// - Fails with `Repo` when the meal header insert fails.
    /// - Ingredient insert failures are collected in the outcome.
    pub fn add(
        &mut self,
        category: MealCategory,
        name: &str,
        ingredients: &[String],
    ) -> Result<AddMealOutcome, CatalogError> {
        let name = validate_meal_name(name)?;
        if ingredients.is_empty() {
            return Err(MealValidationError::EmptyIngredient.into());
        }
        let ingredients = ingredients
            .iter()
            .map(|ingredient| validate_ingredient(ingredient))
            .collect::<Result<Vec<_>, _>>()?;

        if self.repo.find_meal_id(category, &name)?.is_some() {
            return Err(CatalogError::DuplicateMeal { category, name });
        }

        let meal_id = self.allocate_meal_id();
        if let Err(err) = self.repo.insert_meal(meal_id, category, &name) {
            warn!(
                "event=meal_add module=catalog status=error category={} meal_id={} error={}",
                category, meal_id, err
            );
            return Err(err.into());
        }

        let mut stored_ingredients = Vec::with_capacity(ingredients.len());
        let mut failed_ingredients = Vec::new();
        for ingredient in ingredients {
            let ingredient_id = self.allocate_ingredient_id();
            match self
                .repo
                .insert_ingredient(ingredient_id, meal_id, &ingredient)
            {
                Ok(()) => stored_ingredients.push(ingredient),
                Err(error) => {
                    warn!(
                        "event=ingredient_add module=catalog status=error meal_id={} ingredient_id={} error={}",
                        meal_id, ingredient_id, error
                    );
                    failed_ingredients.push(IngredientFailure { ingredient, error });
                }
            }
        }

        info!(
            "event=meal_add module=catalog status=ok category={} meal_id={} ingredients={} failed={}",
            category,
            meal_id,
            stored_ingredients.len(),
            failed_ingredients.len()
        );
        Ok(AddMealOutcome {
            meal_id,
            stored_ingredients,
            failed_ingredients,
        })
    }

    /// Loads the catalog and returns one category's names sorted.
    pub fn list_by_category(&self, category: MealCategory) -> RepoResult<Vec<String>> {
        Ok(self.load()?.list_by_category(category))
    }

    fn allocate_meal_id(&mut self) -> MealId {
        let id = self.next_meal_id;
        self.next_meal_id += 1;
        id
    }

    fn allocate_ingredient_id(&mut self) -> IngredientId {
        let id = self.next_ingredient_id;
        self.next_ingredient_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogError, MealCatalog};
    use crate::db::DbError;
    use crate::model::meal::{IngredientId, MealCategory, MealId, MealValidationError};
    use crate::repo::meal_repo::{MealRepository, MealRow, RepoError, RepoResult};
    use std::cell::RefCell;

    /// In-memory repository that refuses one ingredient name.
    #[derive(Default)]
    struct FlakyRepo {
        meals: RefCell<Vec<MealRow>>,
        ingredients: RefCell<Vec<(IngredientId, MealId, String)>>,
        reject_ingredient: Option<&'static str>,
    }

    impl MealRepository for FlakyRepo {
        fn insert_meal(&self, id: MealId, category: MealCategory, name: &str) -> RepoResult<()> {
            self.meals.borrow_mut().push(MealRow {
                id,
                category,
                name: name.to_string(),
            });
            Ok(())
        }

        fn insert_ingredient(
            &self,
            id: IngredientId,
            meal_id: MealId,
            name: &str,
        ) -> RepoResult<()> {
            if self.reject_ingredient == Some(name) {
                return Err(RepoError::Db(DbError::Sqlite(
                    rusqlite::Error::InvalidQuery,
                )));
            }
            self.ingredients
                .borrow_mut()
                .push((id, meal_id, name.to_string()));
            Ok(())
        }

        fn list_meals(&self) -> RepoResult<Vec<MealRow>> {
            Ok(self.meals.borrow().clone())
        }

        fn list_ingredients(&self, meal_id: MealId) -> RepoResult<Vec<String>> {
            Ok(self
                .ingredients
                .borrow()
                .iter()
                .filter(|(_, owner, _)| *owner == meal_id)
                .map(|(_, _, name)| name.clone())
                .collect())
        }

        fn find_meal_id(&self, category: MealCategory, name: &str) -> RepoResult<Option<MealId>> {
            Ok(self
                .meals
                .borrow()
                .iter()
                .find(|row| row.category == category && row.name == name)
                .map(|row| row.id))
        }

        fn max_meal_id(&self) -> RepoResult<Option<MealId>> {
            Ok(self.meals.borrow().iter().map(|row| row.id).max())
        }

        fn max_ingredient_id(&self) -> RepoResult<Option<IngredientId>> {
            Ok(self.ingredients.borrow().iter().map(|(id, _, _)| *id).max())
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn ingredient_failure_keeps_meal_header() {
        let repo = FlakyRepo {
            reject_ingredient: Some("milk"),
            ..FlakyRepo::default()
        };
        let mut catalog = MealCatalog::try_new(repo).unwrap();

        let outcome = catalog
            .add(
                MealCategory::Breakfast,
                "Oatmeal",
                &strings(&["oats", "milk", "honey"]),
            )
            .unwrap();
        assert!(!outcome.is_complete());
        assert_eq!(outcome.stored_ingredients, strings(&["oats", "honey"]));
        assert_eq!(outcome.failed_ingredients.len(), 1);
        assert_eq!(outcome.failed_ingredients[0].ingredient, "milk");

        let loaded = catalog.load().unwrap();
        let meal = loaded.get(MealCategory::Breakfast, "Oatmeal").unwrap();
        assert_eq!(meal.ingredients, strings(&["oats", "honey"]));
    }

    #[test]
    fn failed_ingredient_still_consumes_its_id() {
        let repo = FlakyRepo {
            reject_ingredient: Some("milk"),
            ..FlakyRepo::default()
        };
        let mut catalog = MealCatalog::try_new(repo).unwrap();
        catalog
            .add(MealCategory::Lunch, "Porridge", &strings(&["milk", "oats"]))
            .unwrap();

        let ids: Vec<IngredientId> = catalog
            .repo
            .ingredients
            .borrow()
            .iter()
            .map(|(id, _, _)| *id)
            .collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn empty_ingredient_list_is_rejected_before_writes() {
        let mut catalog = MealCatalog::try_new(FlakyRepo::default()).unwrap();
        let err = catalog.add(MealCategory::Dinner, "Soup", &[]).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Validation(MealValidationError::EmptyIngredient)
        ));
        assert!(catalog.repo.meals.borrow().is_empty());
    }
}

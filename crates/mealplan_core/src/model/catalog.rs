//! In-memory meal catalog projection.
//!
//! # Responsibility
//! - Group loaded meals by category and name for lookups during planning.
//! - Provide stable, name-sorted listings for display.
//!
//! # Invariants
//! - At most one meal per `(category, name)`; the same name may appear in
//!   different categories.
//! - A catalog is a snapshot; callers reload it before each flow.

use crate::model::meal::{Meal, MealCategory};
use std::collections::BTreeMap;

/// Category -> (meal name -> meal) snapshot of the meal store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    by_category: BTreeMap<MealCategory, BTreeMap<String, Meal>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a meal, returning the previous meal with the same category
    /// and name, if any.
    pub fn insert(&mut self, meal: Meal) -> Option<Meal> {
        self.by_category
            .entry(meal.category)
            .or_default()
            .insert(meal.name.clone(), meal)
    }

    /// Looks up a meal by exact (case-sensitive) name within a category.
    pub fn get(&self, category: MealCategory, name: &str) -> Option<&Meal> {
        self.by_category
            .get(&category)
            .and_then(|meals| meals.get(name))
    }

    /// Meal names of one category in lexicographic order.
    pub fn list_by_category(&self, category: MealCategory) -> Vec<String> {
        self.by_category
            .get(&category)
            .map(|meals| meals.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Meals of one category ordered by name.
    pub fn meals_in(&self, category: MealCategory) -> impl Iterator<Item = &Meal> {
        self.by_category
            .get(&category)
            .into_iter()
            .flat_map(|meals| meals.values())
    }

    pub fn has_meals(&self, category: MealCategory) -> bool {
        self.by_category
            .get(&category)
            .is_some_and(|meals| !meals.is_empty())
    }

    /// Categories without any meal, in plan order.
    pub fn empty_categories(&self) -> Vec<MealCategory> {
        MealCategory::ALL
            .into_iter()
            .filter(|category| !self.has_meals(*category))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_category.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::Catalog;
    use crate::model::meal::{Meal, MealCategory};

    fn meal(id: i64, category: MealCategory, name: &str) -> Meal {
        Meal {
            id,
            category,
            name: name.to_string(),
            ingredients: vec!["water".to_string()],
        }
    }

    #[test]
    fn list_by_category_is_sorted_and_scoped() {
        let mut catalog = Catalog::new();
        catalog.insert(meal(1, MealCategory::Lunch, "Salad"));
        catalog.insert(meal(2, MealCategory::Lunch, "Burger"));
        catalog.insert(meal(3, MealCategory::Dinner, "Soup"));

        assert_eq!(
            catalog.list_by_category(MealCategory::Lunch),
            vec!["Burger".to_string(), "Salad".to_string()]
        );
        assert!(catalog.list_by_category(MealCategory::Breakfast).is_empty());
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn same_name_may_live_in_two_categories() {
        let mut catalog = Catalog::new();
        assert!(catalog.insert(meal(1, MealCategory::Lunch, "Toast")).is_none());
        assert!(catalog.insert(meal(2, MealCategory::Dinner, "Toast")).is_none());

        assert_eq!(catalog.get(MealCategory::Lunch, "Toast").map(|m| m.id), Some(1));
        assert_eq!(catalog.get(MealCategory::Dinner, "Toast").map(|m| m.id), Some(2));
        assert!(catalog.get(MealCategory::Lunch, "toast").is_none());
    }

    #[test]
    fn empty_categories_reports_plan_order() {
        let mut catalog = Catalog::new();
        catalog.insert(meal(1, MealCategory::Lunch, "Salad"));
        assert_eq!(
            catalog.empty_categories(),
            vec![MealCategory::Breakfast, MealCategory::Dinner]
        );
    }
}

//! Shopping list aggregate.
//!
//! # Responsibility
//! - Count ingredient occurrences across planned meals.
//! - Render count-annotated lines (`eggs`, `eggs x3`).
//!
//! # Invariants
//! - A count is the number of resolved slot ingredients with that exact name.
//! - Rendered lines are sorted by ingredient name; the aggregate itself has no
//!   meaningful order.

use std::collections::HashMap;

/// Ingredient name -> occurrence count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShoppingList {
    counts: HashMap<String, u32>,
}

impl ShoppingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one occurrence of each ingredient.
    pub fn record<I, S>(&mut self, ingredients: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for ingredient in ingredients {
            *self.counts.entry(ingredient.into()).or_insert(0) += 1;
        }
    }

    pub fn count(&self, ingredient: &str) -> u32 {
        self.counts.get(ingredient).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &HashMap<String, u32> {
        &self.counts
    }

    /// Number of distinct ingredients.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Formatted lines, one per distinct ingredient, sorted by name.
    pub fn lines(&self) -> Vec<String> {
        let mut entries: Vec<(&String, &u32)> = self.counts.iter().collect();
        entries.sort_by(|left, right| left.0.cmp(right.0));
        entries
            .into_iter()
            .map(|(name, count)| format_line(name, *count))
            .collect()
    }
}

/// Renders one shopping list line.
pub fn format_line(ingredient: &str, count: u32) -> String {
    if count > 1 {
        format!("{ingredient} x{count}")
    } else {
        ingredient.to_string()
    }
}

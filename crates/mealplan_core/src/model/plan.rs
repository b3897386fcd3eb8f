//! Weekly plan model and selection staging buffer.
//!
//! # Responsibility
//! - Define plan slots as references to stored meals.
//! - Stage selections in memory until a full week is chosen.
//!
//! # Invariants
//! - A `PlanDraft` only finishes into a `Plan` when all 21 slots are filled.
//! - Slots never copy ingredients; they keep the meal id plus its name.

use crate::model::meal::{Meal, MealCategory, MealId, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of slots in a complete week plan.
pub const SLOTS_PER_WEEK: usize = Weekday::ALL.len() * MealCategory::ALL.len();

/// Display sentinel for a slot without a resolvable meal.
pub const NO_MEAL_PLANNED: &str = "No meal planned";

/// `(day, category)` coordinate of a plan slot.
pub type SlotKey = (Weekday, MealCategory);

/// One planned meal reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSlot {
    pub day: Weekday,
    pub category: MealCategory,
    pub meal_id: MealId,
    /// Denormalized for display only.
    pub meal_name: String,
}

impl PlanSlot {
    pub fn for_meal(day: Weekday, meal: &Meal) -> Self {
        Self {
            day,
            category: meal.category,
            meal_id: meal.id,
            meal_name: meal.name.clone(),
        }
    }

    pub fn key(&self) -> SlotKey {
        (self.day, self.category)
    }
}

/// A week plan, slots ordered day-major then category-minor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    slots: Vec<PlanSlot>,
}

impl Plan {
    /// Builds a plan from arbitrary slots, normalizing to plan order.
    pub fn from_slots(mut slots: Vec<PlanSlot>) -> Self {
        slots.sort_by_key(PlanSlot::key);
        Self { slots }
    }

    pub fn slots(&self) -> &[PlanSlot] {
        &self.slots
    }

    pub fn slot(&self, day: Weekday, category: MealCategory) -> Option<&PlanSlot> {
        self.slots
            .iter()
            .find(|slot| slot.day == day && slot.category == category)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.len() == SLOTS_PER_WEEK
    }
}

/// In-memory staging buffer for a planning session.
#[derive(Debug, Clone, Default)]
pub struct PlanDraft {
    staged: BTreeMap<SlotKey, PlanSlot>,
}

impl PlanDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages one selection, replacing any earlier pick for the same slot.
    pub fn stage(&mut self, day: Weekday, meal: &Meal) {
        let slot = PlanSlot::for_meal(day, meal);
        self.staged.insert(slot.key(), slot);
    }

    pub(crate) fn len(&self) -> usize {
        self.staged.len()
    }

    /// Slots still missing a selection, in plan order.
    pub fn missing(&self) -> Vec<SlotKey> {
        Weekday::ALL
            .into_iter()
            .flat_map(|day| MealCategory::ALL.into_iter().map(move |category| (day, category)))
            .filter(|key| !self.staged.contains_key(key))
            .collect()
    }

    /// Converts the draft into a full plan, or returns it unchanged when any
    /// slot is still empty.
    pub fn finish(self) -> Result<Plan, Self> {
        if self.staged.len() != SLOTS_PER_WEEK {
            return Err(self);
        }
        Ok(Plan {
            slots: self.staged.into_values().collect(),
        })
    }
}

/// Display row for one day of a finalized plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayMenu {
    pub day: Weekday,
    /// One entry per category in plan order; `NO_MEAL_PLANNED` when unresolved.
    pub meals: Vec<(MealCategory, String)>,
}

//! Weekly planning session.
//!
//! # Responsibility
//! - Walk the 7 x 3 slot grid, asking a `MealSelector` for each choice.
//! - Stage selections in memory and commit the whole week at once.
//! - Render the stored plan for display.
//!
//! # Invariants
//! - Every category must have at least one meal before selection starts.
//! - The stored plan changes only on a successful commit of all 21 slots;
//!   cancellation or a failed commit leaves the previous plan in place.
//! - Selection loops stop as soon as the cancellation token fires.

use crate::model::catalog::Catalog;
use crate::model::meal::{MealCategory, Weekday};
use crate::model::plan::{DayMenu, Plan, PlanDraft, NO_MEAL_PLANNED};
use crate::repo::meal_repo::{RepoError, RepoResult};
use crate::repo::plan_repo::PlanRepository;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use tokio_util::sync::CancellationToken;

/// Source of meal choices for a planning session.
///
/// The interactive CLI reads lines from the user; tests feed scripted answers.
pub trait MealSelector {
    /// Shows the sorted candidate names for one slot.
    fn present(&mut self, day: Weekday, category: MealCategory, names: &[String]);
    /// Returns the next answer for the slot, or `None` once input is exhausted.
    fn next_choice(&mut self, day: Weekday, category: MealCategory) -> Option<String>;
    /// Called when an answer does not name a meal of the slot category.
    fn rejected(&mut self, _day: Weekday, _category: MealCategory, _answer: &str) {}
    /// Called after all categories of `day` are chosen.
    fn day_planned(&mut self, _day: Weekday) {}
}

/// Planning session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerState {
    Idle,
    SelectingSlot {
        day: Weekday,
        category: MealCategory,
    },
    /// Replacing the stored plan with the staged week.
    Clearing,
    Finalized,
    Cancelled,
}

/// Errors that abort a planning session.
#[derive(Debug)]
pub enum PlanError {
    /// At least one category has no meals; nothing was selected or written.
    NoMealsAvailable(Vec<MealCategory>),
    /// The session was cancelled or input ran out while choosing this slot.
    Cancelled {
        day: Weekday,
        category: MealCategory,
    },
    /// Store failure while committing the plan.
    Repo(RepoError),
}

impl Display for PlanError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoMealsAvailable(categories) => {
                let names: Vec<&str> = categories.iter().map(|c| c.as_str()).collect();
                write!(f, "no meals available for: {}", names.join(", "))
            }
            Self::Cancelled { day, category } => {
                write!(f, "planning cancelled while choosing {category} for {day}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PlanError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for PlanError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Committed plan plus its display rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOutcome {
    pub plan: Plan,
    pub menu: Vec<DayMenu>,
}

/// Planning use-case service over a plan repository.
pub struct Planner<P: PlanRepository> {
    plans: P,
    state: PlannerState,
}

impl<P: PlanRepository> Planner<P> {
    pub fn new(plans: P) -> Self {
        Self {
            plans,
            state: PlannerState::Idle,
        }
    }

    pub fn state(&self) -> PlannerState {
        self.state
    }

    /// Runs one full planning session against a freshly loaded catalog.
    ///
    /// # Errors
    /// - `NoMealsAvailable` before any prompt when a category is empty.
    /// - `Cancelled` when the token fires or the selector runs dry.
    /// - `Repo` when the atomic plan replacement fails.
    pub fn plan_week<S: MealSelector>(
        &mut self,
        catalog: &Catalog,
        selector: &mut S,
        cancel: &CancellationToken,
    ) -> Result<PlanOutcome, PlanError> {
        self.state = PlannerState::Idle;
        let empty = catalog.empty_categories();
        if !empty.is_empty() {
            info!(
                "event=plan_session module=planner status=error error_code=no_meals empty_categories={}",
                empty.len()
            );
            return Err(PlanError::NoMealsAvailable(empty));
        }

        info!("event=plan_session module=planner status=start");
        let mut draft = PlanDraft::new();
        for day in Weekday::ALL {
            for category in MealCategory::ALL {
                self.state = PlannerState::SelectingSlot { day, category };
                let names = catalog.list_by_category(category);
                selector.present(day, category, &names);

                let meal = loop {
                    if cancel.is_cancelled() {
                        return Err(self.cancelled(day, category, draft.len()));
                    }
                    let Some(answer) = selector.next_choice(day, category) else {
                        return Err(self.cancelled(day, category, draft.len()));
                    };
                    match catalog.get(category, &answer) {
                        Some(meal) => break meal,
                        None => {
                            debug!(
                                "event=plan_select module=planner status=rejected day={} category={}",
                                day, category
                            );
                            selector.rejected(day, category, &answer);
                        }
                    }
                };
                draft.stage(day, meal);
            }
            selector.day_planned(day);
        }

        let plan = draft.finish().map_err(|draft| {
            RepoError::InvalidData(format!(
                "staged plan is missing {} slots",
                draft.missing().len()
            ))
        })?;

        self.state = PlannerState::Clearing;
        if let Err(err) = self.plans.replace_plan(&plan) {
            error!(
                "event=plan_session module=planner status=error error_code=plan_commit_failed error={}",
                err
            );
            self.state = PlannerState::Idle;
            return Err(err.into());
        }
        self.state = PlannerState::Finalized;
        info!(
            "event=plan_session module=planner status=ok slots={}",
            plan.slots().len()
        );

        // The week is stored; a failed read-back only degrades the display.
        let menu = self.describe_plan().unwrap_or_else(|err| {
            warn!(
                "event=plan_describe module=planner status=error error={}",
                err
            );
            unresolved_menu()
        });
        Ok(PlanOutcome { plan, menu })
    }

    /// Renders the stored plan day by day.
    ///
    /// Slots that do not resolve to a meal of their category render as
    /// `NO_MEAL_PLANNED`.
    pub fn describe_plan(&self) -> RepoResult<Vec<DayMenu>> {
        let mut menu = Vec::with_capacity(Weekday::ALL.len());
        for day in Weekday::ALL {
            let mut meals = Vec::with_capacity(MealCategory::ALL.len());
            for category in MealCategory::ALL {
                let name = self
                    .plans
                    .meal_for_slot(day, category)?
                    .unwrap_or_else(|| NO_MEAL_PLANNED.to_string());
                meals.push((category, name));
            }
            menu.push(DayMenu { day, meals });
        }
        Ok(menu)
    }

    fn cancelled(&mut self, day: Weekday, category: MealCategory, staged: usize) -> PlanError {
        self.state = PlannerState::Cancelled;
        info!(
            "event=plan_session module=planner status=cancelled day={} category={} staged={}",
            day, category, staged
        );
        PlanError::Cancelled { day, category }
    }
}

fn unresolved_menu() -> Vec<DayMenu> {
    Weekday::ALL
        .into_iter()
        .map(|day| DayMenu {
            day,
            meals: MealCategory::ALL
                .into_iter()
                .map(|category| (category, NO_MEAL_PLANNED.to_string()))
                .collect(),
        })
        .collect()
}

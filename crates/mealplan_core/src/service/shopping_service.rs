//! Shopping list use-case service.
//!
//! # Responsibility
//! - Aggregate ingredient counts over the stored weekly plan.
//! - Save the formatted list through the file sink.
//!
//! # Invariants
//! - Traversal is day-major, category-minor; counts do not depend on it.
//! - Saving requires at least one stored plan slot.
//! - A failed aggregation degrades to an empty list instead of aborting the
//!   save.

use crate::model::meal::{MealCategory, Weekday};
use crate::model::shopping::ShoppingList;
use crate::repo::meal_repo::{RepoError, RepoResult};
use crate::repo::plan_repo::PlanRepository;
use crate::service::export::write_lines;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Errors that stop a save before anything is written.
#[derive(Debug)]
pub enum SaveError {
    /// No plan slot is stored yet.
    NotPlanned,
    /// The plan count could not be read.
    Repo(RepoError),
    /// The output file could not be written.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for SaveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotPlanned => write!(f, "no meals are planned"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Io { source, .. } => write!(f, "{source}"),
        }
    }
}

impl Error for SaveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotPlanned => None,
            Self::Repo(err) => Some(err),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<RepoError> for SaveError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Result of a completed save.
#[derive(Debug)]
pub struct SaveReport {
    pub path: PathBuf,
    pub lines_written: usize,
    /// Set when aggregation failed and an empty list was written instead.
    pub generation_error: Option<RepoError>,
}

/// Shopping list service over a plan repository.
pub struct ShoppingListBuilder<P: PlanRepository> {
    plans: P,
}

impl<P: PlanRepository> ShoppingListBuilder<P> {
    pub fn new(plans: P) -> Self {
        Self { plans }
    }

    /// True when at least one plan slot is stored.
    pub fn is_planned(&self) -> RepoResult<bool> {
        Ok(self.plans.plan_count()? > 0)
    }

    /// Counts ingredient occurrences over every planned slot.
    pub fn build(&self) -> RepoResult<ShoppingList> {
        let mut list = ShoppingList::new();
        for day in Weekday::ALL {
            for category in MealCategory::ALL {
                list.record(self.plans.ingredients_for_slot(day, category)?);
            }
        }
        Ok(list)
    }

    /// Builds the list and writes it to `path`.
    ///
    /// # Errors
    /// - `NotPlanned` when the plan is empty; nothing is written.
    /// - `Io` when the file cannot be created or written.
    pub fn save_to(&self, path: &Path) -> Result<SaveReport, SaveError> {
        if !self.is_planned()? {
            info!("event=shopping_save module=shopping status=error error_code=not_planned");
            return Err(SaveError::NotPlanned);
        }

        let (list, generation_error) = match self.build() {
            Ok(list) => (list, None),
            Err(err) => {
                warn!(
                    "event=shopping_build module=shopping status=error error={}",
                    err
                );
                (ShoppingList::new(), Some(err))
            }
        };

        let lines = list.lines();
        if let Err(source) = write_lines(path, &lines) {
            error!(
                "event=shopping_save module=shopping status=error error_code=write_failed error={}",
                source
            );
            return Err(SaveError::Io {
                path: path.to_path_buf(),
                source,
            });
        }

        info!(
            "event=shopping_save module=shopping status=ok lines={}",
            lines.len()
        );
        Ok(SaveReport {
            path: path.to_path_buf(),
            lines_written: lines.len(),
            generation_error,
        })
    }
}

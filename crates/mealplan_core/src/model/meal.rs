//! Meal domain model and input validation.
//!
//! # Responsibility
//! - Define meal categories, weekdays and the canonical `Meal` record.
//! - Parse and validate user-provided names and ingredient lists.
//!
//! # Invariants
//! - Names and ingredient tokens are non-empty after trimming.
//! - Names and ingredient tokens contain only ASCII letters and whitespace.
//! - Categories are persisted lowercase.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static LETTERS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z\t\n\x0B\x0C\r ]+$").expect("valid letters regex"));

/// Stable meal identifier, allocated from a process-local counter.
pub type MealId = i64;

/// Stable ingredient row identifier.
pub type IngredientId = i64;

/// Meal category; also the fixed per-day slot order of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealCategory {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealCategory {
    /// All categories in plan order.
    pub const ALL: [MealCategory; 3] = [Self::Breakfast, Self::Lunch, Self::Dinner];

    /// Storage and display token (`breakfast|lunch|dinner`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
        }
    }

    /// Capitalized label used in plan summaries.
    pub fn label(self) -> &'static str {
        match self {
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Dinner => "Dinner",
        }
    }

    /// Parses user or stored text, ignoring surrounding whitespace and case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "breakfast" => Some(Self::Breakfast),
            "lunch" => Some(Self::Lunch),
            "dinner" => Some(Self::Dinner),
            _ => None,
        }
    }
}

impl Display for MealCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Day of the planned week, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All days in plan order.
    pub const ALL: [Weekday; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// English day name; also the persisted `plan.day` value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|day| day.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl Display for Weekday {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical meal record.
///
/// Meals are immutable once stored. `ingredients` keeps insertion order and
/// may be shorter than what the user typed when ingredient writes failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    pub id: MealId,
    pub category: MealCategory,
    pub name: String,
    pub ingredients: Vec<String>,
}

/// Validation failure for user-provided meal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MealValidationError {
    /// Meal name is blank after trimming.
    EmptyName,
    /// Meal name contains characters other than letters and whitespace.
    InvalidName(String),
    /// Ingredient list is blank or has a blank token between commas.
    EmptyIngredient,
    /// Ingredient token contains characters other than letters and whitespace.
    InvalidIngredient(String),
}

impl Display for MealValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "meal name must not be blank"),
            Self::InvalidName(value) => {
                write!(f, "meal name `{value}` must contain letters only")
            }
            Self::EmptyIngredient => write!(f, "ingredient must not be blank"),
            Self::InvalidIngredient(value) => {
                write!(f, "ingredient `{value}` must contain letters only")
            }
        }
    }
}

impl Error for MealValidationError {}

/// Validates and trims a meal name.
pub fn validate_meal_name(raw: &str) -> Result<String, MealValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(MealValidationError::EmptyName);
    }
    if !is_letters_only(trimmed) {
        return Err(MealValidationError::InvalidName(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Validates and trims one ingredient token.
pub fn validate_ingredient(raw: &str) -> Result<String, MealValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(MealValidationError::EmptyIngredient);
    }
    if !is_letters_only(trimmed) {
        return Err(MealValidationError::InvalidIngredient(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Splits a comma-separated ingredient line into validated tokens.
///
/// The whole line is rejected when any token is invalid, including empty
/// tokens produced by doubled or trailing commas.
pub fn parse_ingredient_line(line: &str) -> Result<Vec<String>, MealValidationError> {
    line.split(',').map(validate_ingredient).collect()
}

fn is_letters_only(value: &str) -> bool {
    LETTERS_RE.is_match(value)
}

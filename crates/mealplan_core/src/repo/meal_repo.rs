//! Meal and ingredient repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Insert meal headers and ingredient rows with caller-allocated ids.
//! - Read meals and their ingredients back in a stable order.
//!
//! # Invariants
//! - Meal rows are never updated or deleted.
//! - Ingredient rows are returned in insertion (`id`) order.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::meal::{IngredientId, MealCategory, MealId};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error shared by meal and plan repositories.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap failure.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted row cannot be converted into the domain model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "meal repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "meal repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted meal data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Meal header as stored in `meals`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealRow {
    pub id: MealId,
    pub category: MealCategory,
    pub name: String,
}

/// Store operations for meals and ingredients.
pub trait MealRepository {
    /// Inserts one meal header.
    fn insert_meal(&self, id: MealId, category: MealCategory, name: &str) -> RepoResult<()>;
    /// Inserts one ingredient row for an existing meal.
    fn insert_ingredient(&self, id: IngredientId, meal_id: MealId, name: &str) -> RepoResult<()>;
    /// Returns every meal header ordered by id.
    fn list_meals(&self) -> RepoResult<Vec<MealRow>>;
    /// Returns ingredient names of one meal in insertion order.
    fn list_ingredients(&self, meal_id: MealId) -> RepoResult<Vec<String>>;
    /// Resolves a meal id by exact category and name.
    fn find_meal_id(&self, category: MealCategory, name: &str) -> RepoResult<Option<MealId>>;
    /// Highest stored meal id, `None` when no meal exists.
    fn max_meal_id(&self) -> RepoResult<Option<MealId>>;
    /// Highest stored ingredient id, `None` when no ingredient exists.
    fn max_ingredient_id(&self) -> RepoResult<Option<IngredientId>>;
}

/// SQLite-backed meal repository.
pub struct SqliteMealRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMealRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["meals", "ingredients"])?;
        Ok(Self { conn })
    }
}

impl MealRepository for SqliteMealRepository<'_> {
    fn insert_meal(&self, id: MealId, category: MealCategory, name: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO meals (id, category, name) VALUES (?1, ?2, ?3);",
            params![id, category.as_str(), name],
        )?;
        Ok(())
    }

    fn insert_ingredient(&self, id: IngredientId, meal_id: MealId, name: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO ingredients (id, meal_id, name) VALUES (?1, ?2, ?3);",
            params![id, meal_id, name],
        )?;
        Ok(())
    }

    fn list_meals(&self) -> RepoResult<Vec<MealRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, category, name FROM meals ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut meals = Vec::new();
        while let Some(row) = rows.next()? {
            let category_text: String = row.get("category")?;
            meals.push(MealRow {
                id: row.get("id")?,
                category: parse_category_column(&category_text, "meals.category")?,
                name: row.get("name")?,
            });
        }
        Ok(meals)
    }

    fn list_ingredients(&self, meal_id: MealId) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM ingredients WHERE meal_id = ?1 ORDER BY id ASC;")?;
        let mut rows = stmt.query([meal_id])?;
        let mut ingredients = Vec::new();
        while let Some(row) = rows.next()? {
            ingredients.push(row.get(0)?);
        }
        Ok(ingredients)
    }

    fn find_meal_id(&self, category: MealCategory, name: &str) -> RepoResult<Option<MealId>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM meals WHERE category = ?1 AND name = ?2;",
                params![category.as_str(), name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn max_meal_id(&self) -> RepoResult<Option<MealId>> {
        max_id(self.conn, "meals")
    }

    fn max_ingredient_id(&self) -> RepoResult<Option<IngredientId>> {
        max_id(self.conn, "ingredients")
    }
}

fn max_id(conn: &Connection, table: &'static str) -> RepoResult<Option<i64>> {
    let value = conn.query_row(&format!("SELECT MAX(id) FROM {table};"), [], |row| {
        row.get::<_, Option<i64>>(0)
    })?;
    Ok(value)
}

/// Parses a stored category value, rejecting anything non-canonical.
pub(crate) fn parse_category_column(value: &str, column: &str) -> RepoResult<MealCategory> {
    MealCategory::ALL
        .into_iter()
        .find(|category| category.as_str() == value)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid category `{value}` in {column}")))
}

/// Verifies schema version and required tables before repository use.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    tables: &[&'static str],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &table in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

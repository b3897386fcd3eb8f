//! Weekly plan repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist plan slots as references into `meals`.
//! - Resolve slots to meal names and ingredient lists via joins.
//! - Replace the whole stored plan atomically.
//!
//! # Invariants
//! - `replace_plan` deletes the previous plan and inserts the new one in a
//!   single transaction; readers never observe a mix of both.
//! - Only complete weeks are accepted by `replace_plan`.
//! - At most one slot per `(day, category)` (table primary key).

use crate::model::meal::{MealCategory, Weekday};
use crate::model::plan::{Plan, PlanSlot, SLOTS_PER_WEEK};
use crate::repo::meal_repo::{
    ensure_connection_ready, parse_category_column, RepoError, RepoResult,
};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};

/// Store operations for the weekly plan.
pub trait PlanRepository {
    /// Deletes every stored slot, returning how many were removed.
    fn clear_plan(&self) -> RepoResult<usize>;
    /// Inserts one slot outside of any plan-level transaction.
    fn insert_plan_slot(&self, slot: &PlanSlot) -> RepoResult<()>;
    /// Replaces the stored plan with `plan` in one transaction.
    fn replace_plan(&self, plan: &Plan) -> RepoResult<()>;
    /// Number of stored slots.
    fn plan_count(&self) -> RepoResult<u32>;
    /// Ingredient names of the meal planned for one slot, in insertion order.
    fn ingredients_for_slot(&self, day: Weekday, category: MealCategory)
        -> RepoResult<Vec<String>>;
    /// Name of the meal planned for one slot, if it resolves to a stored meal
    /// of the same category.
    fn meal_for_slot(&self, day: Weekday, category: MealCategory) -> RepoResult<Option<String>>;
    /// Loads all stored slots in plan order.
    fn load_plan(&self) -> RepoResult<Plan>;
}

/// SQLite-backed plan repository.
pub struct SqlitePlanRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePlanRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["meals", "ingredients", "plan"])?;
        Ok(Self { conn })
    }
}

impl PlanRepository for SqlitePlanRepository<'_> {
    fn clear_plan(&self) -> RepoResult<usize> {
        Ok(self.conn.execute("DELETE FROM plan;", [])?)
    }

    fn insert_plan_slot(&self, slot: &PlanSlot) -> RepoResult<()> {
        insert_slot(self.conn, slot)
    }

    fn replace_plan(&self, plan: &Plan) -> RepoResult<()> {
        if !plan.is_complete() {
            error!(
                "event=plan_replace module=repo status=error error_code=partial_plan slots={}",
                plan.slots().len()
            );
            return Err(RepoError::InvalidData(format!(
                "plan has {} of {} slots",
                plan.slots().len(),
                SLOTS_PER_WEEK
            )));
        }

        // Rolls back on drop when any statement fails.
        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute("DELETE FROM plan;", [])?;
        for slot in plan.slots() {
            if let Err(err) = insert_slot(&tx, slot) {
                error!(
                    "event=plan_replace module=repo status=error day={} category={} meal_id={} error={}",
                    slot.day, slot.category, slot.meal_id, err
                );
                return Err(err);
            }
        }
        tx.commit()?;

        info!(
            "event=plan_replace module=repo status=ok removed={} inserted={}",
            removed,
            plan.slots().len()
        );
        Ok(())
    }

    fn plan_count(&self) -> RepoResult<u32> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM plan;", [], |row| row.get(0))?;
        Ok(count)
    }

    fn ingredients_for_slot(
        &self,
        day: Weekday,
        category: MealCategory,
    ) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT i.name
             FROM plan p
             INNER JOIN meals m ON m.id = p.meal_id
             INNER JOIN ingredients i ON i.meal_id = m.id
             WHERE p.day = ?1
               AND p.category = ?2
             ORDER BY i.id ASC;",
        )?;
        let mut rows = stmt.query(params![day.as_str(), category.as_str()])?;
        let mut ingredients = Vec::new();
        while let Some(row) = rows.next()? {
            ingredients.push(row.get(0)?);
        }
        Ok(ingredients)
    }

    fn meal_for_slot(&self, day: Weekday, category: MealCategory) -> RepoResult<Option<String>> {
        let name = self
            .conn
            .query_row(
                "SELECT m.name
                 FROM plan p
                 INNER JOIN meals m ON m.id = p.meal_id
                 WHERE p.day = ?1
                   AND p.category = ?2
                   AND m.category = ?2;",
                params![day.as_str(), category.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(name)
    }

    fn load_plan(&self) -> RepoResult<Plan> {
        let mut stmt = self
            .conn
            .prepare("SELECT day, meal_id, category, meal_name FROM plan;")?;
        let mut rows = stmt.query([])?;
        let mut slots = Vec::new();
        while let Some(row) = rows.next()? {
            let day_text: String = row.get("day")?;
            let day = Weekday::parse(&day_text).ok_or_else(|| {
                RepoError::InvalidData(format!("invalid day `{day_text}` in plan.day"))
            })?;
            let category_text: String = row.get("category")?;
            slots.push(PlanSlot {
                day,
                category: parse_category_column(&category_text, "plan.category")?,
                meal_id: row.get("meal_id")?,
                meal_name: row.get("meal_name")?,
            });
        }
        Ok(Plan::from_slots(slots))
    }
}

fn insert_slot(conn: &Connection, slot: &PlanSlot) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO plan (day, meal_id, category, meal_name) VALUES (?1, ?2, ?3, ?4);",
        params![
            slot.day.as_str(),
            slot.meal_id,
            slot.category.as_str(),
            slot.meal_name.as_str(),
        ],
    )?;
    Ok(())
}

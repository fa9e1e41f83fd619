//! Saved Meal Plan model
//!
//! A generated meal plan stored for a date, with its meals and their items.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, Row};
use serde::Serialize;

use crate::db::DbResult;
use crate::nutrition::{MealPlan, MealType};
use super::MacroSummary;

impl ToSql for MealType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.label()))
    }
}

impl FromSql for MealType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        MealType::from_str(s).ok_or_else(|| FromSqlError::Other(format!("unknown meal type '{}'", s).into()))
    }
}

/// One saved meal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedMeal {
    pub id: i64,
    pub meal_type: MealType,
    pub title: String,
    pub description: String,
    pub calories: f64,
    pub items: Vec<String>,
}

/// A meal plan saved for a date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedMealPlan {
    pub id: i64,
    pub plan_date: String,
    pub target_calories: i64,
    pub summary: MacroSummary,
    pub meals: Vec<SavedMeal>,
    pub created_at: String,
}

impl SavedMeal {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            meal_type: row.get("meal_type")?,
            title: row.get("title")?,
            description: row.get("description")?,
            calories: row.get("calories")?,
            items: Vec::new(),
        })
    }
}

impl SavedMealPlan {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            plan_date: row.get("plan_date")?,
            target_calories: row.get("target_calories")?,
            summary: MacroSummary {
                calories: row.get("calories")?,
                protein: row.get("protein")?,
                carbs: row.get("carbs")?,
                fat: row.get("fat")?,
            },
            meals: Vec::new(),
            created_at: row.get("created_at")?,
        })
    }

    /// Save a plan for a date, replacing any plan already saved for it
    pub fn save(conn: &mut Connection, plan_date: &str, plan: &MealPlan) -> DbResult<Self> {
        let tx = conn.transaction()?;

        let plan_id: i64 = tx.query_row(
            r#"
            INSERT INTO meal_plans (plan_date, target_calories, calories, protein, carbs, fat)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(plan_date) DO UPDATE SET
                target_calories = excluded.target_calories,
                calories = excluded.calories,
                protein = excluded.protein,
                carbs = excluded.carbs,
                fat = excluded.fat,
                created_at = datetime('now')
            RETURNING id
            "#,
            params![
                plan_date,
                plan.target_calories,
                plan.summary.calories,
                plan.summary.protein,
                plan.summary.carbs,
                plan.summary.fat,
            ],
            |row| row.get(0),
        )?;

        // Replace existing meals and their items
        tx.execute(
            "DELETE FROM meal_plan_items WHERE meal_id IN (SELECT id FROM meal_plan_meals WHERE plan_id = ?1)",
            [plan_id],
        )?;
        tx.execute("DELETE FROM meal_plan_meals WHERE plan_id = ?1", [plan_id])?;

        for meal in &plan.meals {
            tx.execute(
                "INSERT INTO meal_plan_meals (plan_id, meal_type, title, description, calories)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![plan_id, meal.meal_type, meal.title, meal.description, meal.calories],
            )?;
            let meal_id = tx.last_insert_rowid();

            for item in &meal.items {
                tx.execute(
                    "INSERT INTO meal_plan_items (meal_id, item_name) VALUES (?1, ?2)",
                    params![meal_id, item],
                )?;
            }
        }

        tx.commit()?;

        Self::get_by_date(conn, plan_date)?
            .ok_or_else(|| crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get the plan saved for a date, with meals and items
    pub fn get_by_date(conn: &Connection, plan_date: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM meal_plans WHERE plan_date = ?1")?;

        let result = stmt.query_row([plan_date], Self::from_row);
        match result {
            Ok(mut plan) => {
                plan.meals = Self::load_meals(conn, plan.id)?;
                Ok(Some(plan))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List all saved plans, newest date first
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM meal_plans ORDER BY plan_date DESC")?;
        let mut plans = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        for plan in &mut plans {
            plan.meals = Self::load_meals(conn, plan.id)?;
        }

        Ok(plans)
    }

    /// Meals planned for a date (empty if no plan is saved)
    pub fn meals_for_date(conn: &Connection, plan_date: &str) -> DbResult<Vec<SavedMeal>> {
        Ok(Self::get_by_date(conn, plan_date)?
            .map(|plan| plan.meals)
            .unwrap_or_default())
    }

    fn load_meals(conn: &Connection, plan_id: i64) -> DbResult<Vec<SavedMeal>> {
        let mut stmt = conn.prepare("SELECT * FROM meal_plan_meals WHERE plan_id = ?1 ORDER BY id")?;
        let mut meals = stmt
            .query_map([plan_id], SavedMeal::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut items_stmt =
            conn.prepare("SELECT item_name FROM meal_plan_items WHERE meal_id = ?1 ORDER BY id")?;
        for meal in &mut meals {
            meal.items = items_stmt
                .query_map([meal.id], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
        }

        Ok(meals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::nutrition::PlannedMeal;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn meal(meal_type: MealType, items: &[&str], calories: f64) -> PlannedMeal {
        PlannedMeal {
            meal_type,
            title: "Test Meal".to_string(),
            description: "Balanced nutrition.".to_string(),
            calories,
            items: items.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn plan(calories: f64) -> MealPlan {
        MealPlan {
            target_calories: 2555,
            summary: MacroSummary { calories, protein: 45.0, carbs: 28.0, fat: 16.0 },
            meals: vec![
                meal(MealType::Breakfast, &["scrambled eggs", "whole wheat bread"], 219.0),
                meal(MealType::Snack, &["apple"], 52.0),
            ],
            unmatched: vec![],
        }
    }

    #[test]
    fn test_save_and_load() {
        let mut conn = conn();
        let saved = SavedMealPlan::save(&mut conn, "2026-01-15", &plan(271.0)).unwrap();

        assert_eq!(saved.plan_date, "2026-01-15");
        assert_eq!(saved.target_calories, 2555);
        assert_eq!(saved.summary.calories, 271.0);
        assert_eq!(saved.meals.len(), 2);
        assert_eq!(saved.meals[0].meal_type, MealType::Breakfast);
        assert_eq!(saved.meals[0].items, vec!["scrambled eggs", "whole wheat bread"]);
        assert_eq!(saved.meals[1].meal_type, MealType::Snack);
    }

    #[test]
    fn test_save_replaces_plan_for_date() {
        let mut conn = conn();
        let first = SavedMealPlan::save(&mut conn, "2026-01-15", &plan(271.0)).unwrap();

        let mut replacement = plan(100.0);
        replacement.meals = vec![meal(MealType::Dinner, &["grilled fish"], 100.0)];
        let second = SavedMealPlan::save(&mut conn, "2026-01-15", &replacement).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.summary.calories, 100.0);
        assert_eq!(second.meals.len(), 1);
        assert_eq!(second.meals[0].items, vec!["grilled fish"]);

        let item_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM meal_plan_items", [], |row| row.get(0))
            .unwrap();
        assert_eq!(item_count, 1);
    }

    #[test]
    fn test_list_and_meals_for_date() {
        let mut conn = conn();
        SavedMealPlan::save(&mut conn, "2026-01-14", &plan(271.0)).unwrap();
        SavedMealPlan::save(&mut conn, "2026-01-16", &plan(300.0)).unwrap();

        let plans = SavedMealPlan::list(&conn).unwrap();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].plan_date, "2026-01-16");
        assert_eq!(plans[1].meals.len(), 2);

        assert_eq!(SavedMealPlan::meals_for_date(&conn, "2026-01-14").unwrap().len(), 2);
        assert!(SavedMealPlan::meals_for_date(&conn, "2026-01-15").unwrap().is_empty());
    }
}

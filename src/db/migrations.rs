//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;
use crate::nutrition::{db_column, Nutrients};

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    // Create migrations table if it doesn't exist
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    Ok(())
}

/// Get the applied schema version (0 for a fresh database)
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Nutrient columns of food_logs, one REAL per dataset nutrient
fn food_log_nutrient_columns() -> String {
    Nutrients::COLUMNS
        .iter()
        .map(|c| format!("            {} REAL NOT NULL DEFAULT 0,", db_column(c)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    let food_logs = format!(
        r#"
        -- ============================================
        -- FOOD LOGS
        -- Matched foods eaten on a date, with the
        -- matched record's nutrients copied in
        -- ============================================
        CREATE TABLE food_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            food_name TEXT NOT NULL,
            log_date TEXT NOT NULL,              -- ISO date: "2025-01-09"
{}
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_food_logs_date ON food_logs(log_date);
        "#,
        food_log_nutrient_columns()
    );
    conn.execute_batch(&food_logs)?;

    conn.execute_batch(
        r#"
        -- ============================================
        -- HYDRATION
        -- Glasses of water per day
        -- ============================================
        CREATE TABLE hydration_logs (
            log_date TEXT PRIMARY KEY,
            glasses INTEGER NOT NULL DEFAULT 0
        );

        -- ============================================
        -- MEAL PLANS
        -- At most one saved plan per date
        -- ============================================
        CREATE TABLE meal_plans (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            plan_date TEXT NOT NULL UNIQUE,
            target_calories INTEGER NOT NULL DEFAULT 0,
            calories REAL NOT NULL DEFAULT 0,
            protein REAL NOT NULL DEFAULT 0,
            carbs REAL NOT NULL DEFAULT 0,
            fat REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE meal_plan_meals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            plan_id INTEGER NOT NULL REFERENCES meal_plans(id) ON DELETE CASCADE,
            meal_type TEXT NOT NULL CHECK(meal_type IN ('Breakfast', 'Lunch', 'Dinner', 'Snack')),
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            calories REAL NOT NULL DEFAULT 0
        );

        CREATE INDEX idx_meal_plan_meals_plan ON meal_plan_meals(plan_id);

        CREATE TABLE meal_plan_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            meal_id INTEGER NOT NULL REFERENCES meal_plan_meals(id) ON DELETE CASCADE,
            item_name TEXT NOT NULL
        );

        CREATE INDEX idx_meal_plan_items_meal ON meal_plan_items(meal_id);
        "#,
    )?;

    Ok(())
}

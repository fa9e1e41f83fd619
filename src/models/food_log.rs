//! Food Log model
//!
//! A matched food eaten on a date, with a copy of the matched record's nutrients.

use rusqlite::{params, Connection, Row};
use serde::Serialize;

use crate::db::DbResult;
use crate::nutrition::{db_column, NormalizedFood, Nutrients};
use super::dates::{parse_date, year_week};
use super::MacroSummary;

/// A logged food
#[derive(Debug, Clone, Serialize)]
pub struct FoodLog {
    pub id: i64,
    pub food_name: String,
    pub log_date: String,
    pub nutrients: Nutrients,
    pub created_at: String,
}

/// Calories logged on one date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCalories {
    pub date: String,
    pub calories: f64,
    pub logs: i64,
}

/// Calories logged during one week of the year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyCalories {
    /// Week of the year, see `dates::year_week`
    pub week: u32,
    pub calories: f64,
    pub logs: i64,
}

impl FoodLog {
    /// Create a FoodLog from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let mut nutrients = Nutrients::default();
        for column in Nutrients::COLUMNS {
            let value: f64 = row.get(db_column(column).as_str())?;
            nutrients.set(column, value);
        }

        Ok(Self {
            id: row.get("id")?,
            food_name: row.get("food_name")?,
            log_date: row.get("log_date")?,
            nutrients,
            created_at: row.get("created_at")?,
        })
    }

    /// Insert a matched food for a date
    pub fn create(conn: &Connection, food: &NormalizedFood, log_date: &str) -> DbResult<Self> {
        let mut columns = vec!["food_name".to_string(), "log_date".to_string()];
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> =
            vec![Box::new(food.food.clone()), Box::new(log_date.to_string())];

        for (column, value) in food.nutrients.iter() {
            columns.push(db_column(column));
            params_vec.push(Box::new(value));
        }

        let placeholders: Vec<String> = (1..=params_vec.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO food_logs ({}) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
        );

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a food log by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM food_logs WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(log) => Ok(Some(log)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List food logs, newest first, optionally for a single date
    pub fn list(conn: &Connection, log_date: Option<&str>) -> DbResult<Vec<Self>> {
        let logs = match log_date {
            Some(date) => {
                let mut stmt = conn.prepare(
                    "SELECT * FROM food_logs WHERE log_date = ?1 ORDER BY created_at DESC, id DESC",
                )?;
                let rows = stmt
                    .query_map([date], Self::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt =
                    conn.prepare("SELECT * FROM food_logs ORDER BY created_at DESC, id DESC")?;
                let rows = stmt
                    .query_map([], Self::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };

        Ok(logs)
    }

    /// Delete a food log
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM food_logs WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Calorie and macro totals for a date
    pub fn day_totals(conn: &Connection, log_date: &str) -> DbResult<MacroSummary> {
        let totals = conn.query_row(
            r#"
            SELECT
                COALESCE(SUM(caloric_value), 0),
                COALESCE(SUM(protein), 0),
                COALESCE(SUM(carbohydrates), 0),
                COALESCE(SUM(fat), 0)
            FROM food_logs
            WHERE log_date = ?1
            "#,
            [log_date],
            |row| {
                Ok(MacroSummary {
                    calories: row.get(0)?,
                    protein: row.get(1)?,
                    carbs: row.get(2)?,
                    fat: row.get(3)?,
                })
            },
        )?;
        Ok(totals)
    }

    /// Average calories and macros per logged food between two dates (inclusive)
    pub fn average_macros(conn: &Connection, from: &str, to: &str) -> DbResult<MacroSummary> {
        let averages = conn.query_row(
            r#"
            SELECT
                COALESCE(AVG(caloric_value), 0),
                COALESCE(AVG(protein), 0),
                COALESCE(AVG(carbohydrates), 0),
                COALESCE(AVG(fat), 0)
            FROM food_logs
            WHERE log_date BETWEEN ?1 AND ?2
            "#,
            params![from, to],
            |row| {
                Ok(MacroSummary {
                    calories: row.get(0)?,
                    protein: row.get(1)?,
                    carbs: row.get(2)?,
                    fat: row.get(3)?,
                })
            },
        )?;
        Ok(averages)
    }

    /// Calories per date between two dates (inclusive); dates without logs are omitted
    pub fn daily_calories(conn: &Connection, from: &str, to: &str) -> DbResult<Vec<DailyCalories>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT log_date, COALESCE(SUM(caloric_value), 0), COUNT(*)
            FROM food_logs
            WHERE log_date BETWEEN ?1 AND ?2
            GROUP BY log_date
            ORDER BY log_date ASC
            "#,
        )?;

        let days = stmt
            .query_map(params![from, to], |row| {
                Ok(DailyCalories {
                    date: row.get(0)?,
                    calories: row.get(1)?,
                    logs: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(days)
    }

    /// Calories per week of the year from `from` through `to`, weeks in date order
    ///
    /// Weeks without any log are omitted.
    pub fn weekly_calories_for_month(
        conn: &Connection,
        from: &str,
        to: &str,
    ) -> DbResult<Vec<WeeklyCalories>> {
        let mut weeks: Vec<WeeklyCalories> = Vec::new();

        for day in Self::daily_calories(conn, from, to)? {
            let week = year_week(parse_date(&day.date)?);
            match weeks.last_mut() {
                Some(last) if last.week == week => {
                    last.calories += day.calories;
                    last.logs += day.logs;
                }
                _ => weeks.push(WeeklyCalories {
                    week,
                    calories: day.calories,
                    logs: day.logs,
                }),
            }
        }

        Ok(weeks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use std::collections::BTreeMap;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn food(name: &str, calories: f64, protein: f64) -> NormalizedFood {
        NormalizedFood {
            food: name.to_string(),
            nutrients: Nutrients {
                caloric_value: calories,
                protein,
                carbohydrates: 10.0,
                fat: 2.0,
                vitamin_b12: 0.4,
                ..Default::default()
            },
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_create_copies_every_nutrient() {
        let conn = conn();
        let log = FoodLog::create(&conn, &food("apple", 52.0, 0.3), "2026-01-15").unwrap();

        assert_eq!(log.food_name, "apple");
        assert_eq!(log.log_date, "2026-01-15");
        assert_eq!(log.nutrients, food("apple", 52.0, 0.3).nutrients);
    }

    #[test]
    fn test_list_and_delete() {
        let conn = conn();
        let first = FoodLog::create(&conn, &food("apple", 52.0, 0.3), "2026-01-15").unwrap();
        let second = FoodLog::create(&conn, &food("banana", 105.0, 1.3), "2026-01-15").unwrap();
        FoodLog::create(&conn, &food("egg", 78.0, 6.3), "2026-01-16").unwrap();

        let day = FoodLog::list(&conn, Some("2026-01-15")).unwrap();
        assert_eq!(day.iter().map(|l| l.id).collect::<Vec<_>>(), vec![second.id, first.id]);
        assert_eq!(FoodLog::list(&conn, None).unwrap().len(), 3);

        assert!(FoodLog::delete(&conn, first.id).unwrap());
        assert!(!FoodLog::delete(&conn, first.id).unwrap());
        assert!(FoodLog::get_by_id(&conn, first.id).unwrap().is_none());
    }

    #[test]
    fn test_day_totals() {
        let conn = conn();
        FoodLog::create(&conn, &food("apple", 52.0, 0.3), "2026-01-15").unwrap();
        FoodLog::create(&conn, &food("banana", 105.0, 1.3), "2026-01-15").unwrap();

        let totals = FoodLog::day_totals(&conn, "2026-01-15").unwrap();
        assert_eq!(totals.calories, 157.0);
        assert!((totals.protein - 1.6).abs() < 1e-9);
        assert_eq!(totals.carbs, 20.0);
        assert_eq!(totals.fat, 4.0);

        assert_eq!(FoodLog::day_totals(&conn, "2026-01-14").unwrap(), MacroSummary::zero());
    }

    #[test]
    fn test_range_queries() {
        let conn = conn();
        FoodLog::create(&conn, &food("apple", 50.0, 1.0), "2026-01-12").unwrap();
        FoodLog::create(&conn, &food("banana", 100.0, 3.0), "2026-01-12").unwrap();
        FoodLog::create(&conn, &food("egg", 90.0, 5.0), "2026-01-14").unwrap();
        FoodLog::create(&conn, &food("toast", 80.0, 2.0), "2026-01-20").unwrap();

        let days = FoodLog::daily_calories(&conn, "2026-01-12", "2026-01-18").unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0], DailyCalories { date: "2026-01-12".to_string(), calories: 150.0, logs: 2 });

        let avg = FoodLog::average_macros(&conn, "2026-01-12", "2026-01-18").unwrap();
        assert!((avg.calories - 80.0).abs() < 1e-9);
        assert!((avg.protein - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_weekly_calories_for_month() {
        let conn = conn();
        // Weeks 1 (Jan 1-4), 3 (Jan 12-18) and 4 (Jan 19-25) of 2026
        FoodLog::create(&conn, &food("apple", 50.0, 1.0), "2026-01-02").unwrap();
        FoodLog::create(&conn, &food("banana", 100.0, 3.0), "2026-01-12").unwrap();
        FoodLog::create(&conn, &food("egg", 90.0, 5.0), "2026-01-18").unwrap();
        FoodLog::create(&conn, &food("toast", 80.0, 2.0), "2026-01-19").unwrap();

        let weeks = FoodLog::weekly_calories_for_month(&conn, "2026-01-01", "2026-01-31").unwrap();
        assert_eq!(
            weeks,
            vec![
                WeeklyCalories { week: 1, calories: 50.0, logs: 1 },
                WeeklyCalories { week: 3, calories: 190.0, logs: 2 },
                WeeklyCalories { week: 4, calories: 80.0, logs: 1 },
            ]
        );
    }

    #[test]
    fn test_weekly_calories_for_month_january_week_zero() {
        let conn = conn();
        // 2027-01-01 is a Friday, so Jan 1-3 come before week 1
        FoodLog::create(&conn, &food("apple", 50.0, 1.0), "2027-01-01").unwrap();
        FoodLog::create(&conn, &food("banana", 100.0, 3.0), "2027-01-03").unwrap();
        FoodLog::create(&conn, &food("egg", 90.0, 5.0), "2027-01-04").unwrap();

        let weeks = FoodLog::weekly_calories_for_month(&conn, "2027-01-01", "2027-01-31").unwrap();
        assert_eq!(
            weeks,
            vec![
                WeeklyCalories { week: 0, calories: 150.0, logs: 2 },
                WeeklyCalories { week: 1, calories: 90.0, logs: 1 },
            ]
        );
    }
}

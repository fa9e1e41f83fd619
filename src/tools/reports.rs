//! Report MCP Tools
//!
//! Weekly calorie breakdown with average macros, and month-to-date totals per
//! week of the year.

use chrono::Datelike;
use serde::Serialize;

use crate::db::Database;
use crate::models::dates::{format_date, month_start, resolve_date, week_days};
use crate::models::{FoodLog, MacroSummary, WeeklyCalories};

/// One day of the weekly report
#[derive(Debug, Serialize)]
pub struct DayCalories {
    /// Weekday abbreviation, e.g. "Mon"
    pub day: String,
    pub date: String,
    pub calories: f64,
}

/// Response for weekly_report
#[derive(Debug, Serialize)]
pub struct WeeklyReport {
    pub week_start: String,
    pub week_end: String,
    pub daily: Vec<DayCalories>,
    /// Average per logged food over the week
    pub macros: MacroSummary,
}

/// Response for monthly_report
#[derive(Debug, Serialize)]
pub struct MonthlyReport {
    pub month_start: String,
    pub through: String,
    pub weeks: Vec<WeeklyCalories>,
}

/// Monday..Sunday report for the week containing a date (default today)
pub fn weekly_report(db: &Database, date: Option<&str>) -> Result<WeeklyReport, String> {
    let day = resolve_date(date).map_err(|e| e.to_string())?;
    let days = week_days(day);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let mut daily = Vec::with_capacity(days.len());
    for d in &days {
        let d_str = format_date(*d);
        let totals = FoodLog::day_totals(&conn, &d_str)
            .map_err(|e| format!("Failed to get daily calories: {}", e))?;
        daily.push(DayCalories {
            day: d.weekday().to_string(),
            date: d_str,
            calories: totals.calories,
        });
    }

    let week_start = format_date(days[0]);
    let week_end = format_date(days[days.len() - 1]);
    let macros = FoodLog::average_macros(&conn, &week_start, &week_end)
        .map_err(|e| format!("Failed to get average macros: {}", e))?;

    Ok(WeeklyReport {
        week_start,
        week_end,
        daily,
        macros,
    })
}

/// Month-to-date calories per week of the year, through a date (default today)
pub fn monthly_report(db: &Database, date: Option<&str>) -> Result<MonthlyReport, String> {
    let day = resolve_date(date).map_err(|e| e.to_string())?;
    let from = format_date(month_start(day));
    let through = format_date(day);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let weeks = FoodLog::weekly_calories_for_month(&conn, &from, &through)
        .map_err(|e| format!("Failed to get monthly report: {}", e))?;

    Ok(MonthlyReport {
        month_start: from,
        through,
        weeks,
    })
}

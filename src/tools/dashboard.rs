//! Dashboard MCP Tools
//!
//! Daily intake, planned meals, hydration, the week's calorie progress and a
//! daily tip.

use chrono::Datelike;
use serde::Serialize;

use crate::assistant::{TipTopic, TipWriter};
use crate::db::Database;
use crate::models::dates::{format_date, resolve_date, today, week_days};
use crate::models::{FoodLog, Hydration, MacroSummary, SavedMealPlan};
use crate::nutrition::MealType;

/// A planned meal on the dashboard
#[derive(Debug, Serialize)]
pub struct DashboardMeal {
    pub meal_type: MealType,
    pub title: String,
    pub calories: f64,
    pub time: &'static str,
}

/// One day of the weekly progress bar
#[derive(Debug, Serialize)]
pub struct WeeklyProgress {
    /// Weekday initial, e.g. "M"
    pub day: String,
    pub date: String,
    pub calories: f64,
    pub is_today: bool,
}

/// Response for get_dashboard
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub date: String,
    pub intake: MacroSummary,
    pub meals: Vec<DashboardMeal>,
    /// Glasses of water
    pub hydration: i64,
    pub weekly: Vec<WeeklyProgress>,
}

/// Response for add_water
#[derive(Debug, Serialize)]
pub struct AddWaterResponse {
    pub date: String,
    pub glasses: i64,
}

/// Response for daily_tip
#[derive(Debug, Serialize)]
pub struct DailyTipResponse {
    pub tip: String,
    pub date: String,
    #[serde(flatten)]
    pub topic: TipTopic,
}

/// Usual time of day for a meal
pub fn time_slot(meal_type: MealType) -> &'static str {
    match meal_type {
        MealType::Breakfast => "08:00",
        MealType::Lunch => "13:00",
        MealType::Dinner => "19:00",
        MealType::Snack => "16:00",
    }
}

/// Dashboard for a date (default today)
///
/// The weekly progress covers Monday..Sunday of the date's week; `is_today`
/// marks the requested date.
pub fn get_dashboard(db: &Database, date: Option<&str>) -> Result<DashboardResponse, String> {
    let day = resolve_date(date).map_err(|e| e.to_string())?;
    let day_str = format_date(day);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let intake = FoodLog::day_totals(&conn, &day_str)
        .map_err(|e| format!("Failed to get intake: {}", e))?;

    let meals = SavedMealPlan::meals_for_date(&conn, &day_str)
        .map_err(|e| format!("Failed to get planned meals: {}", e))?
        .into_iter()
        .map(|meal| DashboardMeal {
            time: time_slot(meal.meal_type),
            meal_type: meal.meal_type,
            title: meal.title,
            calories: meal.calories,
        })
        .collect();

    let hydration = Hydration::glasses(&conn, &day_str)
        .map_err(|e| format!("Failed to get hydration: {}", e))?;

    let mut weekly = Vec::with_capacity(7);
    for d in week_days(day) {
        let d_str = format_date(d);
        let totals = FoodLog::day_totals(&conn, &d_str)
            .map_err(|e| format!("Failed to get weekly progress: {}", e))?;
        weekly.push(WeeklyProgress {
            day: d.weekday().to_string().chars().take(1).collect(),
            date: d_str,
            calories: totals.calories,
            is_today: d == day,
        });
    }

    Ok(DashboardResponse {
        date: day_str,
        intake,
        meals,
        hydration,
        weekly,
    })
}

/// Log one glass of water for a date (default today)
pub fn add_water(db: &Database, date: Option<&str>) -> Result<AddWaterResponse, String> {
    let day = format_date(resolve_date(date).map_err(|e| e.to_string())?);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let glasses = Hydration::add_glass(&conn, &day).map_err(|e| format!("Failed to add water: {}", e))?;
    Ok(AddWaterResponse { date: day, glasses })
}

/// Ask the tip writer for today's tip on `topic`
pub async fn daily_tip(writer: &dyn TipWriter, topic: TipTopic) -> Result<DailyTipResponse, String> {
    let tip = writer.write_tip(&topic).await.map_err(|e| {
        tracing::warn!("Daily tip failed: {}", e);
        format!("Failed to get a tip: {}", e)
    })?;

    Ok(DailyTipResponse {
        tip,
        date: format_date(today()),
        topic,
    })
}

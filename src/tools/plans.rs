//! Meal Plan MCP Tools
//!
//! Build meal plans from suggested foods, save them per date and list them.

use serde::Serialize;

use crate::assistant::MealSuggester;
use crate::db::Database;
use crate::models::dates::{format_date, resolve_date};
use crate::models::{MacroSummary, SavedMealPlan};
use crate::nutrition::{build_meal_plan, Dataset, MealPlan, MealSuggestions, MealType, UserProfile};

/// Response for save_meal_plan
#[derive(Debug, Serialize)]
pub struct SaveMealPlanResponse {
    pub plan_id: i64,
    pub date: String,
    pub meals: usize,
}

/// A saved meal as shown in the plan list
#[derive(Debug, Serialize)]
pub struct MealView {
    #[serde(rename = "type")]
    pub meal_type: MealType,
    pub title: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub calories: f64,
    pub items: Vec<String>,
    pub color: &'static str,
}

/// A saved plan as shown in the plan list
#[derive(Debug, Serialize)]
pub struct MealPlanView {
    pub date: String,
    pub target_calories: i64,
    pub summary: MacroSummary,
    pub meals: Vec<MealView>,
}

/// Display colour for a meal type
pub fn meal_color(meal_type: MealType) -> &'static str {
    match meal_type {
        MealType::Breakfast => "orange",
        MealType::Lunch => "blue",
        MealType::Dinner => "green",
        MealType::Snack => "purple",
    }
}

/// Build a plan from foods the caller already chose
pub fn plan_from_suggestions(
    dataset: &Dataset,
    profile: &UserProfile,
    suggestions: &MealSuggestions,
    cutoff: f64,
) -> Result<MealPlan, String> {
    build_meal_plan(dataset, profile, suggestions, cutoff)
        .map_err(|e| format!("Failed to build meal plan: {}", e))
}

/// Ask the suggester for foods, then build a plan from them
pub async fn generate_meal_plan(
    suggester: &dyn MealSuggester,
    dataset: &Dataset,
    profile: &UserProfile,
    cutoff: f64,
) -> Result<MealPlan, String> {
    let suggestions = suggester.suggest_meals(profile).await.map_err(|e| {
        tracing::warn!("Meal suggestion failed: {}", e);
        format!("Failed to get meal suggestions: {}", e)
    })?;

    plan_from_suggestions(dataset, profile, &suggestions, cutoff)
}

/// Save a plan for a date (default today), replacing any existing one
pub fn save_meal_plan(db: &Database, date: Option<&str>, plan: &MealPlan) -> Result<SaveMealPlanResponse, String> {
    let day = format_date(resolve_date(date).map_err(|e| e.to_string())?);

    let saved = db
        .with_conn_mut(|conn| SavedMealPlan::save(conn, &day, plan))
        .map_err(|e| format!("Failed to save meal plan: {}", e))?;
    tracing::info!("Saved meal plan {} for {} ({} meals)", saved.id, saved.plan_date, saved.meals.len());

    Ok(SaveMealPlanResponse {
        plan_id: saved.id,
        date: saved.plan_date,
        meals: saved.meals.len(),
    })
}

/// All saved plans, newest date first
pub fn list_meal_plans(db: &Database) -> Result<Vec<MealPlanView>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let plans = SavedMealPlan::list(&conn).map_err(|e| format!("Failed to list meal plans: {}", e))?;

    Ok(plans
        .into_iter()
        .map(|plan| MealPlanView {
            date: plan.plan_date,
            target_calories: plan.target_calories,
            summary: plan.summary,
            meals: plan
                .meals
                .into_iter()
                .map(|meal| MealView {
                    color: meal_color(meal.meal_type),
                    meal_type: meal.meal_type,
                    title: meal.title,
                    description: meal.description,
                    calories: meal.calories,
                    items: meal.items,
                })
                .collect(),
        })
        .collect())
}

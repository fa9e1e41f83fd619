//! Data models
//!
//! Rust structs representing database entities.

pub mod dates;
mod food_log;
mod hydration;
mod meal_plan;
mod nutrition;

pub use food_log::{DailyCalories, FoodLog, WeeklyCalories};
pub use hydration::Hydration;
pub use meal_plan::{SavedMeal, SavedMealPlan};
pub use nutrition::MacroSummary;

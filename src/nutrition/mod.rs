//! Nutrition engine
//!
//! Dataset loading, fuzzy food matching, row normalization and meal planning.

pub mod dataset;
pub mod error;
pub mod matcher;
pub mod planner;
pub mod record;

pub use dataset::Dataset;
pub use error::{NutritionError, NutritionResult};
pub use matcher::{match_food, ratio, sort_tokens, token_sort_ratio, DEFAULT_CUTOFF};
pub use planner::{
    activity_multiplier, build_meal_plan, calculate_bmr, generate_description, generate_title,
    target_calories, Gender, MealPlan, MealSuggestions, MealType, PlannedMeal, UserProfile,
};
pub use record::{
    db_column, FieldValue, FoodMatch, NormalizedFood, Nutrients, NutritionRecord, FOOD_COLUMN,
};

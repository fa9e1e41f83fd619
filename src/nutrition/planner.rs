//! Meal planning
//!
//! Energy targets from a user profile, and meal plans built by matching
//! suggested food names against the dataset.

use serde::{Deserialize, Serialize};

use super::dataset::Dataset;
use super::error::NutritionResult;
use crate::models::MacroSummary;

/// Biological sex used by the BMR equation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Anything other than "male" uses the female equation
    pub fn from_str(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("male") {
            Gender::Male
        } else {
            Gender::Female
        }
    }
}

/// Meal slot within a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    /// Display label, e.g. "Breakfast"
    pub fn label(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" => Some(MealType::Dinner),
            "snack" => Some(MealType::Snack),
            _ => None,
        }
    }
}

/// Profile the meal plan is generated for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub age: f64,
    pub gender: String,
    /// Kilograms
    pub weight: f64,
    /// Centimeters
    pub height: f64,
    /// Free text such as "moderately active"
    pub activity: String,
    #[serde(default)]
    pub preferences: Vec<String>,
}

impl UserProfile {
    pub fn gender(&self) -> Gender {
        Gender::from_str(&self.gender)
    }
}

/// Food names suggested for each meal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MealSuggestions {
    pub breakfast: Vec<String>,
    pub lunch: Vec<String>,
    pub dinner: Vec<String>,
    #[serde(default)]
    pub snack: Vec<String>,
}

impl MealSuggestions {
    pub fn foods(&self, meal_type: MealType) -> &[String] {
        match meal_type {
            MealType::Breakfast => &self.breakfast,
            MealType::Lunch => &self.lunch,
            MealType::Dinner => &self.dinner,
            MealType::Snack => &self.snack,
        }
    }
}

/// One meal of a generated plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedMeal {
    #[serde(rename = "type")]
    pub meal_type: MealType,
    pub title: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub calories: f64,
    /// Matched canonical food names
    pub items: Vec<String>,
}

/// A full day meal plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    pub target_calories: i64,
    pub summary: MacroSummary,
    pub meals: Vec<PlannedMeal>,
    /// Suggested foods that had no match in the dataset
    #[serde(default)]
    pub unmatched: Vec<String>,
}

/// Basal metabolic rate (Mifflin-St Jeor), kcal/day
pub fn calculate_bmr(gender: Gender, weight_kg: f64, height_cm: f64, age: f64) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age;
    match gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    }
}

/// Activity factor for a free-text activity level
pub fn activity_multiplier(level: &str) -> f64 {
    const LEVELS: [(&str, f64); 4] = [
        ("sedentary", 1.2),
        ("lightly", 1.375),
        ("moderately", 1.55),
        ("very", 1.725),
    ];

    let level = level.to_lowercase();
    LEVELS
        .iter()
        .find(|(keyword, _)| level.contains(keyword))
        .map(|(_, factor)| *factor)
        .unwrap_or(1.2)
}

/// Daily energy target (TDEE), truncated to whole kcal
pub fn target_calories(profile: &UserProfile) -> i64 {
    let bmr = calculate_bmr(profile.gender(), profile.weight, profile.height, profile.age);
    (bmr * activity_multiplier(&profile.activity)) as i64
}

/// Uppercase the first letter of every word, lowercase the rest
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if prev_alpha {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_alpha = c.is_alphabetic();
    }
    out
}

/// Short meal title from the first two items
pub fn generate_title(items: &[String]) -> String {
    if items.is_empty() {
        return "Healthy Meal".to_string();
    }
    let main: Vec<&str> = items.iter().take(2).map(String::as_str).collect();
    title_case(&main.join(" & "))
}

/// One-line description based on the first item
pub fn generate_description(meal_type: MealType, items: &[String]) -> String {
    let Some(first) = items.first() else {
        return match meal_type {
            MealType::Breakfast => "Light and energizing meal to start your day.",
            MealType::Lunch => "Balanced meal to keep you full and focused.",
            MealType::Dinner => "Nourishing meal for recovery and satiety.",
            MealType::Snack => "Simple snack to curb hunger between meals.",
        }
        .to_string();
    };

    let key = first.to_lowercase();
    let has_any = |words: &[&str]| words.iter().any(|w| key.contains(w));

    let focus = if has_any(&["chicken", "egg", "fish", "beef"]) {
        "High in protein"
    } else if has_any(&["rice", "bread", "oats", "potato"]) {
        "Rich in carbohydrates"
    } else if has_any(&["fruit", "vegetable", "salad"]) {
        "Rich in fiber and vitamins"
    } else {
        "Balanced nutrition"
    };

    format!("{} for your {}.", focus, meal_type.label().to_lowercase())
}

/// Build a meal plan from suggested foods
///
/// Foods without a match above `cutoff` are skipped and listed in
/// `unmatched`; the rest of the plan is still built.
pub fn build_meal_plan(
    dataset: &Dataset,
    profile: &UserProfile,
    suggestions: &MealSuggestions,
    cutoff: f64,
) -> NutritionResult<MealPlan> {
    let mut summary = MacroSummary::zero();
    let mut meals = Vec::new();
    let mut unmatched = Vec::new();

    for meal_type in MealType::ALL {
        let mut meal_calories = 0.0;
        let mut items = Vec::new();

        for food in suggestions.foods(meal_type) {
            let Some(found) = dataset.match_food(food, cutoff)? else {
                tracing::debug!("Skipping unmatched {} item '{}'", meal_type.label(), food);
                unmatched.push(food.clone());
                continue;
            };

            let macros = MacroSummary::from(&found.nutrition.nutrients);
            meal_calories += macros.calories;
            summary = summary + macros;
            items.push(found.nutrition.food);
        }

        meals.push(PlannedMeal {
            meal_type,
            title: generate_title(&items),
            description: generate_description(meal_type, &items),
            calories: meal_calories.round_ties_even(),
            items,
        });
    }

    Ok(MealPlan {
        target_calories: target_calories(profile),
        summary: summary.rounded(),
        meals,
        unmatched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::record::{Nutrients, NutritionRecord};

    fn profile() -> UserProfile {
        UserProfile {
            age: 30.0,
            gender: "Male".to_string(),
            weight: 70.0,
            height: 175.0,
            activity: "Moderately active".to_string(),
            preferences: vec!["high protein".to_string()],
        }
    }

    fn food(name: &str, calories: f64, protein: f64, carbs: f64, fat: f64) -> NutritionRecord {
        NutritionRecord {
            food: name.to_string(),
            nutrients: Nutrients {
                caloric_value: calories,
                protein,
                carbohydrates: carbs,
                fat,
                ..Default::default()
            },
            extra: Default::default(),
        }
    }

    #[test]
    fn test_bmr() {
        assert!((calculate_bmr(Gender::Male, 70.0, 175.0, 30.0) - 1648.75).abs() < 1e-9);
        assert!((calculate_bmr(Gender::Female, 60.0, 165.0, 25.0) - 1345.25).abs() < 1e-9);
    }

    #[test]
    fn test_gender_from_str() {
        assert_eq!(Gender::from_str(" MALE "), Gender::Male);
        assert_eq!(Gender::from_str("female"), Gender::Female);
        assert_eq!(Gender::from_str("other"), Gender::Female);
    }

    #[test]
    fn test_activity_multiplier() {
        assert_eq!(activity_multiplier("Sedentary"), 1.2);
        assert_eq!(activity_multiplier("lightly active"), 1.375);
        assert_eq!(activity_multiplier("Moderately active"), 1.55);
        assert_eq!(activity_multiplier("very active"), 1.725);
        assert_eq!(activity_multiplier("athlete"), 1.2);
    }

    #[test]
    fn test_target_calories_truncates() {
        // 1648.75 * 1.55 = 2555.5625
        assert_eq!(target_calories(&profile()), 2555);
    }

    #[test]
    fn test_generate_title() {
        assert_eq!(generate_title(&[]), "Healthy Meal");
        let items = vec!["oatmeal".to_string(), "banana".to_string(), "milk".to_string()];
        assert_eq!(generate_title(&items), "Oatmeal & Banana");
        assert_eq!(generate_title(&["cheese, cheddar".to_string()]), "Cheese, Cheddar");
    }

    #[test]
    fn test_generate_description() {
        assert_eq!(
            generate_description(MealType::Snack, &[]),
            "Simple snack to curb hunger between meals."
        );
        assert_eq!(
            generate_description(MealType::Dinner, &["grilled fish".to_string()]),
            "High in protein for your dinner."
        );
        assert_eq!(
            generate_description(MealType::Lunch, &["brown rice".to_string()]),
            "Rich in carbohydrates for your lunch."
        );
        assert_eq!(
            generate_description(MealType::Snack, &["fruit salad".to_string()]),
            "Rich in fiber and vitamins for your snack."
        );
        assert_eq!(
            generate_description(MealType::Breakfast, &["yogurt".to_string()]),
            "Balanced nutrition for your breakfast."
        );
    }

    #[test]
    fn test_build_meal_plan_skips_unmatched() {
        let dataset = Dataset::from_records(vec![
            food("scrambled eggs", 149.6, 10.0, 1.6, 11.0),
            food("whole wheat bread", 69.0, 3.6, 12.0, 0.9),
            food("grilled chicken breast", 165.0, 31.0, 0.0, 3.6),
            food("apple", 52.0, 0.3, 14.0, 0.2),
        ]);
        let suggestions = MealSuggestions {
            breakfast: vec!["Eggs Scrambled".to_string(), "whole wheat bread".to_string()],
            lunch: vec!["chicken breast grilled".to_string(), "quinoa tabbouleh".to_string()],
            dinner: vec![],
            snack: vec!["apple".to_string()],
        };

        let plan = build_meal_plan(&dataset, &profile(), &suggestions, 75.0).unwrap();

        assert_eq!(plan.target_calories, 2555);
        assert_eq!(plan.meals.len(), 4);
        assert_eq!(plan.meals[0].meal_type, MealType::Breakfast);
        assert_eq!(plan.meals[0].items, vec!["scrambled eggs", "whole wheat bread"]);
        assert_eq!(plan.meals[0].title, "Scrambled Eggs & Whole Wheat Bread");
        assert_eq!(plan.meals[0].calories, 219.0);
        assert_eq!(plan.meals[1].items, vec!["grilled chicken breast"]);
        assert_eq!(plan.meals[2].items.len(), 0);
        assert_eq!(plan.meals[2].title, "Healthy Meal");
        assert_eq!(plan.unmatched, vec!["quinoa tabbouleh"]);

        assert_eq!(plan.summary.calories, 436.0);
        assert_eq!(plan.summary.protein, 45.0);
        assert_eq!(plan.summary.carbs, 28.0);
        assert_eq!(plan.summary.fat, 16.0);
    }

    #[test]
    fn test_build_meal_plan_rounds_halves_to_even() {
        let dataset = Dataset::from_records(vec![
            food("toast", 100.25, 3.0, 18.0, 1.0),
            food("jam", 102.25, 0.5, 25.0, 0.0),
        ]);
        let suggestions = MealSuggestions {
            breakfast: vec!["toast".to_string(), "jam".to_string()],
            lunch: vec![],
            dinner: vec![],
            snack: vec![],
        };

        let plan = build_meal_plan(&dataset, &profile(), &suggestions, 75.0).unwrap();

        assert_eq!(plan.meals[0].calories, 202.0);
        assert_eq!(plan.summary.calories, 202.0);
        assert_eq!(plan.summary.protein, 4.0);
    }

    #[test]
    fn test_meal_plan_serializes_original_keys() {
        let meal = PlannedMeal {
            meal_type: MealType::Lunch,
            title: "Apple".to_string(),
            description: "Balanced nutrition for your lunch.".to_string(),
            calories: 52.0,
            items: vec!["apple".to_string()],
        };
        let value = serde_json::to_value(&meal).unwrap();
        assert_eq!(value["type"], "Lunch");
        assert_eq!(value["desc"], "Balanced nutrition for your lunch.");
    }
}

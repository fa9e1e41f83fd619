//! NutriMind Status Tool
//!
//! Provides runtime status information about the NutriMind service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::nutrition::dataset;

/// Usage guide for AI assistants
pub const NUTRIMIND_INSTRUCTIONS: &str = r#"
# NutriMind Instructions

NutriMind resolves free-text food names against a fixed nutrition dataset,
logs what the user eats, and builds daily meal plans.

## Dates

All dates are `YYYY-MM-DD`. Any `date` parameter may be omitted to mean today
(server local time).

## Matching Foods

**Tool:** `match_food`
- `name`: what the user said, e.g. "rice fried" or "Chicken Breast, Grilled"
- `cutoff` (optional, 0-100): minimum similarity score, default 75

Word order and case do not matter. A result with `found: false` means nothing
in the dataset scored at or above the cutoff; try a more common name rather
than lowering the cutoff below ~60.

The returned `nutrition` object always has `food` plus every nutrient column:
caloric value, fat, saturated/mono/polyunsaturated fats, carbohydrates,
sugars, protein, dietary fiber, cholesterol, sodium, water, vitamins
a, b1, b11, b12, b2, b3, b5, b6, c, d, e, k, minerals calcium, copper, iron,
magnesium, manganese, phosphorus, potassium, selenium, zinc, and nutrition
density. Missing values are 0.

## Photos

**Tool:** `scan_food` with `image` as a data URL
(`data:image/jpeg;base64,...`). The food is named by the vision model, then
matched like `match_food`. Requires `OPENAI_API_KEY`.

## Food Log

1. `log_food` with `name` (and optional `date`) matches and logs in one step
2. `list_food_logs` (optional `date`) shows entries, newest first
3. `delete_food_log` with `id` removes a mistaken entry

Only matched foods can be logged. If `log_food` returns `logged: false`,
confirm the food name with the user.

## Dashboard

- `get_dashboard`: intake totals, planned meals with times, water glasses and
  the Monday..Sunday calorie progress for the date's week
- `add_water`: one more glass for the date
- `daily_tip`: a short AI nutrition tip on a random topic; requires `OPENAI_API_KEY`

## Meal Plans

1. `generate_meal_plan` with the user's age, gender, weight (kg), height (cm),
   activity ("sedentary", "lightly active", "moderately active",
   "very active") and optional preferences; requires `OPENAI_API_KEY`
2. Or `plan_from_foods` with your own breakfast/lunch/dinner/snack food lists
3. `save_meal_plan` with the returned plan (replaces the plan for that date)
4. `list_meal_plans` shows saved plans, newest first

`unmatched` lists suggested foods that were left out of the plan.

## Reports

- `weekly_report`: calories per day Monday..Sunday and average macros per
  logged food
- `monthly_report`: month-to-date calories and log counts per week of the year
"#;

/// Dataset information, once loaded
#[derive(Debug, Clone, Serialize)]
pub struct DatasetStatus {
    pub rows: usize,
    pub files: usize,
    pub extra_columns: Vec<String>,
}

/// Runtime status of the NutriMind service
#[derive(Debug, Clone, Serialize)]
pub struct NutriMindStatus {
    pub build: BuildInfo,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Dataset information
    pub data_dir: String,
    pub dataset: Option<DatasetStatus>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    data_dir: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf, data_dir: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            data_dir,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> NutriMindStatus {
        // Get database size if it exists
        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let dataset = dataset::loaded().map(|d| DatasetStatus {
            rows: d.len(),
            files: d.source_files().len(),
            extra_columns: d.extra_columns().to_vec(),
        });

        // Get process info
        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        NutriMindStatus {
            build: BuildInfo::current(),
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            data_dir: self.data_dir.display().to_string(),
            dataset,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

//! NutriMind MCP Server Implementation
//!
//! Implements the MCP server with all NutriMind tools.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::assistant::{AssistantError, OpenAiClient, TipTopic};
use crate::config::Config;
use crate::db::Database;
use crate::nutrition::{dataset, Dataset, MealPlan, MealSuggestions, UserProfile};
use crate::tools::status::StatusTracker;
use crate::tools::{dashboard, foods, plans, reports};

/// NutriMind MCP Service
#[derive(Clone)]
pub struct NutriMindService {
    config: Arc<Config>,
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    /// None when no API key is configured
    assistant: Option<Arc<OpenAiClient>>,
    tool_router: ToolRouter<NutriMindService>,
}

impl NutriMindService {
    pub fn new(config: Config, database: Database) -> Self {
        let assistant = match OpenAiClient::from_config(&config) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::warn!("{}; scan_food, generate_meal_plan and daily_tip are disabled", e);
                None
            }
        };

        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(
                config.database_path.clone(),
                config.data_dir.clone(),
            ))),
            config: Arc::new(config),
            database,
            assistant,
            tool_router: Self::tool_router(),
        }
    }

    /// The nutrition dataset, loaded on first use
    fn dataset(&self) -> Result<&'static Dataset, McpError> {
        dataset::load(&self.config.data_dir).map_err(|e| {
            tracing::error!("Failed to load nutrition dataset: {}", e);
            McpError::internal_error(format!("Nutrition dataset unavailable: {}", e), None)
        })
    }

    fn assistant(&self) -> Result<&OpenAiClient, McpError> {
        self.assistant
            .as_deref()
            .ok_or_else(|| McpError::internal_error(AssistantError::NotConfigured.to_string(), None))
    }

    fn cutoff(&self, requested: Option<f64>) -> f64 {
        requested.unwrap_or(self.config.match_cutoff)
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Food Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MatchFoodParams {
    /// Free-text food name, e.g. "rice fried"
    pub name: String,
    /// Minimum similarity score 0-100 (default 75)
    pub cutoff: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ScanFoodParams {
    /// Photo as a data URL: data:image/jpeg;base64,...
    pub image: String,
    pub cutoff: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogFoodParams {
    pub name: String,
    /// YYYY-MM-DD, default today
    pub date: Option<String>,
    pub cutoff: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DateParams {
    /// YYYY-MM-DD, default today
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteFoodLogParams {
    pub id: i64,
}

// ============================================================================
// Meal Plan Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GenerateMealPlanParams {
    pub age: f64,
    /// "male" or "female"
    pub gender: String,
    /// Kilograms
    pub weight: f64,
    /// Centimeters
    pub height: f64,
    /// "sedentary", "lightly active", "moderately active" or "very active"
    pub activity: String,
    #[serde(default)]
    pub preferences: Vec<String>,
    pub cutoff: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PlanFromFoodsParams {
    pub age: f64,
    pub gender: String,
    pub weight: f64,
    pub height: f64,
    pub activity: String,
    pub breakfast: Vec<String>,
    pub lunch: Vec<String>,
    pub dinner: Vec<String>,
    #[serde(default)]
    pub snack: Vec<String>,
    pub cutoff: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SaveMealPlanParams {
    /// YYYY-MM-DD, default today
    pub date: Option<String>,
    /// A plan as returned by generate_meal_plan or plan_from_foods
    pub plan: serde_json::Value,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl NutriMindService {
    // --- Status ---

    #[tool(description = "Get the current status of the NutriMind service including build info, database and dataset status, and process information")]
    async fn nutrimind_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status();
        json_result(&status)
    }

    #[tool(description = "Get instructions for matching foods, logging meals, meal plans and reports. Call this first when unsure how to use the NutriMind tools.")]
    fn nutrimind_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::NUTRIMIND_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(NUTRIMIND_INSTRUCTIONS)]))
    }

    // --- Foods ---

    #[tool(description = "Find the nutrition record that best matches a free-text food name. Word order and case are ignored.")]
    fn match_food(&self, Parameters(p): Parameters<MatchFoodParams>) -> Result<CallToolResult, McpError> {
        let result = foods::match_food_tool(self.dataset()?, &p.name, self.cutoff(p.cutoff))
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Identify the food in a photo (data URL) and return its nutrition record")]
    async fn scan_food(&self, Parameters(p): Parameters<ScanFoodParams>) -> Result<CallToolResult, McpError> {
        let result = foods::scan_food(self.assistant()?, self.dataset()?, &p.image, self.cutoff(p.cutoff))
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Match a food name and log it for a date (default today)")]
    fn log_food(&self, Parameters(p): Parameters<LogFoodParams>) -> Result<CallToolResult, McpError> {
        let result = foods::log_food(&self.database, self.dataset()?, &p.name, p.date.as_deref(), self.cutoff(p.cutoff))
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "List logged foods, newest first, optionally for one date")]
    fn list_food_logs(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = foods::list_food_logs(&self.database, p.date.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete a food log entry by id")]
    fn delete_food_log(&self, Parameters(p): Parameters<DeleteFoodLogParams>) -> Result<CallToolResult, McpError> {
        let result = foods::delete_food_log(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Dashboard ---

    #[tool(description = "Get the dashboard for a date: intake totals, planned meals, water glasses and weekly calorie progress")]
    fn get_dashboard(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = dashboard::get_dashboard(&self.database, p.date.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Log one glass of water for a date (default today)")]
    fn add_water(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = dashboard::add_water(&self.database, p.date.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get a short AI nutrition tip for today on a random topic")]
    async fn daily_tip(&self) -> Result<CallToolResult, McpError> {
        let result = dashboard::daily_tip(self.assistant()?, TipTopic::random())
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Meal Plans ---

    #[tool(description = "Generate a one-day meal plan for a user profile using AI food suggestions matched against the nutrition dataset")]
    async fn generate_meal_plan(&self, Parameters(p): Parameters<GenerateMealPlanParams>) -> Result<CallToolResult, McpError> {
        let profile = UserProfile {
            age: p.age,
            gender: p.gender,
            weight: p.weight,
            height: p.height,
            activity: p.activity,
            preferences: p.preferences,
        };
        let result = plans::generate_meal_plan(self.assistant()?, self.dataset()?, &profile, self.cutoff(p.cutoff))
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Build a one-day meal plan from your own breakfast, lunch, dinner and snack food lists")]
    fn plan_from_foods(&self, Parameters(p): Parameters<PlanFromFoodsParams>) -> Result<CallToolResult, McpError> {
        let profile = UserProfile {
            age: p.age,
            gender: p.gender,
            weight: p.weight,
            height: p.height,
            activity: p.activity,
            preferences: Vec::new(),
        };
        let suggestions = MealSuggestions {
            breakfast: p.breakfast,
            lunch: p.lunch,
            dinner: p.dinner,
            snack: p.snack,
        };
        let result = plans::plan_from_suggestions(self.dataset()?, &profile, &suggestions, self.cutoff(p.cutoff))
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Save a meal plan for a date (default today), replacing any plan already saved for that date")]
    fn save_meal_plan(&self, Parameters(p): Parameters<SaveMealPlanParams>) -> Result<CallToolResult, McpError> {
        let plan: MealPlan = serde_json::from_value(p.plan)
            .map_err(|e| McpError::invalid_params(format!("Invalid meal plan: {}", e), None))?;
        let result = plans::save_meal_plan(&self.database, p.date.as_deref(), &plan)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "List saved meal plans, newest first")]
    fn list_meal_plans(&self) -> Result<CallToolResult, McpError> {
        let result = plans::list_meal_plans(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Reports ---

    #[tool(description = "Weekly report: calories per day Monday..Sunday and average macros for the week containing a date")]
    fn weekly_report(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = reports::weekly_report(&self.database, p.date.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Monthly report: month-to-date calories and log counts per week of the year")]
    fn monthly_report(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = reports::monthly_report(&self.database, p.date.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for NutriMindService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "nutrimind".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("NutriMind".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "NutriMind - Food matching, meal logging and meal planning. \
                 IMPORTANT: Call nutrimind_instructions first. \
                 Foods: match_food, scan_food (photo). \
                 Food log: log_food, list_food_logs, delete_food_log. \
                 Dashboard: get_dashboard, add_water, daily_tip. \
                 Meal plans: generate_meal_plan, plan_from_foods, save_meal_plan, list_meal_plans. \
                 Reports: weekly_report, monthly_report. \
                 Dates are YYYY-MM-DD and default to today."
                    .into(),
            ),
        }
    }
}

//! Food matching and food log MCP Tools
//!
//! Resolve free-text food names against the dataset, recognize photos, and
//! log matched foods.

use serde::Serialize;

use crate::assistant::{strip_data_url, FoodRecognizer};
use crate::db::Database;
use crate::models::dates::{format_date, resolve_date};
use crate::models::FoodLog;
use crate::nutrition::{Dataset, FoodMatch, NormalizedFood};

/// Response for match_food
#[derive(Debug, Serialize)]
pub struct MatchFoodResponse {
    pub found: bool,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<NormalizedFood>,
}

/// Response for scan_food
#[derive(Debug, Serialize)]
pub struct ScanFoodResponse {
    pub found: bool,
    /// Name the recognizer gave the food
    pub food: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<NormalizedFood>,
}

/// Response for log_food
#[derive(Debug, Serialize)]
pub struct LogFoodResponse {
    pub logged: bool,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<FoodLog>,
}

/// Response for list_food_logs
#[derive(Debug, Serialize)]
pub struct ListFoodLogsResponse {
    pub date: Option<String>,
    pub count: usize,
    pub logs: Vec<FoodLog>,
}

/// Response for delete_food_log
#[derive(Debug, Serialize)]
pub struct DeleteFoodLogResponse {
    pub id: i64,
    pub deleted: bool,
}

fn find(dataset: &Dataset, name: &str, cutoff: f64) -> Result<Option<FoodMatch>, String> {
    dataset
        .match_food(name, cutoff)
        .map_err(|e| format!("Failed to match food: {}", e))
}

// ============================================================================
// Matching Tools
// ============================================================================

/// Resolve a food name to its nutrition record
pub fn match_food_tool(dataset: &Dataset, name: &str, cutoff: f64) -> Result<MatchFoodResponse, String> {
    let found = find(dataset, name, cutoff)?;
    Ok(MatchFoodResponse {
        found: found.is_some(),
        query: name.to_string(),
        score: found.as_ref().map(|m| m.score),
        nutrition: found.map(|m| m.nutrition),
    })
}

/// Recognize the food in a photo and resolve it
///
/// `image` is a data URL (`data:image/jpeg;base64,...`).
pub async fn scan_food(
    recognizer: &dyn FoodRecognizer,
    dataset: &Dataset,
    image: &str,
    cutoff: f64,
) -> Result<ScanFoodResponse, String> {
    let payload = strip_data_url(image).map_err(|e| e.to_string())?;

    let food = recognizer.recognize_food(payload).await.map_err(|e| {
        tracing::warn!("Food recognition failed: {}", e);
        format!("Scan failed: {}", e)
    })?;

    let found = find(dataset, &food, cutoff)?;
    Ok(ScanFoodResponse {
        found: found.is_some(),
        food,
        score: found.as_ref().map(|m| m.score),
        nutrition: found.map(|m| m.nutrition),
    })
}

// ============================================================================
// Food Log Tools
// ============================================================================

/// Match a food and log it for a date (default today)
pub fn log_food(
    db: &Database,
    dataset: &Dataset,
    name: &str,
    date: Option<&str>,
    cutoff: f64,
) -> Result<LogFoodResponse, String> {
    let log_date = resolve_date(date).map_err(|e| e.to_string())?;

    let Some(found) = find(dataset, name, cutoff)? else {
        return Ok(LogFoodResponse {
            logged: false,
            query: name.to_string(),
            score: None,
            log: None,
        });
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let log = FoodLog::create(&conn, &found.nutrition, &format_date(log_date))
        .map_err(|e| format!("Failed to log food: {}", e))?;
    tracing::info!("Logged {} for {}", log.food_name, log.log_date);

    Ok(LogFoodResponse {
        logged: true,
        query: name.to_string(),
        score: Some(found.score),
        log: Some(log),
    })
}

/// List logged foods, newest first, optionally for one date
pub fn list_food_logs(db: &Database, date: Option<&str>) -> Result<ListFoodLogsResponse, String> {
    let date = date
        .map(|d| resolve_date(Some(d)).map(format_date))
        .transpose()
        .map_err(|e| e.to_string())?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let logs = FoodLog::list(&conn, date.as_deref())
        .map_err(|e| format!("Failed to list food logs: {}", e))?;

    Ok(ListFoodLogsResponse {
        date,
        count: logs.len(),
        logs,
    })
}

/// Delete a food log entry
pub fn delete_food_log(db: &Database, id: i64) -> Result<DeleteFoodLogResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let deleted = FoodLog::delete(&conn, id).map_err(|e| format!("Failed to delete food log: {}", e))?;
    Ok(DeleteFoodLogResponse { id, deleted })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::{AssistantError, AssistantResult};
    use crate::nutrition::{Nutrients, NutritionRecord};
    use async_trait::async_trait;

    fn dataset() -> Dataset {
        let record = |food: &str, calories: f64| NutritionRecord {
            food: food.to_string(),
            nutrients: Nutrients { caloric_value: calories, ..Default::default() },
            extra: Default::default(),
        };
        Dataset::from_records(vec![record("fried rice", 238.0), record("apple", 52.0)])
    }

    struct FixedRecognizer(&'static str);

    #[async_trait]
    impl FoodRecognizer for FixedRecognizer {
        async fn recognize_food(&self, image: &str) -> AssistantResult<String> {
            assert_eq!(image, "/9j/4AAQ");
            Ok(self.0.to_string())
        }
    }

    struct FailingRecognizer;

    #[async_trait]
    impl FoodRecognizer for FailingRecognizer {
        async fn recognize_food(&self, _image: &str) -> AssistantResult<String> {
            Err(AssistantError::EmptyResponse)
        }
    }

    #[test]
    fn test_match_food_tool() {
        let found = match_food_tool(&dataset(), "Rice Fried", 75.0).unwrap();
        assert!(found.found);
        assert_eq!(found.score, Some(100.0));
        assert_eq!(found.nutrition.unwrap().food, "fried rice");

        let missing = match_food_tool(&dataset(), "quinoa", 75.0).unwrap();
        assert!(!missing.found);
        assert!(missing.nutrition.is_none());

        assert!(match_food_tool(&dataset(), "apple", 101.0).is_err());
    }

    #[tokio::test]
    async fn test_scan_food() {
        let image = "data:image/jpeg;base64,/9j/4AAQ";

        let hit = scan_food(&FixedRecognizer("fried rice"), &dataset(), image, 75.0).await.unwrap();
        assert!(hit.found);
        assert_eq!(hit.nutrition.unwrap().nutrients.caloric_value, 238.0);

        let miss = scan_food(&FixedRecognizer("sushi"), &dataset(), image, 75.0).await.unwrap();
        assert!(!miss.found);
        assert_eq!(miss.food, "sushi");

        assert!(scan_food(&FixedRecognizer("apple"), &dataset(), "not-a-data-url", 75.0)
            .await
            .is_err());
        assert!(scan_food(&FailingRecognizer, &dataset(), image, 75.0).await.is_err());
    }

    #[test]
    fn test_log_list_delete() {
        let db = Database::in_memory().unwrap();
        let data = dataset();

        let logged = log_food(&db, &data, "apple", Some("2026-01-15"), 75.0).unwrap();
        assert!(logged.logged);
        let log = logged.log.unwrap();
        assert_eq!(log.food_name, "apple");
        assert_eq!(log.log_date, "2026-01-15");

        let skipped = log_food(&db, &data, "quinoa", Some("2026-01-15"), 75.0).unwrap();
        assert!(!skipped.logged);

        assert!(log_food(&db, &data, "apple", Some("yesterday"), 75.0).is_err());

        let listed = list_food_logs(&db, Some("2026-01-15")).unwrap();
        assert_eq!(listed.count, 1);
        assert_eq!(list_food_logs(&db, Some("2026-01-16")).unwrap().count, 0);

        assert!(delete_food_log(&db, log.id).unwrap().deleted);
        assert_eq!(list_food_logs(&db, None).unwrap().count, 0);
    }
}

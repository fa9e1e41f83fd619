//! Assistant collaborators
//!
//! Meal suggestions, food photo recognition and daily tips. Each sits behind a
//! trait so the tools can run against any backend; `OpenAiClient` is the one
//! shipped.

mod openai;

use async_trait::async_trait;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use crate::nutrition::{MealSuggestions, UserProfile};

pub use openai::OpenAiClient;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Assistant is not configured: set OPENAI_API_KEY")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Malformed API response: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    #[error("API returned an empty response")]
    EmptyResponse,

    #[error("Meal suggestions are not valid JSON of the expected shape: {0}")]
    InvalidSuggestions(#[source] serde_json::Error),

    #[error("Invalid image format: expected a data URL with a base64 payload")]
    InvalidImage,
}

pub type AssistantResult<T> = Result<T, AssistantError>;

/// Suggests food names for each meal of a day
#[async_trait]
pub trait MealSuggester: Send + Sync {
    async fn suggest_meals(&self, profile: &UserProfile) -> AssistantResult<MealSuggestions>;
}

/// Names the food shown in a photo
#[async_trait]
pub trait FoodRecognizer: Send + Sync {
    /// `image` is a bare base64 JPEG payload
    async fn recognize_food(&self, image: &str) -> AssistantResult<String>;
}

/// Writes a short nutrition tip on a topic
#[async_trait]
pub trait TipWriter: Send + Sync {
    async fn write_tip(&self, topic: &TipTopic) -> AssistantResult<String>;
}

pub const TIP_CATEGORIES: [&str; 10] = [
    "hydration habit",
    "protein intake",
    "carbohydrate timing",
    "healthy fat",
    "portion control",
    "meal timing",
    "gut health",
    "mindful eating",
    "snack choice",
    "sleep and nutrition",
];

pub const TIP_STYLES: [&str; 5] = [
    "practical advice",
    "simple habit",
    "did you know fact",
    "daily challenge",
    "common mistake to avoid",
];

/// Subject and phrasing of a daily tip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TipTopic {
    pub category: &'static str,
    pub style: &'static str,
}

impl TipTopic {
    pub fn random() -> Self {
        Self::pick(&mut rand::thread_rng())
    }

    pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            category: TIP_CATEGORIES[rng.gen_range(0..TIP_CATEGORIES.len())],
            style: TIP_STYLES[rng.gen_range(0..TIP_STYLES.len())],
        }
    }
}

/// Remove one surrounding markdown code fence (with optional language tag)
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return trimmed;
    };

    // A language tag is a bare word right after the opening fence
    let inner = inner.trim_start();
    let body = inner.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    body.trim()
}

/// Parse a model reply into meal suggestions
///
/// The reply must be a JSON object with `breakfast`, `lunch` and `dinner`
/// string lists and an optional `snack` list. Other keys are rejected.
pub fn parse_meal_suggestions(text: &str) -> AssistantResult<MealSuggestions> {
    serde_json::from_str(strip_code_fence(text)).map_err(AssistantError::InvalidSuggestions)
}

/// Extract the base64 payload from a `data:image/...;base64,<payload>` URL
pub fn strip_data_url(image: &str) -> AssistantResult<&str> {
    let (_, payload) = image.split_once(',').ok_or(AssistantError::InvalidImage)?;
    let payload = payload.trim();
    if payload.is_empty() {
        return Err(AssistantError::InvalidImage);
    }
    Ok(payload)
}

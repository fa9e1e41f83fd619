//! OpenAI chat-completions client
//!
//! Works against any OpenAI-compatible endpoint via `OPENAI_BASE_URL`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{
    parse_meal_suggestions, AssistantError, AssistantResult, FoodRecognizer, MealSuggester, TipTopic, TipWriter,
};
use crate::config::Config;
use crate::nutrition::{MealSuggestions, UserProfile};

const VISION_PROMPT: &str = "Identify the food in this image as a SINGLE specific food name \
commonly used in nutrition databases. Return ONLY the food name.";

const TIP_SYSTEM_PROMPT: &str = "You are a nutrition coach. Give concise, non-repetitive daily tips. \
Avoid generic advice like 'eat more fruits and vegetables'.";

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    chat_model: String,
    vision_model: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        chat_model: impl Into<String>,
        vision_model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
            chat_model: chat_model.into(),
            vision_model: vision_model.into(),
        }
    }

    /// Client for the configured endpoint, if an API key is set
    pub fn from_config(config: &Config) -> AssistantResult<Self> {
        let api_key = config
            .openai_api_key
            .as_deref()
            .ok_or(AssistantError::NotConfigured)?;
        Ok(Self::new(
            api_key,
            config.openai_base_url.as_str(),
            config.chat_model.as_str(),
            config.vision_model.as_str(),
        ))
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint)
    }

    async fn complete(&self, body: Value) -> AssistantResult<String> {
        let response = self
            .client
            .post(self.api_url("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!("Chat completion failed with status {}", status);
            return Err(AssistantError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        let content = first_choice_content(&text)?;
        debug!("Chat completion returned {} chars", content.len());
        Ok(content)
    }
}

/// The first choice's message content from a chat-completions response body
fn first_choice_content(body: &str) -> AssistantResult<String> {
    let completion: ChatCompletion =
        serde_json::from_str(body).map_err(AssistantError::MalformedResponse)?;

    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(AssistantError::EmptyResponse)
}

/// Prompt asking for food names only, in the `MealSuggestions` JSON shape
pub(crate) fn meal_prompt(profile: &UserProfile) -> String {
    format!(
        r#"You are a nutrition assistant.

Recommend:
- Breakfast
- Lunch
- Dinner
- Snack

Rules:
- ONLY food names
- NO calories
- NO nutrition numbers
- Foods must match common food database names

User profile:
Age: {}
Gender: {}
Weight: {} kg
Height: {} cm
Activity: {}
Preferences: {}

Return JSON exactly:
{{
  "breakfast": ["food1", "food2"],
  "lunch": ["food1", "food2"],
  "dinner": ["food1", "food2"],
  "snack": ["food1"]
}}"#,
        profile.age,
        profile.gender,
        profile.weight,
        profile.height,
        profile.activity,
        profile.preferences.join(", ")
    )
}

pub(crate) fn tip_prompt(topic: &TipTopic) -> String {
    format!(
        "Give ONE {} nutrition tip about {}. Max 18 words. No emojis. No explanations.",
        topic.style, topic.category
    )
}

#[async_trait]
impl MealSuggester for OpenAiClient {
    async fn suggest_meals(&self, profile: &UserProfile) -> AssistantResult<MealSuggestions> {
        let body = json!({
            "model": self.chat_model,
            "messages": [{ "role": "user", "content": meal_prompt(profile) }],
            "temperature": 0.6,
        });

        let reply = self.complete(body).await?;
        parse_meal_suggestions(&reply).inspect_err(|e| warn!("Rejected meal suggestions: {}", e))
    }
}

#[async_trait]
impl FoodRecognizer for OpenAiClient {
    async fn recognize_food(&self, image: &str) -> AssistantResult<String> {
        let body = json!({
            "model": self.vision_model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": VISION_PROMPT },
                    {
                        "type": "image_url",
                        "image_url": {
                            "url": format!("data:image/jpeg;base64,{}", image),
                            "detail": "low",
                        },
                    },
                ],
            }],
        });

        let name = self.complete(body).await?;
        Ok(name.trim().to_lowercase())
    }
}

#[async_trait]
impl TipWriter for OpenAiClient {
    async fn write_tip(&self, topic: &TipTopic) -> AssistantResult<String> {
        let body = json!({
            "model": self.chat_model,
            "messages": [
                { "role": "system", "content": TIP_SYSTEM_PROMPT },
                { "role": "user", "content": tip_prompt(topic) },
            ],
            "temperature": 1.2,
            "presence_penalty": 0.8,
            "frequency_penalty": 0.6,
        });

        let tip = self.complete(body).await?;
        Ok(tip.trim().to_string())
    }
}

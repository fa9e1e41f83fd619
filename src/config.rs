//! Runtime configuration
//!
//! Read from environment variables, with defaults relative to the project root.

use std::path::PathBuf;

use crate::nutrition::DEFAULT_CUTOFF;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_VISION_MODEL: &str = "gpt-4.1-mini";

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite file for food logs, hydration and saved plans
    pub database_path: PathBuf,
    /// Directory holding the nutrition CSV files
    pub data_dir: PathBuf,
    /// Minimum match score (0-100)
    pub match_cutoff: f64,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub chat_model: String,
    pub vision_model: String,
}

/// Project root: the executable's directory, or two levels up from target/release|debug
fn project_root() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(parent) = path.parent() {
            if let Some(grandparent) = parent.parent() {
                path = grandparent.to_path_buf();
            }
        }
    }

    path
}

fn parse_cutoff(raw: Option<String>) -> f64 {
    let Some(raw) = raw else {
        return DEFAULT_CUTOFF;
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if (0.0..=100.0).contains(&v) => v,
        _ => {
            tracing::warn!(
                "Ignoring NUTRIMIND_MATCH_CUTOFF={:?}, using {}",
                raw,
                DEFAULT_CUTOFF
            );
            DEFAULT_CUTOFF
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from any variable source
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = var("NUTRIMIND_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| project_root().join("data"));

        let database_path = var("NUTRIMIND_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| project_root().join("data").join("nutrimind.db"));

        Self {
            database_path,
            data_dir,
            match_cutoff: parse_cutoff(var("NUTRIMIND_MATCH_CUTOFF")),
            openai_api_key: var("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()),
            openai_base_url: var("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            chat_model: var("NUTRIMIND_CHAT_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            vision_model: var("NUTRIMIND_VISION_MODEL")
                .unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string()),
        }
    }
}

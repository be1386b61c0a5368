// Runtime configuration, read from the environment after `.env` is loaded.

use reqwest::Url;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:3030";

/// Guild id baked in at compile time, used when none is set at runtime.
const BUILD_DEFAULT_GUILD_ID: Option<&str> = option_env!("DEFAULT_GUILD_ID");

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("WELCOME_API_URL is not a valid URL: {0}")]
    InvalidApiUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub default_guild_id: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup, so tests don't touch the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = lookup("WELCOME_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();

        if Url::parse(&api_base_url).is_err() {
            return Err(ConfigError::InvalidApiUrl(api_base_url));
        }

        let default_guild_id = lookup("DEFAULT_GUILD_ID")
            .or_else(|| BUILD_DEFAULT_GUILD_ID.map(str::to_string))
            .map(|id| id.trim().to_string())
            .unwrap_or_default();

        if default_guild_id.is_empty() {
            tracing::warn!("No DEFAULT_GUILD_ID configured; pass --guild to pick one");
        }

        Ok(Self {
            api_base_url,
            default_guild_id,
        })
    }
}

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::{CompletionSettings, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a number does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub completion_model: String,
    pub ranking_timeout_secs: u64,
    pub estimation_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: optional_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            completion_model: std::env::var("COMPLETION_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            ranking_timeout_secs: optional_env("RANKING_TIMEOUT_SECS", 60)?,
            estimation_timeout_secs: optional_env("ESTIMATION_TIMEOUT_SECS", 45)?,
        })
    }

    pub fn completion_settings(&self) -> CompletionSettings {
        CompletionSettings {
            model: self.completion_model.clone(),
            ranking_timeout: Duration::from_secs(self.ranking_timeout_secs),
            estimation_timeout: Duration::from_secs(self.estimation_timeout_secs),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_env_defaults_when_unset() {
        let value: u64 = optional_env("MATCHER_TEST_UNSET_TIMEOUT", 45).unwrap();
        assert_eq!(value, 45);
    }

    #[test]
    fn test_completion_settings_from_config() {
        let config = Config {
            anthropic_api_key: "key".to_string(),
            port: 8080,
            rust_log: "info".to_string(),
            completion_model: "claude-test".to_string(),
            ranking_timeout_secs: 30,
            estimation_timeout_secs: 10,
        };
        let settings = config.completion_settings();
        assert_eq!(settings.model, "claude-test");
        assert_eq!(settings.ranking_timeout, Duration::from_secs(30));
        assert_eq!(settings.estimation_timeout, Duration::from_secs(10));
    }
}

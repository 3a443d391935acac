use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

use crate::services::openrouter::DEFAULT_API_URL;
use crate::services::prompt::CompletionSettings;

#[derive(Debug, Clone)]
pub struct Config {
    pub openrouter_api_key: String,
    pub openrouter_api_url: String,
    pub completion: CompletionSettings,
    pub referer: Option<String>,
    pub title: Option<String>,
    pub form_server_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests need not touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let openrouter_api_key = get("OPENROUTER_API_KEY")
            .context("OPENROUTER_API_KEY must be set in .env file")?;

        let defaults = CompletionSettings::default();
        let completion = CompletionSettings {
            model: get("OPENROUTER_MODEL").unwrap_or(defaults.model),
            max_tokens: parse_or(get("OPENROUTER_MAX_TOKENS"), "OPENROUTER_MAX_TOKENS", defaults.max_tokens)?,
            temperature: parse_or(get("OPENROUTER_TEMPERATURE"), "OPENROUTER_TEMPERATURE", defaults.temperature)?,
        };

        Ok(Self {
            openrouter_api_key,
            openrouter_api_url: get("OPENROUTER_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            completion,
            referer: get("OPENROUTER_REFERER"),
            title: Some(get("OPENROUTER_TITLE").unwrap_or_else(|| "Dieta Generator".to_string())),
            form_server_addr: get("FORM_SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", key, value)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("OPENROUTER_API_KEY", "sk-test")]).unwrap();

        assert_eq!(config.openrouter_api_key, "sk-test");
        assert_eq!(config.openrouter_api_url, DEFAULT_API_URL);
        assert_eq!(config.completion, CompletionSettings::default());
        assert_eq!(config.referer, None);
        assert_eq!(config.title.as_deref(), Some("Dieta Generator"));
        assert_eq!(config.form_server_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_missing_api_key() {
        assert!(config_from(&[]).is_err());
        assert!(config_from(&[("OPENROUTER_API_KEY", "  ")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("OPENROUTER_API_KEY", "sk-test"),
            ("OPENROUTER_MODEL", "openai/gpt-4o-mini"),
            ("OPENROUTER_MAX_TOKENS", "800"),
            ("OPENROUTER_TEMPERATURE", "0.2"),
            ("FORM_SERVER_ADDR", "127.0.0.1:3000"),
        ])
        .unwrap();

        assert_eq!(config.completion.model, "openai/gpt-4o-mini");
        assert_eq!(config.completion.max_tokens, 800);
        assert!((config.completion.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.form_server_addr, "127.0.0.1:3000");
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        let err = config_from(&[
            ("OPENROUTER_API_KEY", "sk-test"),
            ("OPENROUTER_MAX_TOKENS", "lots"),
        ])
        .unwrap_err();

        assert!(err.to_string().contains("OPENROUTER_MAX_TOKENS"));
    }
}

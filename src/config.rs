//! Environment-driven configuration
//!
//! Values are read once at startup, after `.env` has been loaded.

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::llm::GenerationConfig;
use crate::relay::{ChatSettings, PacingPolicy};

pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_INSTITUTION: &str = "NCIRL (National College of Ireland)";

/// Numbered keys are scanned up to this index
const MAX_NUMBERED_KEYS: usize = 64;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("No Groq API keys configured; set GROQ_API_KEY_1 or GROQ_API_KEY")]
    NoApiKeys,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_pool_size: usize,
    pub admin_password: String,
    pub api_keys: Vec<String>,
    pub groq_base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream_delay: Duration,
    pub history_turns: usize,
    pub institution: String,
    pub host: IpAddr,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; used by tests to avoid touching the process env
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let api_keys = collect_api_keys(&get);
        if api_keys.is_empty() {
            return Err(ConfigError::NoApiKeys);
        }

        Ok(Self {
            database_url,
            db_pool_size: parse_or(&get, "DB_POOL_SIZE", 10)?,
            admin_password: get("ADMIN_PASSWORD")
                .unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string()),
            api_keys,
            groq_base_url: get("GROQ_BASE_URL"),
            model: get("CHAT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: parse_or(&get, "CHAT_TEMPERATURE", 0.7)?,
            max_tokens: parse_or(&get, "CHAT_MAX_TOKENS", 1024)?,
            stream_delay: Duration::from_millis(parse_or(&get, "STREAM_DELAY_MS", 30)?),
            history_turns: parse_or(&get, "HISTORY_TURNS", 10)?,
            institution: get("COLLEGE_NAME").unwrap_or_else(|| DEFAULT_INSTITUTION.to_string()),
            host: parse_or(&get, "HOST", IpAddr::from([0, 0, 0, 0]))?,
            port: parse_or(&get, "PORT", 5000)?,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn chat_settings(&self) -> ChatSettings {
        ChatSettings {
            model: self.model.clone(),
            generation: GenerationConfig::new(self.max_tokens).with_temperature(self.temperature),
            pacing: PacingPolicy::new(self.stream_delay),
            history_turns: self.history_turns,
            institution: self.institution.clone(),
        }
    }
}

/// `GROQ_API_KEY_1..N` until the first gap, then a plain `GROQ_API_KEY`
fn collect_api_keys<G>(get: &G) -> Vec<String>
where
    G: Fn(&str) -> Option<String>,
{
    let mut keys: Vec<String> = (1..=MAX_NUMBERED_KEYS)
        .map_while(|n| get(&format!("GROQ_API_KEY_{}", n)))
        .map(|k| k.trim().to_string())
        .collect();

    if let Some(single) = get("GROQ_API_KEY") {
        let single = single.trim().to_string();
        if !keys.contains(&single) {
            keys.push(single);
        }
    }
    keys
}

fn parse_or<G, T>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match get(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[
            ("DATABASE_URL", "postgresql://localhost/helpdesk"),
            ("GROQ_API_KEY", "gsk_single"),
        ])
        .unwrap();

        assert_eq!(config.admin_password, "admin123");
        assert_eq!(config.api_keys, vec!["gsk_single"]);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, 1024);
        assert_eq!(config.stream_delay, Duration::from_millis(30));
        assert_eq!(config.history_turns, 10);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:5000");
        assert_eq!(config.db_pool_size, 10);
    }

    #[test]
    fn test_numbered_keys_stop_at_first_gap() {
        let config = config_from(&[
            ("DATABASE_URL", "postgresql://localhost/helpdesk"),
            ("GROQ_API_KEY_1", "gsk_one"),
            ("GROQ_API_KEY_2", "gsk_two"),
            ("GROQ_API_KEY_4", "gsk_four"),
        ])
        .unwrap();

        assert_eq!(config.api_keys, vec!["gsk_one", "gsk_two"]);
    }

    #[test]
    fn test_plain_key_is_not_duplicated() {
        let config = config_from(&[
            ("DATABASE_URL", "postgresql://localhost/helpdesk"),
            ("GROQ_API_KEY_1", "gsk_one"),
            ("GROQ_API_KEY", "gsk_one"),
        ])
        .unwrap();

        assert_eq!(config.api_keys, vec!["gsk_one"]);
    }

    #[test]
    fn test_missing_database_url() {
        let err = config_from(&[("GROQ_API_KEY", "gsk")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn test_no_api_keys() {
        let err = config_from(&[("DATABASE_URL", "postgresql://localhost/db")]).unwrap_err();
        assert_eq!(err, ConfigError::NoApiKeys);
    }

    #[test]
    fn test_invalid_number() {
        let err = config_from(&[
            ("DATABASE_URL", "postgresql://localhost/db"),
            ("GROQ_API_KEY", "gsk"),
            ("PORT", "eighty"),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "PORT",
                value: "eighty".to_string()
            }
        );
    }

    #[test]
    fn test_chat_settings() {
        let config = config_from(&[
            ("DATABASE_URL", "postgresql://localhost/db"),
            ("GROQ_API_KEY", "gsk"),
            ("STREAM_DELAY_MS", "0"),
            ("CHAT_TEMPERATURE", "0.2"),
            ("COLLEGE_NAME", "Example College"),
        ])
        .unwrap();

        let settings = config.chat_settings();
        assert!(settings.pacing.per_token.is_zero());
        assert_eq!(settings.generation.temperature, Some(0.2));
        assert_eq!(settings.institution, "Example College");
    }
}

//! Application configuration loaded from the environment

use std::net::SocketAddr;
use std::time::Duration;

use crate::agents::runtime::DEFAULT_MAX_TURNS;
use crate::infrastructure::llm::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// PostgreSQL connection string; the in-memory store is used when unset
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub max_turns: usize,
    pub llm_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL");
        if database_url.is_none() {
            tracing::warn!("DATABASE_URL not set, surveys are kept in memory");
        }

        let openai_api_key = get("OPENAI_API_KEY").unwrap_or_else(|| {
            tracing::warn!("OPENAI_API_KEY not set, model requests will be rejected");
            String::new()
        });

        Ok(Self {
            database_url,
            bind_addr: parse_or("BIND_ADDR", get("BIND_ADDR"), DEFAULT_BIND_ADDR)?,
            openai_api_key,
            openai_base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_turns: parse_or(
                "AGENT_MAX_TURNS",
                get("AGENT_MAX_TURNS"),
                &DEFAULT_MAX_TURNS.to_string(),
            )?,
            llm_timeout: Duration::from_secs(parse_or(
                "LLM_TIMEOUT_SECS",
                get("LLM_TIMEOUT_SECS"),
                &DEFAULT_LLM_TIMEOUT_SECS.to_string(),
            )?),
        })
    }
}

fn parse_or<T>(name: &'static str, value: Option<String>, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let value = value.unwrap_or_else(|| default.to_string());
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[]).unwrap();

        assert_eq!(config.database_url, None);
        assert_eq!(config.bind_addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.openai_base_url, "https://api.openai.com");
        assert_eq!(config.openai_model, "gpt-4o");
        assert_eq!(config.max_turns, 16);
        assert_eq!(config.llm_timeout, Duration::from_secs(120));
    }

    #[test]
    fn reads_values() {
        let config = config(&[
            ("DATABASE_URL", "postgres://localhost/surveys"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("AGENT_MAX_TURNS", "4"),
            ("LLM_TIMEOUT_SECS", "30"),
        ])
        .unwrap();

        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/surveys")
        );
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.openai_api_key, "sk-test");
        assert_eq!(config.openai_model, "gpt-4o-mini");
        assert_eq!(config.max_turns, 4);
        assert_eq!(config.llm_timeout, Duration::from_secs(30));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config(&[("DATABASE_URL", "  "), ("OPENAI_MODEL", "")]).unwrap();
        assert_eq!(config.database_url, None);
        assert_eq!(config.openai_model, "gpt-4o");
    }

    #[test]
    fn rejects_unparseable_numbers() {
        let err = config(&[("AGENT_MAX_TURNS", "many")]).unwrap_err();
        assert!(err.to_string().contains("AGENT_MAX_TURNS"));

        assert!(config(&[("BIND_ADDR", "not an address")]).is_err());
    }
}

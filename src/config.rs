//! Runtime configuration
//!
//! Read from the process environment (after `.env` is loaded by the
//! binaries). Every value has a default so an empty environment works.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::{FixedOffset, Offset, Utc};

use crate::error::{AssistantError, Result};
use crate::intent::ReplyDelay;
use crate::metrics::{DEFAULT_RECENT_LIMIT, DEFAULT_UPCOMING_WINDOW_DAYS};

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Base URL of the task service; tasks are read from `{url}/tasks/`
    pub tasks_api_url: Option<String>,
    pub api_token: Option<String>,
    /// JSON file with a task array, used when no API URL is set
    pub tasks_file: Option<PathBuf>,
    pub port: u16,
    /// Offset used to pick the greeting for the time of day
    pub utc_offset: FixedOffset,
    pub reply_delay: ReplyDelay,
    pub upcoming_window_days: i64,
    pub list_limit: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            tasks_api_url: None,
            api_token: None,
            tasks_file: None,
            port: DEFAULT_PORT,
            utc_offset: Utc.fix(),
            reply_delay: ReplyDelay::default(),
            upcoming_window_days: DEFAULT_UPCOMING_WINDOW_DAYS,
            list_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

impl AssistantConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let defaults = Self::default();

        let port = match get("PORT").or_else(|| get("API_PORT")) {
            Some(raw) => parse_value("PORT", &raw)?,
            None => defaults.port,
        };

        let utc_offset = match get("TASKFLOW_UTC_OFFSET_MINUTES") {
            Some(raw) => {
                let minutes: i32 = parse_value("TASKFLOW_UTC_OFFSET_MINUTES", &raw)?;
                minutes
                    .checked_mul(60)
                    .and_then(FixedOffset::east_opt)
                    .ok_or_else(|| {
                        AssistantError::Config(format!(
                            "TASKFLOW_UTC_OFFSET_MINUTES out of range: {}",
                            minutes
                        ))
                    })?
            }
            None => defaults.utc_offset,
        };

        let reply_delay = ReplyDelay {
            base_ms: optional("TASKFLOW_REPLY_BASE_MS", get("TASKFLOW_REPLY_BASE_MS"))?
                .unwrap_or(defaults.reply_delay.base_ms),
            jitter_ms: optional("TASKFLOW_REPLY_JITTER_MS", get("TASKFLOW_REPLY_JITTER_MS"))?
                .unwrap_or(defaults.reply_delay.jitter_ms),
        };

        let upcoming_window_days: i64 =
            optional("TASKFLOW_UPCOMING_DAYS", get("TASKFLOW_UPCOMING_DAYS"))?
                .unwrap_or(defaults.upcoming_window_days);
        if upcoming_window_days < 0 {
            return Err(AssistantError::Config(
                "TASKFLOW_UPCOMING_DAYS must not be negative".to_string(),
            ));
        }

        let list_limit: usize = optional("TASKFLOW_LIST_LIMIT", get("TASKFLOW_LIST_LIMIT"))?
            .unwrap_or(defaults.list_limit);

        Ok(Self {
            tasks_api_url: get("TASKFLOW_API_URL").map(|url| url.trim_end_matches('/').to_string()),
            api_token: get("TASKFLOW_API_TOKEN"),
            tasks_file: get("TASKFLOW_TASKS_FILE").map(PathBuf::from),
            port,
            utc_offset,
            reply_delay,
            upcoming_window_days,
            list_limit,
        })
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| AssistantError::Config(format!("invalid value for {}: {:?}", key, raw)))
}

fn optional<T: FromStr>(key: &str, raw: Option<String>) -> Result<Option<T>> {
    raw.map(|value| parse_value(key, &value)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let config = AssistantConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.reply_delay, ReplyDelay::default());
        assert_eq!(config.upcoming_window_days, 7);
        assert_eq!(config.list_limit, 5);
        assert_eq!(config.utc_offset.local_minus_utc(), 0);
        assert!(config.tasks_api_url.is_none());
    }

    #[test]
    fn test_values_are_read() {
        let config = AssistantConfig::from_lookup(lookup(&[
            ("API_PORT", "9090"),
            ("TASKFLOW_API_URL", "http://localhost:8000/api/"),
            ("TASKFLOW_API_TOKEN", "secret"),
            ("TASKFLOW_UTC_OFFSET_MINUTES", "-300"),
            ("TASKFLOW_REPLY_BASE_MS", "0"),
            ("TASKFLOW_REPLY_JITTER_MS", "0"),
            ("TASKFLOW_LIST_LIMIT", "3"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.tasks_api_url.as_deref(), Some("http://localhost:8000/api"));
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.utc_offset.local_minus_utc(), -300 * 60);
        assert_eq!(
            config.reply_delay,
            ReplyDelay {
                base_ms: 0,
                jitter_ms: 0
            }
        );
        assert_eq!(config.list_limit, 3);
    }

    #[test]
    fn test_port_takes_precedence_over_api_port() {
        let config = AssistantConfig::from_lookup(lookup(&[("PORT", "3000"), ("API_PORT", "9090")]))
            .unwrap();
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        for pairs in [
            [("PORT", "not-a-port")],
            [("TASKFLOW_UTC_OFFSET_MINUTES", "100000")],
            [("TASKFLOW_UPCOMING_DAYS", "-1")],
        ] {
            let err = AssistantConfig::from_lookup(lookup(&pairs)).unwrap_err();
            assert!(matches!(err, AssistantError::Config(_)));
        }
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let config = AssistantConfig::from_lookup(lookup(&[("TASKFLOW_API_URL", "  ")])).unwrap();
        assert!(config.tasks_api_url.is_none());
    }
}

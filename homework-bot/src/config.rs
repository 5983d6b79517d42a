use std::env;
use std::path::PathBuf;
use std::time::Duration;

use homework_core::{TimeCursor, DEFAULT_POLL_INTERVAL};
use thiserror::Error;

pub const DEFAULT_PRACTICUM_ENDPOINT: &str =
    "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Variables the bot refuses to start without, in reporting order.
pub const REQUIRED_VARS: [&str; 3] = ["PRACTICUM_TOKEN", "TELEGRAM_TOKEN", "TELEGRAM_CHAT_ID"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl ConfigError {
    /// One log line per problem, so each missing variable is reported on
    /// its own.
    pub fn report_lines(&self) -> Vec<String> {
        match self {
            ConfigError::Missing(names) => names
                .iter()
                .map(|name| format!("Missing required environment variable: {}", name))
                .collect(),
            ConfigError::Invalid { .. } => vec![self.to_string()],
        }
    }
}

#[derive(Clone)]
pub struct Config {
    /// OAuth token for the review API.
    pub practicum_token: String,
    pub telegram_token: String,
    /// Chat that receives every notification.
    pub telegram_chat_id: String,
    pub practicum_endpoint: String,
    pub telegram_api_base: String,
    /// Pause between poll cycles.
    pub retry_time: Duration,
    /// Explicit first `from_date`. Defaults to one poll interval before startup.
    pub from_date: Option<TimeCursor>,
    /// Per-request timeout applied by the HTTP clients.
    pub http_timeout: Duration,
    pub recording_enabled: bool,
    pub recording_log_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// Every missing required variable is reported, not just the first.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| non_blank(lookup(name));

        let missing: Vec<&'static str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|name| get(*name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(vec![name]));

        let retry_time = match get("RETRY_TIME") {
            Some(value) => Duration::from_secs(parse_positive_secs("RETRY_TIME", &value)?),
            None => DEFAULT_POLL_INTERVAL,
        };

        let from_date = get("FROM_DATE")
            .map(|value| {
                value
                    .trim()
                    .parse::<i64>()
                    .map(TimeCursor::new)
                    .map_err(|e| ConfigError::Invalid {
                        name: "FROM_DATE",
                        reason: e.to_string(),
                    })
            })
            .transpose()?;

        let http_timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(parse_positive_secs("HTTP_TIMEOUT_SECS", &value)?),
            None => DEFAULT_HTTP_TIMEOUT,
        };

        let recording_enabled = get("RECORDING_ENABLED")
            .and_then(|value| value.trim().parse::<bool>().ok())
            .unwrap_or(false);

        Ok(Config {
            practicum_token: required("PRACTICUM_TOKEN")?,
            telegram_token: required("TELEGRAM_TOKEN")?,
            telegram_chat_id: required("TELEGRAM_CHAT_ID")?,
            practicum_endpoint: get("PRACTICUM_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_PRACTICUM_ENDPOINT.to_string()),
            telegram_api_base: get("TELEGRAM_API_BASE")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
            retry_time,
            from_date,
            http_timeout,
            recording_enabled,
            recording_log_path: get("RECORDING_LOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("recordings.jsonl")),
        })
    }

    /// Cursor for the first poll.
    pub fn initial_cursor(&self, poll_interval: Duration) -> TimeCursor {
        self.from_date
            .unwrap_or_else(|| TimeCursor::now_minus(poll_interval))
    }
}

/// Log file path from `LOG_FILE`. Read before the rest of the configuration
/// so configuration errors reach the file too.
pub fn log_file_from_env() -> Option<PathBuf> {
    non_blank(env::var("LOG_FILE").ok()).map(PathBuf::from)
}

/// Treat empty and whitespace-only values as unset.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn parse_positive_secs(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            name,
            reason: "must be greater than zero".to_string(),
        }),
        Ok(secs) => Ok(secs),
        Err(e) => Err(ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
    }
}

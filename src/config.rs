use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::composer::ComposeMode;

/// Upper bound for `BATCH_SIZE`.
pub const MAX_BATCH_SIZE: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as boolean: {value}")]
    ParseBool { name: String, value: String },
}

/// OAuth 1.0a user-context credentials for the X API.
#[derive(Clone, PartialEq, Eq)]
pub struct XCredentials {
    pub api_key: String,
    pub api_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl fmt::Debug for XCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("access_token", &self.access_token)
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // X
    pub x_credentials: Option<XCredentials>,
    pub x_api_url: String,
    pub dry_run: bool,

    // News providers
    pub newsapi_key: String,
    pub newsapi_url: String,
    pub gnews_key: String,
    pub gnews_url: String,
    pub http_timeout: Duration,

    // Schedule
    pub post_interval: Duration,
    pub batch_size: usize,

    // Composition
    pub compose_mode: ComposeMode,
    pub discussion_prompt: Option<String>,

    // Publishing
    pub segment_delay: Duration,
    pub rate_limit_cooldown: Duration,
    pub rate_limit_min_wait: Duration,
    pub max_rate_limit_retries: u32,

    // Dedup
    pub dedup_capacity: Option<usize>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// X credentials are only required when `DRY_RUN` is off.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let dry_run = parse_env_bool("DRY_RUN", false)?;
        let x_credentials = if dry_run {
            load_credentials().ok()
        } else {
            Some(load_credentials()?)
        };

        Ok(Self {
            // X
            x_credentials,
            x_api_url: env_or_default("X_API_URL", "https://api.twitter.com"),
            dry_run,

            // News providers
            newsapi_key: required_env("NEWSAPI_KEY")?,
            newsapi_url: env_or_default("NEWSAPI_URL", "https://newsapi.org"),
            gnews_key: required_env("GNEWS_KEY")?,
            gnews_url: env_or_default("GNEWS_URL", "https://gnews.io"),
            http_timeout: Duration::from_secs(parse_env_u64("HTTP_TIMEOUT_SECS", 30)?),

            // Schedule
            post_interval: Duration::from_secs(parse_env_u64("POST_INTERVAL_SECS", 3600)?),
            batch_size: parse_env_usize("BATCH_SIZE", 1)?,

            // Composition
            compose_mode: parse_compose_mode(&env_or_default("COMPOSE_MODE", "summary"))?,
            discussion_prompt: optional_env("DISCUSSION_PROMPT"),

            // Publishing
            segment_delay: Duration::from_secs(parse_env_u64("SEGMENT_DELAY_SECS", 10)?),
            rate_limit_cooldown: Duration::from_secs(parse_env_u64(
                "RATE_LIMIT_COOLDOWN_SECS",
                900,
            )?),
            rate_limit_min_wait: Duration::from_secs(parse_env_u64(
                "RATE_LIMIT_MIN_WAIT_SECS",
                60,
            )?),
            max_rate_limit_retries: parse_env_u32("MAX_RATE_LIMIT_RETRIES", 3)?,

            // Dedup
            dedup_capacity: optional_env("DEDUP_CAPACITY")
                .map(|v| {
                    v.parse().map_err(|e| ConfigError::ParseInt {
                        name: "DEDUP_CAPACITY".to_string(),
                        source: e,
                    })
                })
                .transpose()?,
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.dry_run && self.x_credentials.is_none() {
            return Err(ConfigError::MissingEnvVar("X_API_KEY".to_string()));
        }
        if let Some(creds) = &self.x_credentials {
            for (name, value) in [
                ("X_API_KEY", &creds.api_key),
                ("X_API_SECRET", &creds.api_secret),
                ("X_ACCESS_TOKEN", &creds.access_token),
                ("X_ACCESS_TOKEN_SECRET", &creds.access_token_secret),
            ] {
                if value.is_empty() {
                    return Err(empty_value(name));
                }
            }
        }
        if self.newsapi_key.is_empty() {
            return Err(empty_value("NEWSAPI_KEY"));
        }
        if self.gnews_key.is_empty() {
            return Err(empty_value("GNEWS_KEY"));
        }
        for (name, value) in [
            ("X_API_URL", &self.x_api_url),
            ("NEWSAPI_URL", &self.newsapi_url),
            ("GNEWS_URL", &self.gnews_url),
        ] {
            validate_base_url(name, value)?;
        }
        if self.post_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "POST_INTERVAL_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::InvalidValue {
                name: "BATCH_SIZE".to_string(),
                message: format!("must be between 1 and {MAX_BATCH_SIZE}"),
            });
        }
        if self.dedup_capacity == Some(0) {
            return Err(ConfigError::InvalidValue {
                name: "DEDUP_CAPACITY".to_string(),
                message: "must be at least 1 when set".to_string(),
            });
        }
        Ok(())
    }

    /// Configuration with dummy credentials and no delays, for tests.
    #[doc(hidden)]
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            x_credentials: Some(XCredentials {
                api_key: "test-key".to_string(),
                api_secret: "test-secret".to_string(),
                access_token: "test-token".to_string(),
                access_token_secret: "test-token-secret".to_string(),
            }),
            x_api_url: "http://127.0.0.1:9".to_string(),
            dry_run: false,
            newsapi_key: "newsapi-test-key".to_string(),
            newsapi_url: "http://127.0.0.1:9".to_string(),
            gnews_key: "gnews-test-key".to_string(),
            gnews_url: "http://127.0.0.1:9".to_string(),
            http_timeout: Duration::from_secs(10),
            post_interval: Duration::from_secs(3600),
            batch_size: 1,
            compose_mode: ComposeMode::Summary,
            discussion_prompt: None,
            segment_delay: Duration::ZERO,
            rate_limit_cooldown: Duration::from_secs(900),
            rate_limit_min_wait: Duration::ZERO,
            max_rate_limit_retries: 3,
            dedup_capacity: None,
        }
    }
}

fn load_credentials() -> Result<XCredentials, ConfigError> {
    Ok(XCredentials {
        api_key: required_env("X_API_KEY")?,
        api_secret: required_env("X_API_SECRET")?,
        access_token: required_env("X_ACCESS_TOKEN")?,
        access_token_secret: required_env("X_ACCESS_TOKEN_SECRET")?,
    })
}

fn validate_base_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(value).map_err(|e| ConfigError::InvalidValue {
        name: name.to_string(),
        message: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            message: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    Ok(())
}

fn empty_value(name: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        message: "cannot be empty".to_string(),
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::ParseBool {
                name: name.to_string(),
                value: val,
            }),
        },
        _ => Ok(default),
    }
}

fn parse_compose_mode(value: &str) -> Result<ComposeMode, ConfigError> {
    match value.to_lowercase().as_str() {
        "summary" => Ok(ComposeMode::Summary),
        "thread" => Ok(ComposeMode::Thread),
        _ => Err(ConfigError::InvalidValue {
            name: "COMPOSE_MODE".to_string(),
            message: format!("must be 'summary' or 'thread', got '{value}'"),
        }),
    }
}

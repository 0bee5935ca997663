use std::{env, fmt::Display, fs::read_to_string, path::PathBuf, str::FromStr};

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

pub const APP_NAME: &str = "Nanotronics Survey";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DEFAULT_SECRET: &str = "dev-secret-key-change-in-production";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    Development,
    Testing,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" => Ok(Environment::Development),
            "testing" | "test" => Ok(Environment::Testing),
            other => Err(format!("unknown environment {other:?}")),
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Environment::Production => "production",
            Environment::Development => "development",
            Environment::Testing => "testing",
        };

        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl LogFormat {
    pub fn default_for(environment: Environment) -> Self {
        match environment {
            Environment::Production => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "text" => Ok(LogFormat::Text),
            other => Err(format!("unknown log format {other:?}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub max_requests: usize,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 100,
            window_secs: 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub secret_key: String,
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub log_level: String,
    pub log_format: LogFormat,
    pub rate_limit: RateLimitConfig,
    pub responses_dir: PathBuf,
    pub database_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            secret_key: DEFAULT_SECRET.to_string(),
            host: "0.0.0.0".to_string(),
            port: 5000,
            allowed_origins: vec!["*".to_string()],
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            rate_limit: RateLimitConfig::default(),
            responses_dir: PathBuf::from("responses"),
            database_url: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let environment = match var("APP_ENV") {
            Ok(value) => parse_environment("APP_ENV", &value),
            Err(()) => var("FLASK_ENV")
                .map(|value| parse_environment("FLASK_ENV", &value))
                .unwrap_or(Environment::Production),
        };

        Ok(Self {
            environment,
            secret_key: load_secret("SECRET_KEY", DEFAULT_SECRET),
            host: try_load("HOST", "0.0.0.0")?,
            port: try_load("PORT", "5000")?,
            allowed_origins: parse_origins(&try_load::<String>("ALLOWED_ORIGINS", "*")?),
            log_level: try_load::<String>("LOG_LEVEL", "info")?.to_lowercase(),
            log_format: var("LOG_FORMAT")
                .map(|value| parse_log_format(&value))
                .unwrap_or_else(|_| LogFormat::default_for(environment)),
            rate_limit: RateLimitConfig {
                enabled: try_load::<String>("RATE_LIMIT_ENABLED", "true")?.eq_ignore_ascii_case("true"),
                max_requests: try_load("RATE_LIMIT_REQUESTS", "100")?,
                window_secs: try_load("RATE_LIMIT_WINDOW", "60")?,
            },
            responses_dir: try_load("RESPONSES_DIR", "responses")?,
            database_url: var("DATABASE_URL")
                .ok()
                .and_then(|url| normalize_database_url(&url)),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|origin| origin == "*")
    }

    /// Warnings worth logging at startup. Never fatal.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.is_production() {
            if self.secret_key == DEFAULT_SECRET {
                warnings.push("SECRET_KEY is using default value in production!".to_string());
            }

            if self.allows_any_origin() {
                warnings.push("CORS is allowing all origins in production!".to_string());
            }
        }

        warnings
    }
}

/// Unknown names run as production.
fn parse_environment(key: &str, value: &str) -> Environment {
    value.parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value: {e}, using production");
        Environment::Production
    })
}

/// Anything other than `json` logs as text.
fn parse_log_format(value: &str) -> LogFormat {
    value.parse().unwrap_or_else(|e| {
        warn!("Invalid LOG_FORMAT value: {e}, using text");
        LogFormat::Text
    })
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        info!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");

            ConfigError::InvalidValue {
                key,
                reason: e.to_string(),
            }
        })
}

/// Environment first, then a mounted secret file, then the default.
fn load_secret(secret_name: &str, default: &str) -> String {
    if let Ok(value) = env::var(secret_name) {
        return value;
    }

    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|e| {
            info!("{secret_name} not found in env or {path} ({e}), using default");
            default.to_string()
        })
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

/// Drops blank values and rewrites the `postgresql://` scheme some providers hand out.
fn normalize_database_url(raw: &str) -> Option<String> {
    let url = raw.trim();

    if url.is_empty() {
        return None;
    }

    match url.strip_prefix("postgresql://") {
        Some(rest) => Some(format!("postgres://{rest}")),
        None => Some(url.to_string()),
    }
}

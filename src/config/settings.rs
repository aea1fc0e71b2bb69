//! Application settings and configuration
//!
//! Settings are read from the process environment (and an optional `.env`
//! file) exactly once at startup. Everything downstream receives them
//! explicitly, so tests build a `Settings` value directly instead of
//! mutating the environment.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::time::Duration;

/// Default Gemini REST endpoint
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used when `GEMINI_MODEL` is not set
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";

/// Origins of the local chat widget dev server
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://127.0.0.1:5173"];

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_UPSTREAM_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Application environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    #[value(alias = "dev")]
    Development,
    #[value(alias = "stage")]
    Staging,
    #[value(alias = "prod")]
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => anyhow::bail!(
                "Invalid environment: {}. Expected: development, staging, or production",
                s
            ),
        }
    }
}

/// Upstream provider settings
#[derive(Clone, Deserialize, Serialize)]
pub struct GeminiSettings {
    #[serde(skip_serializing)]
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

// Hand-written so the key never reaches a log line.
impl fmt::Debug for GeminiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiSettings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Main application settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    // App settings
    pub app_name: String,
    pub app_version: String,
    pub environment: Environment,
    pub log_level: String,

    // Server settings
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub body_limit_bytes: usize,

    // Upstream
    pub gemini: GeminiSettings,
    pub upstream_timeout_seconds: u64,

    /// Upper bound on in-flight upstream calls; `None` means unbounded
    pub max_concurrent_upstream: Option<usize>,
}

impl Settings {
    /// Build settings for the given credential with every other value at
    /// its default.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            app_name: "lesson-relay".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: Environment::Development,
            log_level: "info".to_string(),
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
            gemini: GeminiSettings {
                api_key: api_key.into(),
                model: DEFAULT_GEMINI_MODEL.to_string(),
                base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            },
            upstream_timeout_seconds: DEFAULT_UPSTREAM_TIMEOUT_SECONDS,
            max_concurrent_upstream: None,
        }
    }

    /// Load settings from environment variables with defaults
    ///
    /// Fails when `GEMINI_API_KEY` is missing: the relay is useless without
    /// a way to authenticate upstream, so it refuses to start.
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup. `load()` passes the process
    /// environment; tests pass a map.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let api_key = get("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .context("GEMINI_API_KEY environment variable is not set")?;

        let mut settings = Self::new(api_key);

        settings.app_name = or_default("APP_NAME", "lesson-relay");
        settings.environment = or_default("ENVIRONMENT", "development")
            .parse()
            .context("Invalid ENVIRONMENT value")?;
        settings.log_level = or_default("LOG_LEVEL", "info");

        settings.host = or_default("HOST", "0.0.0.0");
        settings.port = or_default("PORT", &DEFAULT_PORT.to_string())
            .parse()
            .context("Invalid PORT value")?;
        if let Some(origins) = get("ALLOWED_ORIGINS") {
            settings.allowed_origins = parse_origins(&origins);
        }
        settings.body_limit_bytes = or_default("BODY_LIMIT_BYTES", &DEFAULT_BODY_LIMIT_BYTES.to_string())
            .parse()
            .context("Invalid BODY_LIMIT_BYTES value")?;

        settings.gemini.model = or_default("GEMINI_MODEL", DEFAULT_GEMINI_MODEL);
        settings.gemini.base_url = or_default("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL);
        settings.upstream_timeout_seconds = or_default(
            "UPSTREAM_TIMEOUT_SECONDS",
            &DEFAULT_UPSTREAM_TIMEOUT_SECONDS.to_string(),
        )
        .parse()
        .context("Invalid UPSTREAM_TIMEOUT_SECONDS value")?;
        settings.max_concurrent_upstream = match get("MAX_CONCURRENT_UPSTREAM") {
            Some(raw) => Some(
                raw.parse()
                    .context("Invalid MAX_CONCURRENT_UPSTREAM value")?,
            ),
            None => None,
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Validate settings
    pub fn validate(&self) -> Result<()> {
        if self.gemini.api_key.trim().is_empty() {
            anyhow::bail!("Gemini API key cannot be empty");
        }

        if self.port == 0 {
            anyhow::bail!("Port cannot be 0");
        }

        if self.upstream_timeout_seconds == 0 {
            anyhow::bail!("Upstream timeout must be > 0");
        }

        if self.max_concurrent_upstream == Some(0) {
            anyhow::bail!("MAX_CONCURRENT_UPSTREAM must be > 0 when set");
        }

        Ok(())
    }

    /// Non-fatal configuration problems, logged once tracing is up
    pub fn warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if self.allowed_origins.is_empty() {
            warnings.push("No allowed origins configured; browsers will be refused cross-origin");
        }
        warnings
    }

    /// Maximum time to wait for the upstream provider
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_seconds)
    }

    /// Get the server address string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Split a comma separated origin list, dropping blanks
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

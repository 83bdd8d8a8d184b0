use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default; only malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub app_env: String,
    pub default_data_path: PathBuf,
    pub refs_data_path: PathBuf,
    pub ref_cookie_max_age: Duration,
    pub public_base_url: Option<String>,
    pub anthropic_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let max_age_days = optional_env("REF_COOKIE_MAX_AGE_DAYS")
            .unwrap_or_else(|| "365".to_string())
            .parse::<u64>()
            .context("REF_COOKIE_MAX_AGE_DAYS must be a whole number of days")?;

        Ok(Config {
            port: optional_env("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            app_env: optional_env("APP_ENV").unwrap_or_else(|| "development".to_string()),
            default_data_path: optional_env("DEFAULT_DATA_PATH")
                .unwrap_or_else(|| "data/default.json".to_string())
                .into(),
            refs_data_path: optional_env("REFS_DATA_PATH")
                .unwrap_or_else(|| "data/refs.json".to_string())
                .into(),
            ref_cookie_max_age: Duration::from_secs(max_age_days * 24 * 60 * 60),
            public_base_url: optional_env("PUBLIC_BASE_URL"),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
        })
    }

    /// Cookies are only marked `Secure` in production.
    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }
}

/// Reads an environment variable, treating an empty value as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

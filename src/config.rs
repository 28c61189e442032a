use anyhow::{Context, Result, anyhow};
use dotenvy::dotenv;
use std::{env, fmt::Display, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    MySql,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(StoreBackend::MySql),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow!("unknown store backend `{other}`")),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    /// Oldest GPS fix (seconds) accepted for a check-in or check-out
    pub location_max_age_secs: i64,

    pub log_dir: String,
    pub log_level: tracing::Level,

    pub store_backend: StoreBackend,
    pub seed_demo_users: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let store_backend: StoreBackend = parse_or("STORE_BACKEND", "mysql")?;
        let database_url = match store_backend {
            StoreBackend::MySql => Some(required("DATABASE_URL")?),
            StoreBackend::Memory => env::var("DATABASE_URL").ok(),
        };

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url,
            jwt_secret: required("JWT_SECRET")?,
            access_token_ttl: parse_or("ACCESS_TOKEN_TTL", "900")?, // 15 min
            refresh_token_ttl: parse_or("REFRESH_TOKEN_TTL", "604800")?, // 7 days

            rate_login_per_min: parse_or("RATE_LOGIN_PER_MIN", "60")?,
            rate_refresh_per_min: parse_or("RATE_REFRESH_PER_MIN", "30")?,
            rate_protected_per_min: parse_or("RATE_PROTECTED_PER_MIN", "1000")?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            location_max_age_secs: parse_or("LOCATION_MAX_AGE_SECS", "120")?,

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level: parse_or("LOG_LEVEL", "debug")?,

            store_backend,
            seed_demo_users: parse_or("SEED_DEMO_USERS", "false")?,
        })
    }
}

fn required(key: &str) -> Result<String> {
    let value = env::var(key).with_context(|| format!("{key} must be set"))?;
    if value.trim().is_empty() {
        return Err(anyhow!("{key} must not be empty"));
    }
    Ok(value)
}

fn parse_or<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .map_err(|e| anyhow!("invalid {key} value `{raw}`: {e}"))
}

#[cfg(test)]
impl Config {
    /// In-memory configuration used by handler tests.
    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            jwt_secret: "test-secret".to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            access_token_ttl: 900,
            refresh_token_ttl: 3600,
            rate_login_per_min: 600,
            rate_refresh_per_min: 600,
            rate_protected_per_min: 6000,
            api_prefix: "/api".to_string(),
            location_max_age_secs: 120,
            log_dir: "logs".to_string(),
            log_level: tracing::Level::DEBUG,
            store_backend: StoreBackend::Memory,
            seed_demo_users: false,
        }
    }
}

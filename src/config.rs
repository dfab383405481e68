//! Runtime configuration parsed from environment variables.

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_SWEEP_PERIOD_SECS: u64 = 15;
pub const DEFAULT_INACTIVITY_SECS: u64 = 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be greater than zero")]
    Zero { var: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    pub port: u16,
    /// PostgreSQL URL. `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    /// How often the eviction sweeper runs.
    pub sweep_period: Duration,
    /// How long a participant may go without a heartbeat before eviction.
    pub inactivity: Duration,
    /// Whether a successful send also counts as a heartbeat for the sender.
    pub send_refreshes_presence: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            sweep_period: Duration::from_secs(DEFAULT_SWEEP_PERIOD_SECS),
            inactivity: Duration::from_secs(DEFAULT_INACTIVITY_SECS),
            send_refreshes_presence: false,
        }
    }
}

impl ChatConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 5000
    /// - `DATABASE_URL`: in-memory store when absent
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `SWEEP_PERIOD_SECS`: default 15
    /// - `INACTIVITY_SECS`: default 10
    /// - `SEND_REFRESHES_PRESENCE`: default false
    ///
    /// # Errors
    ///
    /// Returns an error if the sweep period is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        let sweep_period_secs = env_parse("SWEEP_PERIOD_SECS", DEFAULT_SWEEP_PERIOD_SECS);
        if sweep_period_secs == 0 {
            return Err(ConfigError::Zero { var: "SWEEP_PERIOD_SECS" });
        }

        Ok(Self {
            port: env_parse("PORT", DEFAULT_PORT),
            database_url: std::env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty()),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            sweep_period: Duration::from_secs(sweep_period_secs),
            inactivity: Duration::from_secs(env_parse("INACTIVITY_SECS", DEFAULT_INACTIVITY_SECS)),
            send_refreshes_presence: env_bool("SEND_REFRESHES_PRESENCE").unwrap_or(false),
        })
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

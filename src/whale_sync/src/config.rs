//! Runtime configuration from the environment.

use chrono_tz::Tz;
use shared_utils::env::{ConfigError, get_env_var, get_optional_env_var, parse_env_var_or};
use sighting_source::FetcherConfig;

use crate::schedule::Schedule;

/// Source page ingested when no URL is given.
pub const DEFAULT_FEED_URL: &str = "https://newportwhales.com/whalecount.html";

/// Everything the CLI needs to run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// SQLite path or `sqlite:` URL (`DATABASE_URL`).
    pub database_url: String,
    /// Default source page (`WHALE_FEED_URL`).
    pub feed_url: String,
    /// HTTP settings (`WHALE_FETCH_TIMEOUT_SECS`, `WHALE_FETCH_REFERER`).
    pub fetcher: FetcherConfig,
    /// Daily run time (`WHALE_SCHEDULE_TZ`, `WHALE_SCHEDULE_HOUR`).
    pub schedule: Schedule,
}

impl SyncConfig {
    /// Loads the configuration. `DATABASE_URL` is required; the rest default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = get_env_var("DATABASE_URL")?;
        let feed_url = get_optional_env_var("WHALE_FEED_URL").unwrap_or_else(|| DEFAULT_FEED_URL.to_string());
        let fetcher = FetcherConfig::from_env()?;

        let defaults = Schedule::default();
        let tz: Tz = parse_env_var_or("WHALE_SCHEDULE_TZ", defaults.tz)?;
        let hour: u32 = parse_env_var_or("WHALE_SCHEDULE_HOUR", defaults.hour)?;
        if hour > 23 {
            return Err(ConfigError::InvalidEnvVar {
                name: "WHALE_SCHEDULE_HOUR".to_string(),
                value: hour.to_string(),
                reason: "hour must be between 0 and 23".to_string(),
            });
        }

        Ok(Self {
            database_url,
            feed_url,
            fetcher,
            schedule: Schedule { tz, hour },
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serial_test::serial;

    use super::*;

    const VARS: [&str; 6] = [
        "DATABASE_URL",
        "WHALE_FEED_URL",
        "WHALE_FETCH_TIMEOUT_SECS",
        "WHALE_FETCH_REFERER",
        "WHALE_SCHEDULE_TZ",
        "WHALE_SCHEDULE_HOUR",
    ];

    fn clear() {
        for v in VARS {
            unsafe { std::env::remove_var(v) };
        }
    }

    #[test]
    #[serial]
    fn defaults_apply() {
        clear();
        unsafe { std::env::set_var("DATABASE_URL", "sqlite://whales.db") };
        let cfg = SyncConfig::from_env().unwrap();
        assert_eq!(cfg.database_url, "sqlite://whales.db");
        assert_eq!(cfg.feed_url, DEFAULT_FEED_URL);
        assert_eq!(cfg.fetcher.timeout, Duration::from_secs(10));
        assert_eq!(cfg.schedule, Schedule::default());
        clear();
    }

    #[test]
    #[serial]
    fn overrides_are_read() {
        clear();
        unsafe {
            std::env::set_var("DATABASE_URL", "/tmp/w.db");
            std::env::set_var("WHALE_FEED_URL", "http://localhost:9/counts");
            std::env::set_var("WHALE_FETCH_TIMEOUT_SECS", "3");
            std::env::set_var("WHALE_SCHEDULE_TZ", "UTC");
            std::env::set_var("WHALE_SCHEDULE_HOUR", "6");
        }
        let cfg = SyncConfig::from_env().unwrap();
        assert_eq!(cfg.feed_url, "http://localhost:9/counts");
        assert_eq!(cfg.fetcher.timeout, Duration::from_secs(3));
        assert_eq!(cfg.schedule, Schedule { tz: chrono_tz::UTC, hour: 6 });
        clear();
    }

    #[test]
    #[serial]
    fn missing_database_url_is_an_error() {
        clear();
        assert!(matches!(SyncConfig::from_env(), Err(ConfigError::MissingEnvVar(n)) if n == "DATABASE_URL"));
    }

    #[test]
    #[serial]
    fn bad_values_are_rejected() {
        clear();
        unsafe {
            std::env::set_var("DATABASE_URL", "w.db");
            std::env::set_var("WHALE_SCHEDULE_HOUR", "24");
        }
        assert!(matches!(SyncConfig::from_env(), Err(ConfigError::InvalidEnvVar { name, .. }) if name == "WHALE_SCHEDULE_HOUR"));

        unsafe {
            std::env::set_var("WHALE_SCHEDULE_HOUR", "6");
            std::env::set_var("WHALE_SCHEDULE_TZ", "Mars/Olympus_Mons");
        }
        assert!(matches!(SyncConfig::from_env(), Err(ConfigError::InvalidEnvVar { name, .. }) if name == "WHALE_SCHEDULE_TZ"));
        clear();
    }
}

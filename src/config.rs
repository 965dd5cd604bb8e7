//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const MIN_SIGNING_KEY_LEN: usize = 32;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection string
    pub database_url: String,
    /// Server port
    pub port: u16,
    /// Directory holding uploaded avatar images
    pub upload_dir: PathBuf,
    /// Mark the session cookie `Secure` (set when served over HTTPS)
    pub cookie_secure: bool,
    /// How long a write waits for the SQLite lock before failing
    pub db_busy_timeout: Duration,
    /// HMAC key for session tokens (raw bytes)
    pub session_signing_key: Vec<u8>,
}

impl Config {
    /// Config for tests: in-memory database, throwaway key.
    pub fn test_default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            port: 8080,
            upload_dir: PathBuf::from("uploads/avatars"),
            cookie_secure: false,
            db_busy_timeout: Duration::from_secs(5),
            session_signing_key: b"test_session_key_32_bytes_minimum!".to_vec(),
        }
    }

    /// Load configuration from environment variables, reading `.env` first
    /// when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let session_signing_key = env::var("SESSION_SIGNING_KEY")
            .map_err(|_| ConfigError::Missing("SESSION_SIGNING_KEY"))?
            .into_bytes();
        if session_signing_key.len() < MIN_SIGNING_KEY_LEN {
            return Err(ConfigError::Invalid(
                "SESSION_SIGNING_KEY",
                format!("must be at least {MIN_SIGNING_KEY_LEN} bytes"),
            ));
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://coach-hub.db".to_string()),
            port: parse_var("PORT", 8080)?,
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads/avatars")),
            cookie_secure: parse_var("COOKIE_SECURE", false)?,
            db_busy_timeout: Duration::from_secs(parse_var("DB_BUSY_TIMEOUT_SECS", 5)?),
            session_signing_key,
        })
    }
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, format!("cannot parse {raw:?}"))),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env vars are process-wide, so everything touching them lives in one test.
    #[test]
    fn test_config_from_env() {
        env::set_var("SESSION_SIGNING_KEY", "short");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("SESSION_SIGNING_KEY", _))
        ));

        env::set_var("SESSION_SIGNING_KEY", "0123456789abcdef0123456789abcdef");
        env::set_var("PORT", "9090");
        env::set_var("DB_BUSY_TIMEOUT_SECS", "2");
        let config = Config::from_env().expect("Config should load");
        assert_eq!(config.port, 9090);
        assert_eq!(config.db_busy_timeout, Duration::from_secs(2));
        assert!(!config.cookie_secure);

        env::set_var("PORT", "not-a-port");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("PORT", _))
        ));

        env::remove_var("PORT");
        env::remove_var("DB_BUSY_TIMEOUT_SECS");
        env::remove_var("SESSION_SIGNING_KEY");
    }
}

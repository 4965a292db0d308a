//! Startup configuration for Rollcall.
//!
//! # Environment Variables
//!
//! Required:
//! - `BOT_TOKEN`: Telegram bot token from @BotFather
//! - `STORE_URI`: Store connection string (`memory://`, `file:///path` or
//!   `mongodb://host/db`). `MONGO_URI` is read when `STORE_URI` is unset.
//! - `MAIN_ADMIN_ID`: Numeric Telegram id of the root admin
//!
//! Optional:
//! - `ROLLCALL_STATE_DIR`: Override the base state directory (default `~/.rollcall`)

use std::fmt;
use std::num::ParseIntError;
use std::path::PathBuf;
use std::sync::OnceLock;

use rollcall_models::UserId;
use thiserror::Error;

/// Environment variable holding the bot token.
pub const BOT_TOKEN_ENV: &str = "BOT_TOKEN";

/// Environment variable holding the store connection string.
pub const STORE_URI_ENV: &str = "STORE_URI";

/// Fallback for [`STORE_URI_ENV`], the variable older deployments set.
pub const MONGO_URI_ENV: &str = "MONGO_URI";

/// Environment variable holding the root admin id.
pub const ROOT_ADMIN_ENV: &str = "MAIN_ADMIN_ID";

/// Environment variable for custom state directory.
pub const STATE_DIR_ENV: &str = "ROLLCALL_STATE_DIR";

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".rollcall";

static STATE_DIR_CACHE: OnceLock<PathBuf> = OnceLock::new();

/// Get the Rollcall state directory.
///
/// The state directory is determined by:
/// 1. `ROLLCALL_STATE_DIR` environment variable if set
/// 2. `~/.rollcall` if home directory is available
/// 3. `.rollcall` in current directory as fallback
pub fn state_dir() -> PathBuf {
    STATE_DIR_CACHE
        .get_or_init(|| {
            std::env::var(STATE_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    dirs::home_dir()
                        .map(|h| h.join(DEFAULT_STATE_DIR))
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
                })
        })
        .clone()
}

/// Path of the `.env` file loaded before the process environment is read.
pub fn env_file() -> PathBuf {
    state_dir().join(".env")
}

/// Errors raised while reading startup configuration. All are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("{0} is not set")]
    Missing(&'static str),

    /// The root admin id is not a number.
    #[error("MAIN_ADMIN_ID must be a numeric user id, got {value:?}")]
    InvalidRootAdmin {
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// Everything the bot needs before it can serve events.
#[derive(Clone)]
pub struct Config {
    pub bot_token: String,
    pub store_uri: String,
    pub root_admin: UserId,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bot_token", &"<redacted>")
            .field("store", &self.store_scheme())
            .field("root_admin", &self.root_admin)
            .finish()
    }
}

impl Config {
    /// Scheme of the store connection string. Safe to log, unlike the URI,
    /// which may carry database credentials.
    pub fn store_scheme(&self) -> &str {
        self.store_uri
            .split_once("://")
            .map_or(self.store_uri.as_str(), |(scheme, _)| scheme)
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let bot_token = required(BOT_TOKEN_ENV)?;
        let store_uri = required(STORE_URI_ENV)
            .or_else(|_| required(MONGO_URI_ENV))
            .map_err(|_| ConfigError::Missing(STORE_URI_ENV))?;
        let raw_admin = required(ROOT_ADMIN_ENV)?;
        let root_admin = raw_admin
            .parse::<UserId>()
            .map_err(|source| ConfigError::InvalidRootAdmin {
                value: raw_admin.clone(),
                source,
            })?;

        Ok(Self {
            bot_token,
            store_uri,
            root_admin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_reads_all_required_values() {
        let config = Config::from_lookup(lookup(&[
            (BOT_TOKEN_ENV, "123:abc"),
            (STORE_URI_ENV, "memory://"),
            (ROOT_ADMIN_ENV, " 42 "),
        ]))
        .unwrap();

        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.store_uri, "memory://");
        assert_eq!(config.root_admin, UserId(42));
    }

    #[test]
    fn test_missing_value_is_fatal() {
        let err = Config::from_lookup(lookup(&[
            (BOT_TOKEN_ENV, "123:abc"),
            (ROOT_ADMIN_ENV, "42"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(STORE_URI_ENV)));
    }

    #[test]
    fn test_mongo_uri_is_a_fallback() {
        let config = Config::from_lookup(lookup(&[
            (BOT_TOKEN_ENV, "123:abc"),
            (MONGO_URI_ENV, "mongodb://user:pw@db.local/attendance_db"),
            (ROOT_ADMIN_ENV, "42"),
        ]))
        .unwrap();
        assert_eq!(config.store_uri, "mongodb://user:pw@db.local/attendance_db");
        assert_eq!(config.store_scheme(), "mongodb");
        assert!(!format!("{:?}", config).contains("pw"));

        let config = Config::from_lookup(lookup(&[
            (BOT_TOKEN_ENV, "123:abc"),
            (STORE_URI_ENV, "memory://"),
            (MONGO_URI_ENV, "mongodb://db.local"),
            (ROOT_ADMIN_ENV, "42"),
        ]))
        .unwrap();
        assert_eq!(config.store_uri, "memory://");
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let err = Config::from_lookup(lookup(&[
            (BOT_TOKEN_ENV, "   "),
            (STORE_URI_ENV, "memory://"),
            (ROOT_ADMIN_ENV, "42"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(BOT_TOKEN_ENV)));
    }

    #[test]
    fn test_non_numeric_root_admin() {
        let err = Config::from_lookup(lookup(&[
            (BOT_TOKEN_ENV, "123:abc"),
            (STORE_URI_ENV, "memory://"),
            (ROOT_ADMIN_ENV, "admin"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRootAdmin { ref value, .. } if value == "admin"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = Config {
            bot_token: "secret-token".to_string(),
            store_uri: "memory://".to_string(),
            root_admin: UserId(1),
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("memory://"));
    }
}

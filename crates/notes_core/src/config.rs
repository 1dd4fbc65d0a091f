//! Process settings resolved once at startup.
//!
//! # Responsibility
//! - Resolve storage location, HTTP bind address and logging options from
//!   environment variables with documented defaults.
//!
//! # Invariants
//! - `Settings` is built once and passed explicitly; nothing here caches
//!   values in globals.
//! - Blank environment values behave as if unset.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Environment variable names.
pub mod env_vars {
    pub const DB_PATH: &str = "NOTES_DB_PATH";
    pub const APP_TITLE: &str = "APP_TITLE";
    pub const APP_DESCRIPTION: &str = "APP_DESCRIPTION";
    pub const APP_VERSION: &str = "APP_VERSION";
    pub const HOST: &str = "NOTES_HOST";
    pub const PORT: &str = "PORT";
    pub const LOG_LEVEL: &str = "NOTES_LOG_LEVEL";
    /// Directory for rolling log files. Logs go to stderr when unset.
    pub const LOG_DIR: &str = "NOTES_LOG_DIR";
}

/// Default values.
pub mod defaults {
    pub const DB_PATH: &str = "./data/notes.db";
    pub const APP_TITLE: &str = "Personal Notes Manager API";
    pub const APP_DESCRIPTION: &str =
        "A backend that manages personal notes with full CRUD over SQLite storage.";
    pub const APP_VERSION: &str = "1.0.0";
    pub const API_PREFIX: &str = "/api/v1";
    pub const HOST: &str = "0.0.0.0";
    pub const PORT: u16 = 8000;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value `{value}` for environment variable {key}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// SQLite database file. Parent directories are created on demand.
    pub db_path: PathBuf,
    pub app_title: String,
    pub app_description: String,
    pub app_version: String,
    /// Mount point for the notes routes, e.g. `/api/v1`.
    pub api_prefix: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(defaults::DB_PATH),
            app_title: defaults::APP_TITLE.to_string(),
            app_description: defaults::APP_DESCRIPTION.to_string(),
            app_version: defaults::APP_VERSION.to_string(),
            api_prefix: defaults::API_PREFIX.to_string(),
            host: defaults::HOST.to_string(),
            port: defaults::PORT,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl Settings {
    /// Resolves settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut settings = Self::default();
        if let Some(path) = get(env_vars::DB_PATH) {
            settings.db_path = PathBuf::from(path);
        }
        if let Some(title) = get(env_vars::APP_TITLE) {
            settings.app_title = title;
        }
        if let Some(description) = get(env_vars::APP_DESCRIPTION) {
            settings.app_description = description;
        }
        if let Some(version) = get(env_vars::APP_VERSION) {
            settings.app_version = version;
        }
        if let Some(host) = get(env_vars::HOST) {
            settings.host = host;
        }
        if let Some(raw) = get(env_vars::PORT) {
            settings.port = raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: env_vars::PORT,
                value: raw.clone(),
            })?;
        }
        if let Some(level) = get(env_vars::LOG_LEVEL) {
            settings.log_level = level;
        }
        settings.log_dir = get(env_vars::LOG_DIR).map(PathBuf::from);

        Ok(settings)
    }

    /// Returns the `host:port` pair the HTTP server binds to.
    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::{defaults, env_vars, ConfigError, Settings};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn settings_from(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let settings = settings_from(&[]).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.db_path, PathBuf::from(defaults::DB_PATH));
        assert_eq!(settings.api_prefix, "/api/v1");
        assert_eq!(settings.port, 8000);
        assert!(settings.log_dir.is_none());
    }

    #[test]
    fn environment_overrides_defaults() {
        let settings = settings_from(&[
            (env_vars::DB_PATH, "/var/lib/notes/notes.db"),
            (env_vars::PORT, "9090"),
            (env_vars::APP_TITLE, "My Notes"),
            (env_vars::LOG_DIR, "/var/log/notes"),
        ])
        .unwrap();
        assert_eq!(settings.db_path, PathBuf::from("/var/lib/notes/notes.db"));
        assert_eq!(settings.port, 9090);
        assert_eq!(settings.app_title, "My Notes");
        assert_eq!(settings.log_dir, Some(PathBuf::from("/var/log/notes")));
    }

    #[test]
    fn blank_values_are_treated_as_unset() {
        let settings = settings_from(&[(env_vars::DB_PATH, "   "), (env_vars::PORT, "")]).unwrap();
        assert_eq!(settings.db_path, PathBuf::from(defaults::DB_PATH));
        assert_eq!(settings.port, defaults::PORT);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = settings_from(&[(env_vars::PORT, "eighty")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: env_vars::PORT,
                value: "eighty".to_string(),
            }
        );
    }
}

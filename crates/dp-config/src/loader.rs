//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "davenport.toml",
    "config.toml",
    "./config/davenport.toml",
    "/etc/davenport/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        // Start with defaults
        let mut config = AppConfig::default();

        // Try to load from file
        if let Some(path) = self.find_config_file() {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        // Apply environment variable overrides
        self.apply_env_overrides(&mut config);
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(&self) -> Option<PathBuf> {
        // Check explicit path first
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
        }

        // Check DAVENPORT_CONFIG env var
        if let Ok(path) = env::var("DAVENPORT_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // Search standard paths
        for path in CONFIG_PATHS {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        None
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&self, config: &mut AppConfig) {
        // Database
        if let Ok(val) = env::var("DAVENPORT_DATABASE_URL") {
            config.database.url = val;
        }
        if let Ok(val) = env::var("DAVENPORT_DATABASE_MAX_CONNECTIONS") {
            if let Ok(connections) = val.parse() {
                config.database.max_connections = connections;
            }
        }

        // Principals
        if let Ok(val) = env::var("DAVENPORT_PRINCIPALS_TABLE") {
            config.principals.table = val;
        }
        if let Ok(val) = env::var("DAVENPORT_GROUP_MEMBERS_TABLE") {
            config.principals.group_members_table = val;
        }

        // Auth
        if let Ok(val) = env::var("DAVENPORT_USERS_TABLE") {
            config.auth.users_table = val;
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

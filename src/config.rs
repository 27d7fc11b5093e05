//! Configuration module
//!
//! Reads `AppConfig` from a TOML file. Every section has defaults, so a
//! missing key (or a missing section) falls back to the built-in value.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Where persisted collections live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackendKind,
    /// Directory holding one JSON file per collection (file backend only).
    pub data_dir: PathBuf,
    /// Poll interval for changes written by other processes; 0 disables it.
    pub watch_interval_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendKind::Memory,
            data_dir: default_data_dir(),
            watch_interval_ms: 1000,
        }
    }
}

/// Simulated round-trip delays, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
    pub login_ms: u64,
    pub register_ms: u64,
    pub delete_user_ms: u64,
    pub create_task_ms: u64,
    pub update_task_ms: u64,
    pub submit_task_ms: u64,
    pub send_message_ms: u64,
}

impl LatencyConfig {
    pub fn zero() -> Self {
        Self {
            login_ms: 0,
            register_ms: 0,
            delete_user_ms: 0,
            create_task_ms: 0,
            update_task_ms: 0,
            submit_task_ms: 0,
            send_message_ms: 0,
        }
    }
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            login_ms: 500,
            register_ms: 500,
            delete_user_ms: 300,
            create_task_ms: 300,
            update_task_ms: 300,
            submit_task_ms: 0,
            send_message_ms: 0,
        }
    }
}

/// Cheapest cost bcrypt accepts. Only for tests and throwaway sessions.
pub const MIN_BCRYPT_COST: u32 = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub bcrypt_cost: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// The administrator account that must always exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub admin_id: String,
    pub admin_name: String,
    pub admin_email: String,
    pub admin_password: String,
    pub admin_avatar: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            admin_id: "admin_1".to_string(),
            admin_name: "System Admin".to_string(),
            admin_email: "admin@admin.com".to_string(),
            admin_password: "admin".to_string(),
            admin_avatar: "https://ui-avatars.com/api/?name=Admin&background=0D8ABC&color=fff"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub latency: LatencyConfig,
    pub security: SecurityConfig,
    pub seed: SeedConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Settings for tests and throwaway sessions: in-memory storage,
    /// no simulated latency, cheapest bcrypt cost.
    pub fn ephemeral() -> Self {
        Self {
            storage: StorageConfig {
                backend: StorageBackendKind::Memory,
                watch_interval_ms: 0,
                ..StorageConfig::default()
            },
            latency: LatencyConfig::zero(),
            security: SecurityConfig {
                bcrypt_cost: MIN_BCRYPT_COST,
            },
            ..Self::default()
        }
    }
}

/// `~/.config/taskdesk/config.toml`, or `$TASKDESK_CONFIG` when set.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var("TASKDESK_CONFIG") {
        return PathBuf::from(path);
    }
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskdesk")
        .join("config.toml")
}

fn default_data_dir() -> PathBuf {
    dirs_next::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskdesk")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            [storage]
            backend = "file"
            data_dir = "/tmp/desk"

            [latency]
            login_ms = 10
            "#,
        )
        .unwrap();

        assert_eq!(cfg.storage.backend, StorageBackendKind::File);
        assert_eq!(cfg.storage.data_dir, PathBuf::from("/tmp/desk"));
        assert_eq!(cfg.storage.watch_interval_ms, 1000);
        assert_eq!(cfg.latency.login_ms, 10);
        assert_eq!(cfg.latency.register_ms, 500);
        assert_eq!(cfg.seed.admin_email, "admin@admin.com");
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn ephemeral_cost_is_accepted_by_bcrypt() {
        let cfg = AppConfig::ephemeral();
        assert_eq!(cfg.security.bcrypt_cost, MIN_BCRYPT_COST);
        let hashed = bcrypt::hash("pw", cfg.security.bcrypt_cost).unwrap();
        assert!(bcrypt::verify("pw", &hashed).unwrap());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.storage.backend, StorageBackendKind::Memory);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[storage\nbackend = ").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Parse { .. })));
    }
}

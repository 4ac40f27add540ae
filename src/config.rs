use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub rules: RulesConfig,
    pub data: DataConfig,
    pub logging: LoggingConfig,
}

/// Tunable rules values. The point-buy budget and cost table are fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Money available for starting purchases.
    pub starting_money: f64,
    /// Carrying capacity in spaces before strength.
    pub carry_base: i32,
    /// Extra spaces per point of strength.
    pub carry_per_strength: i32,
    /// Space taken by a placeholder for equipment missing from the catalog.
    pub placeholder_space: f64,
}

/// Data directory configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Override the default data directory.
    pub data_dir: Option<PathBuf>,
    /// JSON catalog to use instead of the built-in one.
    pub catalog_path: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    /// Also write JSON logs to `<data_dir>/logs`.
    pub file: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            starting_money: 100.0,
            carry_base: 10,
            carry_per_strength: 2,
            placeholder_space: 0.5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from `~/.config/charforge/config.toml`.
    /// Returns `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Self {
        match std::fs::read_to_string(config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    log::warn!(
                        "Failed to parse config at {}: {e} - using defaults",
                        config_path.display()
                    );
                    Self::default()
                }
            },
            Err(_) => {
                log::debug!(
                    "No config file at {} - using defaults",
                    config_path.display()
                );
                Self::default()
            }
        }
    }

    /// Resolved data directory (override or XDG default).
    pub fn data_dir(&self) -> PathBuf {
        self.data.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("charforge"))
                .unwrap_or_else(|| PathBuf::from("data"))
        })
    }

    /// Directory holding in-progress wizard snapshots.
    pub fn drafts_dir(&self) -> PathBuf {
        self.data_dir().join("drafts")
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("charforge").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}

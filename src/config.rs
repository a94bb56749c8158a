//! Configuration for ffox-remote
//!
//! Loads configuration from TOML file at `~/.config/ffox-remote/config.toml`
//! Auto-generates default config file on first run if missing.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub protocol: ProtocolConfig,
    pub target: TargetConfig,
}

impl Config {
    /// Load configuration from the default location, generating it if missing
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!("Config file not found at {:?}, using defaults", config_path);
            if let Err(e) = Self::save_default(&config_path) {
                warn!("Failed to create default config file: {}", e);
            }
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;

        debug!("Configuration loaded from {:?}: {:?}", path, config);
        Ok(config)
    }

    /// Get the path to the config file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("ffox-remote");

        Ok(config_dir.join("config.toml"))
    }

    /// Save default configuration to file
    fn save_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default config")?;

        fs::write(path, toml_string)
            .context("Failed to write default config file")?;

        info!("Created default config file at {:?}", path);
        Ok(())
    }
}

/// Remote protocol configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Property name prefix, e.g. "_MOZILLA" gives "_MOZILLA_LOCK"
    pub prefix: String,
    /// Which forms of profile path matching to accept
    pub profile_suffix: ProfileSuffix,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            prefix: "_MOZILLA".to_string(),
            profile_suffix: ProfileSuffix::Both,
        }
    }
}

/// How a bare profile name may match a profile property holding a path.
///
/// Older targets stored `<dir>/<salt>.<name>` and were matched on the dot
/// suffix; newer ones may be matched on the whole last path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileSuffix {
    /// Exact string equality only
    Exact,
    /// Path ends with `.` + name
    Dot,
    /// Path ends with `/` + name
    Path,
    /// Either of the above
    Both,
}

/// Default window match criteria (empty = match anything)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub user: String,
    pub profile: String,
    pub program: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            user: String::new(),
            profile: "default".to_string(),
            program: "firefox".to_string(),
        }
    }
}

/// The window property names used by the protocol, one field per property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyNames {
    pub version: String,
    pub user: String,
    pub profile: String,
    pub program: String,
    pub lock: String,
    pub command_line: String,
    pub response: String,
}

impl PropertyNames {
    pub fn with_prefix(prefix: &str) -> Self {
        let name = |suffix: &str| format!("{}_{}", prefix, suffix);
        Self {
            version: name("VERSION"),
            user: name("USER"),
            profile: name("PROFILE"),
            program: name("PROGRAM"),
            lock: name("LOCK"),
            command_line: name("COMMANDLINE"),
            response: name("RESPONSE"),
        }
    }
}

impl Default for PropertyNames {
    fn default() -> Self {
        Self::with_prefix(&ProtocolConfig::default().prefix)
    }
}

//! Configuration loading and path resolution
//!
//! Resolution priority for the configuration file:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable `WGT_CONFIG`
//! 3. User config file (`<config_dir>/wgt/wgt-import.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A file named explicitly (1 or 2) must exist and parse. A missing user
//! config file is not an error: the compiled defaults are used and a warning
//! is logged.

use crate::puzzle::default_anchor_date;
use crate::types::PlayerId;
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "WGT_CONFIG";

/// Environment variable naming the SQLite database file
pub const DATABASE_ENV_VAR: &str = "WGT_DATABASE";

/// Config file name inside the per-user `wgt` config directory
pub const CONFIG_FILE_NAME: &str = "wgt-import.toml";

/// Database file name inside the per-user `wgt` data directory
pub const DATABASE_FILE_NAME: &str = "wgt.db";

/// TOML configuration file contents
///
/// Every field has a default so partial files are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Date of puzzle #1, written as a quoted string (`"2021-06-19"`)
    pub anchor_date: NaiveDate,

    /// SQLite database path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    pub logging: LoggingConfig,

    /// Ordered alias table (`[[alias]]` entries); earlier entries win
    #[serde(rename = "alias")]
    pub aliases: Vec<AliasEntry>,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            anchor_date: default_anchor_date(),
            database: None,
            logging: LoggingConfig::default(),
            aliases: Vec::new(),
        }
    }
}

impl TomlConfig {
    /// Load and parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        let config = Self::parse(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
        config
            .validate()
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Reject alias entries that could never resolve a sender sensibly
    ///
    /// An empty `full_name` is contained in every sender name.
    pub fn validate(&self) -> Result<()> {
        for (index, alias) in self.aliases.iter().enumerate() {
            if alias.full_name.trim().is_empty() {
                return Err(Error::Config(format!(
                    "alias #{} (player {:?}) has an empty full_name",
                    index + 1,
                    alias.player.as_str()
                )));
            }
            if alias.player.as_str().trim().is_empty() {
                return Err(Error::Config(format!(
                    "alias #{} ({:?}) has an empty player",
                    index + 1,
                    alias.full_name
                )));
            }
        }
        Ok(())
    }

    /// Parse config from TOML text
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Starter configuration written by `init-config`
    pub fn example() -> Self {
        Self {
            aliases: vec![
                AliasEntry {
                    full_name: "Jane Doe".to_string(),
                    player: PlayerId::new("jane"),
                    display_name: Some("Jane".to_string()),
                },
                AliasEntry {
                    full_name: "Sam".to_string(),
                    player: PlayerId::new("sam"),
                    display_name: None,
                },
            ],
            ..Self::default()
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// One row of the alias table: a chat display name mapped to a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    /// Full display name as it appears in the chat export
    pub full_name: String,
    /// Canonical player identifier (store username)
    pub player: PlayerId,
    /// Friendly name used when seeding the player into the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    UserFile(PathBuf),
    CompiledDefaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CommandLine(p) => write!(f, "command line ({})", p.display()),
            ConfigSource::Environment(p) => write!(f, "{} ({})", CONFIG_ENV_VAR, p.display()),
            ConfigSource::UserFile(p) => write!(f, "user config ({})", p.display()),
            ConfigSource::CompiledDefaults => write!(f, "compiled defaults"),
        }
    }
}

/// Load configuration following the priority order in the module docs
pub fn load_config(cli_arg: Option<&Path>) -> Result<(TomlConfig, ConfigSource)> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        let config = TomlConfig::load(path)?;
        return Ok((config, ConfigSource::CommandLine(path.to_path_buf())));
    }

    // Priority 2: Environment variable
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
        let path = PathBuf::from(path);
        let config = TomlConfig::load(&path)?;
        return Ok((config, ConfigSource::Environment(path)));
    }

    // Priority 3: User config file
    if let Some(path) = default_config_path() {
        if path.exists() {
            let config = TomlConfig::load(&path)?;
            return Ok((config, ConfigSource::UserFile(path)));
        }
        warn!("No config file at {}, using compiled defaults", path.display());
    } else {
        warn!("Could not determine config directory, using compiled defaults");
    }

    // Priority 4: Compiled defaults
    Ok((TomlConfig::default(), ConfigSource::CompiledDefaults))
}

/// Resolve the SQLite database path
///
/// Priority: command-line argument, `WGT_DATABASE`, TOML `database`,
/// then `<data_local_dir>/wgt/wgt.db`.
pub fn resolve_database_path(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Some(path) = std::env::var_os(DATABASE_ENV_VAR).filter(|v| !v.is_empty()) {
        return PathBuf::from(path);
    }

    if let Some(path) = &config.database {
        return path.clone();
    }

    default_database_path()
}

/// Per-user config file location, if the platform has a config directory
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("wgt").join(CONFIG_FILE_NAME))
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("wgt"))
        .unwrap_or_else(|| PathBuf::from("./wgt_data"))
        .join(DATABASE_FILE_NAME)
}

/// Write a config file atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, path)?;

    info!("Wrote config file: {}", path.display());
    Ok(())
}

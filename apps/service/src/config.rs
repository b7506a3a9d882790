use std::{env, fmt, fs, path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Read(#[source] std::io::Error),
    #[error("could not write config file: {0}")]
    Write(#[source] std::io::Error),
    #[error("could not parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("no config path available (set XDG_CONFIG_HOME or HOME)")]
    PathUnavailable,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub worker: WorkerConfig,
    pub storage: StorageConfig,
    pub twilio: TwilioConfig,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Seconds between scan cycles.
    pub scan_interval_seconds: u64,
    /// Seconds between log-archive cycles.
    pub archive_interval_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: path::PathBuf,
    pub logs_dir: path::PathBuf,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_phone: String,
    /// Dialing prefix prepended to the 8-digit user phone numbers.
    pub country_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            worker: WorkerConfig::default(),
            storage: StorageConfig::default(),
            twilio: TwilioConfig::default(),
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { scan_interval_seconds: 60, archive_interval_seconds: 86_400 }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: ".data".into(), logs_dir: ".logs".into() }
    }
}

impl Default for TwilioConfig {
    fn default() -> Self {
        Self {
            account_sid: String::new(),
            auth_token: String::new(),
            from_phone: String::new(),
            country_prefix: "+961".into(),
        }
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/upwatch/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, ConfigError> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(ConfigError::PathUnavailable);
    };

    Ok(path.join("upwatch/config.toml"))
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Current Internal Configuration State:")?;
        writeln!(f, "  Worker")?;
        writeln!(f, "    Scan Interval: {}s", self.worker.scan_interval_seconds)?;
        writeln!(f, "    Archive Interval: {}s", self.worker.archive_interval_seconds)?;
        writeln!(f, "  Storage")?;
        writeln!(f, "    Data Dir: {}", self.storage.data_dir.display())?;
        writeln!(f, "    Logs Dir: {}", self.storage.logs_dir.display())?;
        writeln!(f, "  Twilio")?;
        writeln!(f, "    From Phone: {}", self.twilio.from_phone)?;
        writeln!(f, "    Country Prefix: {}", self.twilio.country_prefix)?;

        Ok(())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/upwatch/config.toml
    /// or the specified path, with the name config.toml if one does not exist
    pub fn from_config(
        optional_path: Option<impl AsRef<path::Path>>,
    ) -> Result<Self, ConfigError> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path).map_err(ConfigError::Read)?;
            Ok(toml::from_str(raw_string.as_str())?)
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            Ok(config)
        }
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), ConfigError> {
        let config_str: String = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::Write)?;
        }

        fs::write(path, config_str).map_err(ConfigError::Write)
    }
}

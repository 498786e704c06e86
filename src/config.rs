//! User configuration and on-disk locations.
//!
//! Nothing about the binder itself is saved between sessions. The data
//! directory only holds an optional `config.toml`, the log file, and the
//! scratch folder used to hand exported files to an external viewer.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use serde::Deserialize;

use crate::seed::{default_items, SeedItem};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".trip-binder";
const CONFIG_FILE_NAME: &str = "config.toml";
const LOG_FILE_NAME: &str = "trip-binder.log";
/// Exported content references are written here before being opened.
const VIEWING_DIR_NAME: &str = "open";

const DEFAULT_SUBTITLE: &str = "Trip to N.Y.";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Settings read from `config.toml`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Trip name shown under the app title; editable during the session.
    pub subtitle: String,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Replaces the built-in starter items when present.
    pub items: Option<Vec<SeedItem>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            subtitle: DEFAULT_SUBTITLE.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            items: None,
        }
    }
}

impl Config {
    /// Read the config file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => {
                Self::parse(&text).with_context(|| format!("invalid config in {}", path.display()))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => {
                Err(err).with_context(|| format!("failed to read config {}", path.display()))
            }
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("failed to parse config")
    }

    /// Items to seed the store with on launch.
    pub fn starter_items(&self) -> Vec<SeedItem> {
        self.items.clone().unwrap_or_else(default_items)
    }
}

/// Resolved locations inside the application data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub data_dir: PathBuf,
    pub config_file: PathBuf,
    pub log_file: PathBuf,
    pub viewing_dir: PathBuf,
}

impl Paths {
    /// Locate the data directory inside the user's home.
    pub fn resolve() -> Result<Self> {
        let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
        Ok(Self::under(base_dirs.home_dir().join(DATA_DIR_NAME)))
    }

    /// Lay out the standard files beneath `data_dir`.
    pub fn under(data_dir: PathBuf) -> Self {
        Self {
            config_file: data_dir.join(CONFIG_FILE_NAME),
            log_file: data_dir.join(LOG_FILE_NAME),
            viewing_dir: data_dir.join(VIEWING_DIR_NAME),
            data_dir,
        }
    }

    /// Create the data directory if needed.
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir).context("failed to create data directory")
    }

    /// Delete whatever an earlier session left in the viewing folder.
    pub fn clear_viewing_dir(&self) -> Result<()> {
        match fs::remove_dir_all(&self.viewing_dir) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| {
                format!("failed to clear {}", self.viewing_dir.display())
            }),
        }
    }
}

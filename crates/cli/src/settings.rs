use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::Context;
use liftlog_domain::DayAnchor;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "liftlog";
const SETTINGS_FILE: &str = "settings.json";
const STORE_FILE: &str = "liftlog.json";

pub const STORE_VAR: &str = "LIFTLOG_STORE";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub store: PathBuf,
    #[serde(with = "DayAnchorDef")]
    pub day_anchor: DayAnchor,
    #[serde(with = "LevelFilterDef")]
    pub log_level: LevelFilter,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store: dirs::data_dir()
                .map(|dir| dir.join(APP_NAME).join(STORE_FILE))
                .unwrap_or_else(|| PathBuf::from(STORE_FILE)),
            day_anchor: DayAnchor::default(),
            log_level: LevelFilter::Warn,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(remote = "DayAnchor", rename_all = "snake_case")]
enum DayAnchorDef {
    Created,
    Updated,
}

#[derive(Serialize, Deserialize)]
#[serde(remote = "LevelFilter", rename_all = "snake_case")]
enum LevelFilterDef {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Settings {
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(SETTINGS_FILE))
    }

    /// Reads the settings file. A missing file results in the default settings.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("failed to parse {}", path.display())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    /// Applies the environment and the command line on top of the loaded settings.
    #[must_use]
    pub fn with_overrides(
        mut self,
        store_var: Option<PathBuf>,
        store_arg: Option<PathBuf>,
        verbosity: u8,
    ) -> Self {
        if let Some(store) = store_arg.or(store_var) {
            self.store = store;
        }
        self.log_level = match verbosity {
            0 => self.log_level,
            1 => self.log_level.max(LevelFilter::Info),
            2 => self.log_level.max(LevelFilter::Debug),
            _ => LevelFilter::Trace,
        };
        self
    }
}

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::RacewatchError;

const CONFIG_DIR_NAME: &str = "racewatch";
const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_CATEGORIES: [&str; 5] = ["SKIDPAD", "ACCELERATION", "AUTOX", "ENDURANCE", "TEST"];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the session store, e.g. `https://my-project.firebaseio.com`
    pub store_url: String,
    pub snapshot_ttl_ms: u64,
    pub live_tick_ms: u64,
    pub ended_display_ms: u64,
    pub request_timeout_ms: u64,
    /// Categories always listed in the navigation, in this order
    pub categories: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_url: String::new(),
            snapshot_ttl_ms: 5000,
            live_tick_ms: 1000,
            ended_display_ms: 3000,
            request_timeout_ms: 10_000,
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Result<PathBuf, RacewatchError> {
        Ok(dirs::config_dir()
            .ok_or(RacewatchError::NoConfigDir)?
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    }

    /// Load the config saved in the user's config directory, if any. A config file that cannot be
    /// read is reported and ignored.
    pub fn from_local_file() -> Option<Self> {
        let config_path = Self::default_path().ok()?;
        if !config_path.exists() {
            return None;
        }
        Self::from_path(&config_path)
            .map_err(|e| warn!("Ignoring config file {:?}: {}", config_path, e))
            .ok()
    }

    pub fn from_path(path: &Path) -> Result<Self, RacewatchError> {
        let file =
            std::fs::File::open(path).map_err(|e| RacewatchError::ConfigIOError { source: e })?;
        serde_json::from_reader(file).map_err(|e| RacewatchError::ConfigSerializeError { source: e })
    }

    pub fn save(&self) -> Result<(), RacewatchError> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), RacewatchError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| RacewatchError::ConfigIOError { source: e })?;
        }
        let file = std::fs::File::create(path)
            .map_err(|e| RacewatchError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| RacewatchError::ConfigSerializeError { source: e })
    }

    /// Copy of this config with the refresh settings given on the command line. The copy is only
    /// used for the current run, the config saved on exit keeps its own values.
    pub fn with_overrides(&self, snapshot_ttl_ms: Option<u64>, live_tick_ms: Option<u64>) -> Self {
        Self {
            snapshot_ttl_ms: snapshot_ttl_ms.unwrap_or(self.snapshot_ttl_ms),
            live_tick_ms: live_tick_ms.unwrap_or(self.live_tick_ms),
            ..self.clone()
        }
    }

    pub fn snapshot_ttl(&self) -> Duration {
        Duration::from_millis(self.snapshot_ttl_ms)
    }

    pub fn live_tick(&self) -> Duration {
        Duration::from_millis(self.live_tick_ms)
    }

    pub fn ended_display(&self) -> Duration {
        Duration::from_millis(self.ended_display_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

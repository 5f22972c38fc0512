//! Engine configuration.
//!
//! Settings load from `~/.ensemble/ensemble.toml` when present, then
//! environment variables override individual values. Everything has a
//! working default, so a missing file is not an error.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{elog_debug, elog_warn, Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Minimum reviewer score for a complex task to pass without a
    /// collaboration round. In `[0.0, 1.0]`.
    #[serde(default = "default_consensus_threshold")]
    pub consensus_threshold: f64,

    /// Ceiling on sub-tasks accepted from one decomposition; excess
    /// descriptors are dropped with a warning.
    #[serde(default = "default_max_sub_tasks")]
    pub max_sub_tasks: usize,

    /// Upper bound on workers pulled into one collaboration round.
    #[serde(default = "default_max_collaborators")]
    pub max_collaborators: usize,

    /// Forced cutoff for a single executor call, in seconds.
    #[serde(default = "default_task_timeout_secs")]
    pub task_timeout_secs: u64,
}

fn default_consensus_threshold() -> f64 {
    0.7
}

fn default_max_sub_tasks() -> usize {
    10
}

fn default_max_collaborators() -> usize {
    3
}

fn default_task_timeout_secs() -> u64 {
    300
}

impl Default for Config {
    fn default() -> Self {
        Self {
            consensus_threshold: default_consensus_threshold(),
            max_sub_tasks: default_max_sub_tasks(),
            max_collaborators: default_max_collaborators(),
            task_timeout_secs: default_task_timeout_secs(),
        }
    }
}

impl Config {
    pub fn ensemble_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".ensemble"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::ensemble_dir()?.join("ensemble.toml"))
    }

    /// Load from the default path, falling back to defaults when the file
    /// does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        elog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            elog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        elog_debug!(
            "Config loaded: threshold={}, max_sub_tasks={}, timeout={}s",
            config.consensus_threshold,
            config.max_sub_tasks,
            config.task_timeout_secs
        );
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let dir = Self::ensemble_dir()?;
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        fs::write(path, toml::to_string_pretty(self)?)?;
        elog_debug!("Config saved to {}", path.display());
        Ok(())
    }

    /// Apply `ENSEMBLE_*` environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_env_overrides(|name| std::env::var(name).ok());
    }

    /// Override values from a variable lookup. Unparseable values are
    /// ignored with a warning rather than failing startup.
    pub fn apply_env_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = get("ENSEMBLE_CONSENSUS_THRESHOLD") {
            match raw.parse() {
                Ok(v) => self.consensus_threshold = v,
                Err(_) => elog_warn!("ignoring ENSEMBLE_CONSENSUS_THRESHOLD={:?}", raw),
            }
        }
        if let Some(raw) = get("ENSEMBLE_MAX_SUB_TASKS") {
            match raw.parse() {
                Ok(v) => self.max_sub_tasks = v,
                Err(_) => elog_warn!("ignoring ENSEMBLE_MAX_SUB_TASKS={:?}", raw),
            }
        }
        if let Some(raw) = get("ENSEMBLE_TASK_TIMEOUT") {
            match raw.parse() {
                Ok(v) => self.task_timeout_secs = v,
                Err(_) => elog_warn!("ignoring ENSEMBLE_TASK_TIMEOUT={:?}", raw),
            }
        }
    }

    /// Reject configurations the engine cannot run with. A short timeout
    /// is legal but warned about, since real executor calls rarely finish
    /// that fast.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.consensus_threshold) {
            return Err(Error::Config(format!(
                "consensus_threshold must be in [0.0, 1.0], got {}",
                self.consensus_threshold
            )));
        }
        if self.max_sub_tasks < 1 {
            return Err(Error::Config("max_sub_tasks must be at least 1".to_string()));
        }
        if self.max_collaborators < 1 {
            return Err(Error::Config(
                "max_collaborators must be at least 1".to_string(),
            ));
        }
        if self.task_timeout_secs == 0 {
            return Err(Error::Config("task_timeout_secs must be nonzero".to_string()));
        }
        if self.task_timeout_secs < 30 {
            elog_warn!(
                "task_timeout_secs={} is very low; executor calls may be cut off",
                self.task_timeout_secs
            );
        }
        Ok(())
    }

    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }
}

use std::fs;
use std::path::Path;
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::model::Difficulty;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GeneratorSettings {
    #[serde(default = "default_version")]
    version: u32,

    #[serde(default)]
    pub difficulty: Difficulty,

    /// Attempts with a fresh solution before giving up.
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    #[serde(default = "default_solver_timeout_ms")]
    pub solver_timeout_ms: u64,

    /// Clues added per step while searching for uniqueness.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default)]
    pub seed: Option<u64>,
}

// Helper functions for default values
fn default_version() -> u32 {
    2
}
fn default_max_retries() -> usize {
    10
}
fn default_solver_timeout_ms() -> u64 {
    10_000
}
fn default_batch_size() -> usize {
    20
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        GeneratorSettings {
            version: default_version(),
            difficulty: Difficulty::default(),
            max_retries: default_max_retries(),
            solver_timeout_ms: default_solver_timeout_ms(),
            batch_size: default_batch_size(),
            seed: None,
        }
    }
}

impl GeneratorSettings {
    /// Defaults with a fixed seed, for reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        GeneratorSettings {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path)?;
        let mut settings = serde_json::from_str::<GeneratorSettings>(&contents)?;
        settings.migrate();
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    fn migrate(&mut self) {
        // version 1 files could carry a zero batch size, which never progresses
        if self.version < 2 {
            if self.batch_size == 0 {
                self.batch_size = default_batch_size();
            }
            self.version = 2;
        }
    }

    /// Defaults, overridden from the environment.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        settings.apply_env();
        settings
    }

    /// Overrides fields with `SEED`, `DIFFICULTY` and `MAX_RETRIES` when set.
    pub fn apply_env(&mut self) {
        if let Some(seed) = Self::seed_from_env() {
            self.seed = Some(seed);
        }
        if let Some(difficulty) = Self::difficulty_from_env() {
            self.difficulty = difficulty;
        }
        if let Some(max_retries) = Self::max_retries_from_env() {
            self.max_retries = max_retries;
        }
    }

    fn max_retries_from_env() -> Option<usize> {
        let value = env_var("MAX_RETRIES")?;
        match value.parse::<usize>() {
            Ok(max_retries) => Some(max_retries),
            Err(_) => {
                warn!(target: "settings", "Ignoring unparseable MAX_RETRIES={}", value);
                None
            }
        }
    }

    pub fn seed_from_env() -> Option<u64> {
        let value = env_var("SEED")?;
        match value.parse::<u64>() {
            Ok(seed) => Some(seed),
            Err(_) => {
                warn!(target: "settings", "Ignoring unparseable SEED={}", value);
                None
            }
        }
    }

    pub fn difficulty_from_env() -> Option<Difficulty> {
        let value = env_var("DIFFICULTY")?;
        match value.parse::<Difficulty>() {
            Ok(difficulty) => Some(difficulty),
            Err(e) => {
                warn!(target: "settings", "Ignoring DIFFICULTY: {}", e);
                None
            }
        }
    }

    pub fn solver_timeout(&self) -> Duration {
        Duration::from_millis(self.solver_timeout_ms)
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

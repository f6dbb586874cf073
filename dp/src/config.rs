//! DraftPlan configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PlanError;

/// Teaching days that make up one planning week
pub const DEFAULT_DAYS_PER_WEEK: u32 = 5;

/// Topics per week above which an overload signal fires
pub const DEFAULT_OVERLOAD_THRESHOLD: usize = 2;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Pacing and risk heuristics
    pub planning: PlanningConfig,

    /// Fixture used by the CLI as calendar/curriculum source
    pub fixture: FixtureConfig,

    /// Where committed lesson records go
    pub storage: StorageConfig,
}

impl Config {
    /// Validate configuration before use
    pub fn validate(&self) -> Result<()> {
        self.planning.validate()?;
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .draftplan.yml
        let local_config = PathBuf::from(".draftplan.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/draftplan/draftplan.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("draftplan").join("draftplan.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialized
    ///
    /// Errors are swallowed: a broken config file is reported later by `load`.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => {
                let mut paths = vec![PathBuf::from(".draftplan.yml")];
                if let Some(config_dir) = dirs::config_dir() {
                    paths.push(config_dir.join("draftplan").join("draftplan.yml"));
                }
                paths
            }
        };

        candidates
            .iter()
            .find(|p| p.exists())
            .and_then(|p| fs::read_to_string(p).ok())
            .and_then(|content| serde_yaml::from_str::<Self>(&content).ok())
            .and_then(|config| config.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Pacing and risk heuristics
///
/// These are advisory knobs, not policy: they change what the engine
/// proposes and flags, never what a teacher is allowed to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    /// Teaching days per week when converting days to weeks
    #[serde(rename = "days-per-week")]
    pub days_per_week: u32,

    /// Topics per week above which an overload signal fires
    #[serde(rename = "overload-threshold")]
    pub overload_threshold: usize,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            days_per_week: DEFAULT_DAYS_PER_WEEK,
            overload_threshold: DEFAULT_OVERLOAD_THRESHOLD,
        }
    }
}

impl PlanningConfig {
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.days_per_week == 0 {
            return Err(PlanError::InvalidConfig("days-per-week must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Fixture configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    /// Default fixture file when `--fixture` is not given
    pub path: Option<PathBuf>,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON-lines file receiving committed lesson records
    #[serde(rename = "lessons-path")]
    pub lessons_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        // Use XDG data directory (~/.local/share/draftplan on Linux)
        let lessons_path = dirs::data_dir()
            .map(|d| d.join("draftplan"))
            .unwrap_or_else(|| PathBuf::from(".draftplan"))
            .join("lessons.jsonl");

        Self { lessons_path }
    }
}

//! Run settings
//!
//! Loaded from an optional JSON file; every field has a default so partial
//! files are fine.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::SCORE_CUTOFF;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Knobs of the neuroevolution engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionSettings {
    /// Hidden neurons (0 connects inputs straight to the output)
    pub hidden: usize,
    /// Best genomes copied unchanged into the next generation
    pub elitism: usize,
    /// Fraction of each generation allowed to breed
    pub survival_threshold: f32,
    /// Chance a weight is perturbed
    pub mutate_rate: f32,
    /// Standard deviation of a perturbation
    pub mutate_power: f32,
    /// Chance a weight is re-drawn from scratch
    pub replace_rate: f32,
    /// Standard deviation of freshly drawn weights
    pub init_stdev: f32,
    /// Weights are clamped to +/- this
    pub weight_limit: f32,
    /// Stop evolving once the best fitness reaches this
    pub fitness_threshold: f32,
}

impl Default for EvolutionSettings {
    fn default() -> Self {
        Self {
            hidden: 0,
            elitism: 2,
            survival_threshold: 0.2,
            mutate_rate: 0.8,
            mutate_power: 0.5,
            replace_rate: 0.1,
            init_stdev: 1.0,
            weight_limit: 30.0,
            fitness_threshold: 100.0,
        }
    }
}

/// Top-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Birds per generation
    pub population_size: usize,
    /// Generations to train
    pub generations: u32,
    /// Episodes stop once the score exceeds this
    pub score_cutoff: u32,
    /// Fixed seed for reproducible runs; random when absent
    pub seed: Option<u64>,
    /// Pace headless runs at the real-time tick rate
    pub realtime: bool,
    /// Where the best agent is saved and replayed from
    pub best_agent_path: PathBuf,
    /// Headless HUD line every N frames
    pub log_every: u64,
    pub evolution: EvolutionSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 21,
            score_cutoff: SCORE_CUTOFF,
            seed: None,
            realtime: false,
            best_agent_path: PathBuf::from("best_agent.json"),
            log_every: 500,
            evolution: EvolutionSettings::default(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path` if given, falling back to defaults on any problem
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::info!("Using default settings");
            return Self::default();
        };
        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                log::warn!("{err}; using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

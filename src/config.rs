use std::path::Path;

use serde::Deserialize;

use crate::engine::{AdjacencyScan, MergeScan, SpawnRegion};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Game rules. `Default` reproduces the reference behaviour, quirks included.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct Rules {
    #[serde(default)]
    pub merge_scan: MergeScan,
    #[serde(default)]
    pub spawn_region: SpawnRegion,
    #[serde(default)]
    pub adjacency_scan: AdjacencyScan,
    /// Random draws before the spawner falls back to scanning for empties.
    #[serde(default = "defaults::spawn_attempts")]
    pub spawn_attempts: u32,
    /// Tiles spawned when a game starts.
    #[serde(default = "defaults::start_tiles")]
    pub start_tiles: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            merge_scan: MergeScan::default(),
            spawn_region: SpawnRegion::default(),
            adjacency_scan: AdjacencyScan::default(),
            spawn_attempts: defaults::spawn_attempts(),
            start_tiles: defaults::start_tiles(),
        }
    }
}

impl Rules {
    /// Every correction enabled: ordered fixpoint merge, spawns anywhere,
    /// full adjacency scan.
    pub fn corrected() -> Self {
        Self {
            merge_scan: MergeScan::Fixpoint,
            spawn_region: SpawnRegion::FullBoard,
            adjacency_scan: AdjacencyScan::Full,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Seed for the tile RNG; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub rules: Rules,
}

impl Config {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}

mod defaults {
    pub fn spawn_attempts() -> u32 { 64 }
    pub fn start_tiles() -> u32 { 2 }
}

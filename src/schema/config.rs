//! Configuration types for MAP-Elites runs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration consumed by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Problem parameters.
    #[serde(default)]
    pub problem: BinaryConfig,
    /// Search parameters.
    #[serde(default)]
    pub search: SearchConfig,
    /// Number of evolutionary steps to run after initialization.
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Snapshot output directory. Snapshots are skipped when unset.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            problem: BinaryConfig::default(),
            search: SearchConfig::default(),
            iterations: default_iterations(),
            output_dir: None,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.problem.validate()?;
        self.search.validate()
    }
}

fn default_iterations() -> usize {
    100
}

/// How a chromosome is scored when competing for an archive cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessRule {
    /// Raw quality.
    #[default]
    Quality,
    /// Quality, then controllability once quality is saturated.
    QualityControl,
    /// Quality, controllability, then diversity, each gated on the previous.
    QualityControlDiversity,
}

/// MAP-Elites search parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Side length of the square elite grid.
    #[serde(default = "default_space_size")]
    pub space_size: usize,
    /// Parent pairs sampled per step.
    #[serde(default = "default_changes_in_iter")]
    pub changes_in_iter: usize,
    /// Offspring produced per parent pair.
    #[serde(default = "default_children_num")]
    pub children_num: usize,
    /// Probability of crossover (followed by mutation) instead of plain mutation.
    #[serde(default = "default_p_crossover")]
    pub p_crossover: f64,
    /// Mutation rate passed to the genetic operators (0.0-1.0).
    #[serde(default = "default_mut_rate")]
    pub mut_rate: f64,
    /// Replacement comparator.
    #[serde(default)]
    pub fitness: FitnessRule,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            space_size: default_space_size(),
            changes_in_iter: default_changes_in_iter(),
            children_num: default_children_num(),
            p_crossover: default_p_crossover(),
            mut_rate: default_mut_rate(),
            fitness: FitnessRule::default(),
            random_seed: None,
        }
    }
}

fn default_space_size() -> usize {
    10
}
fn default_changes_in_iter() -> usize {
    100
}
fn default_children_num() -> usize {
    5
}
fn default_p_crossover() -> f64 {
    0.25
}
fn default_mut_rate() -> f64 {
    0.1
}

impl SearchConfig {
    /// Total number of cells in the grid.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.space_size * self.space_size
    }

    /// Offspring evaluated by a single step.
    #[inline]
    pub fn evaluations_per_step(&self) -> usize {
        self.changes_in_iter * self.children_num
    }

    /// Validate search parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.space_size == 0 {
            return Err(ConfigError::InvalidSpaceSize);
        }
        if self.changes_in_iter == 0 || self.children_num == 0 {
            return Err(ConfigError::EmptyStep);
        }
        if !(0.0..=1.0).contains(&self.p_crossover) {
            return Err(ConfigError::InvalidProbability {
                name: "p_crossover",
                value: self.p_crossover,
            });
        }
        if !(0.0..=1.0).contains(&self.mut_rate) {
            return Err(ConfigError::InvalidProbability {
                name: "mut_rate",
                value: self.mut_rate,
            });
        }
        Ok(())
    }
}

/// Parameters of the binary dungeon problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryConfig {
    /// Level width in tiles.
    #[serde(default = "default_level_side")]
    pub width: usize,
    /// Level height in tiles.
    #[serde(default = "default_level_side")]
    pub height: usize,
    /// Minimum longest path for a level to count as high quality.
    #[serde(default = "default_path")]
    pub path: usize,
}

impl Default for BinaryConfig {
    fn default() -> Self {
        Self {
            width: default_level_side(),
            height: default_level_side(),
            path: default_path(),
        }
    }
}

fn default_level_side() -> usize {
    60
}
fn default_path() -> usize {
    120
}

impl BinaryConfig {
    #[inline]
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < 3 || self.height < 3 {
            return Err(ConfigError::InvalidLevelSize {
                width: self.width,
                height: self.height,
            });
        }
        if self.path == 0 || self.path >= self.area() / 4 {
            return Err(ConfigError::InvalidPathTarget {
                path: self.path,
                limit: self.area() / 4,
            });
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Grid side (space_size) must be non-zero")]
    InvalidSpaceSize,
    #[error("changes_in_iter and children_num must be non-zero")]
    EmptyStep,
    #[error("{name} must be within [0, 1], got {value}")]
    InvalidProbability {
        name: &'static str,
        value: f64,
    },
    #[error("Level must be at least 3x3, got {width}x{height}")]
    InvalidLevelSize {
        width: usize,
        height: usize,
    },
    #[error("Path target {path} must be in (0, {limit})")]
    InvalidPathTarget {
        path: usize,
        limit: usize,
    },
}

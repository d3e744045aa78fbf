//! Serialized archive snapshots for offline analysis.

use serde::{Deserialize, Serialize};

use super::Info;

/// Archive state at one point of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveSnapshot<C> {
    /// Iteration index (0 right after initialization).
    pub iter: usize,
    /// Total grid capacity (`side * side`).
    pub space_size: usize,
    /// Fraction of occupied cells.
    pub coverage: f64,
    /// Cells indexed as `grid[ix][iy]`.
    pub grid: Vec<Vec<Option<EliteRecord<C>>>>,
}

impl<C> ArchiveSnapshot<C> {
    /// Number of occupied cells.
    pub fn filled(&self) -> usize {
        self.grid.iter().flatten().filter(|c| c.is_some()).count()
    }
}

/// Evaluation record of a single elite. Content is intentionally omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EliteRecord<C> {
    pub control: C,
    pub info: Info,
    pub quality: f64,
    pub diversity: f64,
    pub controllability: f64,
}

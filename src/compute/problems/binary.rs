//! Binary dungeon problem: a single connected cave with a long path.

use std::collections::VecDeque;

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use super::{Problem, ProblemError, range_reward};
use crate::compute::evolution::SearchRng;
use crate::schema::{BinaryConfig, ConfigError, DescriptorAxis, DescriptorSpace, Info};

/// A single level tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Tile {
    Solid = 0,
    Corridor = 1,
    Room = 2,
}

impl Tile {
    #[inline]
    pub fn is_passable(self) -> bool {
        !matches!(self, Tile::Solid)
    }
}

impl From<Tile> for u8 {
    fn from(tile: Tile) -> Self {
        tile as u8
    }
}

impl TryFrom<u8> for Tile {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Tile::Solid),
            1 => Ok(Tile::Corridor),
            2 => Ok(Tile::Room),
            other => Err(format!("invalid tile value {other}")),
        }
    }
}

/// Row-major grid of tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

/// Connectivity measurements of a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelStats {
    /// Number of 4-connected passable regions.
    pub regions: usize,
    /// Longest shortest path inside any single region.
    pub path: usize,
    /// Passable tile count.
    pub floor: usize,
}

impl TileGrid {
    /// Grid filled with a single tile.
    pub fn filled(width: usize, height: usize, tile: Tile) -> Self {
        Self {
            width,
            height,
            tiles: vec![tile; width * height],
        }
    }

    /// Build from explicit rows. Rows must all have the same length.
    pub fn from_rows(rows: &[Vec<Tile>]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        debug_assert!(rows.iter().all(|r| r.len() == width));
        Self {
            width,
            height,
            tiles: rows.iter().flatten().copied().collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Tile {
        self.tiles[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, tile: Tile) {
        self.tiles[y * self.width + x] = tile;
    }

    /// Carve `tile` at `(x, y)` without downgrading a room to a corridor.
    #[inline]
    pub fn carve(&mut self, x: usize, y: usize, tile: Tile) {
        let current = &mut self.tiles[y * self.width + x];
        if (tile as u8) > (*current as u8) {
            *current = tile;
        }
    }

    /// Tile values as nested rows, `rows[y][x]`.
    pub fn rows(&self) -> Vec<Vec<u8>> {
        self.tiles
            .chunks(self.width.max(1))
            .map(|row| row.iter().map(|&t| t as u8).collect())
            .collect()
    }

    /// Compute region count, longest path and floor size.
    pub fn stats(&self) -> LevelStats {
        let n = self.tiles.len();
        let mut seen = vec![false; n];
        let mut dist = vec![u32::MAX; n];
        let mut touched = Vec::new();
        let mut queue = VecDeque::new();
        let mut stats = LevelStats::default();

        for start in 0..n {
            if !self.tiles[start].is_passable() || seen[start] {
                continue;
            }
            stats.regions += 1;

            // Double sweep: the farthest tile from any start is one end of the
            // region's longest shortest path.
            let (far, _) = self.sweep(start, &mut dist, &mut touched, &mut queue);
            stats.floor += touched.len();
            for &i in &touched {
                seen[i] = true;
            }
            let (_, eccentricity) = self.sweep(far, &mut dist, &mut touched, &mut queue);
            stats.path = stats.path.max(eccentricity as usize);
        }

        stats
    }

    /// BFS over passable tiles from `start`, returning the farthest tile and its distance.
    fn sweep(
        &self,
        start: usize,
        dist: &mut [u32],
        touched: &mut Vec<usize>,
        queue: &mut VecDeque<usize>,
    ) -> (usize, u32) {
        for &i in touched.iter() {
            dist[i] = u32::MAX;
        }
        touched.clear();

        dist[start] = 0;
        touched.push(start);
        queue.push_back(start);
        let mut farthest = (start, 0);

        while let Some(i) = queue.pop_front() {
            let d = dist[i];
            if d > farthest.1 {
                farthest = (i, d);
            }
            for j in self.neighbors(i).into_iter().flatten() {
                if self.tiles[j].is_passable() && dist[j] == u32::MAX {
                    dist[j] = d + 1;
                    touched.push(j);
                    queue.push_back(j);
                }
            }
        }

        farthest
    }

    #[inline]
    fn neighbors(&self, i: usize) -> [Option<usize>; 4] {
        let (x, y) = (i % self.width, i / self.width);
        [
            (x > 0).then(|| i - 1),
            (x + 1 < self.width).then(|| i + 1),
            (y > 0).then(|| i - self.width),
            (y + 1 < self.height).then(|| i + self.width),
        ]
    }
}

/// Control target for the binary problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryControl {
    /// Desired longest path length.
    pub path: usize,
}

/// Binary dungeon problem.
///
/// Info fields: `regions`, `path`, `floor` (passable ratio).
/// Descriptors: `path` in `[0, area / 4)` and `floor` in `[0, 1)`.
#[derive(Debug, Clone)]
pub struct BinaryProblem {
    config: BinaryConfig,
    space: DescriptorSpace,
}

impl BinaryProblem {
    pub fn new(config: BinaryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let space = DescriptorSpace {
            x: DescriptorAxis::new("path", 0.0, (config.area() / 4) as f64),
            y: DescriptorAxis::new("floor", 0.0, 1.0),
        };
        Ok(Self { config, space })
    }

    pub fn config(&self) -> &BinaryConfig {
        &self.config
    }

    /// Measure a level directly.
    pub fn measure(&self, grid: &TileGrid) -> Info {
        let stats = grid.stats();
        Info::new()
            .with("regions", stats.regions as f64)
            .with("path", stats.path as f64)
            .with("floor", stats.floor as f64 / grid.tiles.len().max(1) as f64)
    }

    fn random_tile(rng: &mut SearchRng) -> Tile {
        if rng.gen_bool(0.5) {
            Tile::Solid
        } else {
            Tile::Corridor
        }
    }
}

impl Problem for BinaryProblem {
    type Content = TileGrid;
    type Control = BinaryControl;

    fn name(&self) -> &str {
        "binary"
    }

    fn descriptor_space(&self) -> &DescriptorSpace {
        &self.space
    }

    fn random_content(&self, rng: &mut SearchRng) -> TileGrid {
        TileGrid {
            width: self.config.width,
            height: self.config.height,
            tiles: (0..self.config.area())
                .map(|_| Self::random_tile(rng))
                .collect(),
        }
    }

    fn mutate_content(&self, content: &TileGrid, rate: f64, rng: &mut SearchRng) -> TileGrid {
        let mut child = content.clone();
        for tile in &mut child.tiles {
            if rng.chance(rate) {
                *tile = Self::random_tile(rng);
            }
        }
        child
    }

    fn crossover_content(&self, a: &TileGrid, b: &TileGrid, rng: &mut SearchRng) -> TileGrid {
        let len = a.tiles.len().min(b.tiles.len());
        let cut = rng.gen_range(0..=len);
        let mut tiles = Vec::with_capacity(a.tiles.len());
        tiles.extend_from_slice(&a.tiles[..cut]);
        tiles.extend_from_slice(&b.tiles[cut..]);
        TileGrid {
            width: a.width,
            height: a.height,
            tiles,
        }
    }

    fn sample_control(&self, rng: &mut SearchRng) -> BinaryControl {
        BinaryControl {
            path: rng.gen_range(self.config.path..=self.config.area() / 4),
        }
    }

    fn mutate_control(
        &self,
        control: &BinaryControl,
        rate: f64,
        rng: &mut SearchRng,
    ) -> BinaryControl {
        if !rng.chance(rate) {
            return *control;
        }
        let (lo, hi) = (self.config.path, self.config.area() / 4);
        let spread = ((hi - lo) as f64 * 0.1).max(1.0);
        let path = match Normal::new(control.path as f64, spread) {
            Ok(normal) => normal.sample(rng).round(),
            Err(_) => control.path as f64,
        };
        BinaryControl {
            path: (path.max(lo as f64) as usize).min(hi),
        }
    }

    fn info(&self, content: &TileGrid) -> Result<Info, ProblemError> {
        if content.width != self.config.width || content.height != self.config.height {
            return Err(ProblemError::Evaluation(format!(
                "expected {}x{} level, got {}x{}",
                self.config.width, self.config.height, content.width, content.height
            )));
        }
        Ok(self.measure(content))
    }

    fn quality(&self, info: &Info) -> f64 {
        let area = self.config.area() as f64;
        let regions = range_reward(
            info.get("regions").unwrap_or(0.0),
            0.0,
            1.0,
            1.0,
            area / 10.0,
        );
        let path = range_reward(
            info.get("path").unwrap_or(0.0),
            0.0,
            self.config.path as f64,
            area,
            area,
        );
        // A long path only counts once the level is connected.
        (regions + regions * path) / 2.0
    }

    fn controllability(&self, info: &Info, control: &BinaryControl) -> f64 {
        let target = control.path as f64;
        let tolerance = (target / 10.0).max(1.0);
        range_reward(
            info.get("path").unwrap_or(0.0),
            0.0,
            target - tolerance,
            target + tolerance,
            self.config.area() as f64,
        )
    }

    fn diversity(&self, info: &Info, others: &[&Info]) -> f64 {
        let area = self.config.area() as f64;
        let scales = [
            ("path", area / 4.0),
            ("floor", 1.0),
            ("regions", area / 10.0),
        ];
        let distance = |other: &Info| {
            scales
                .iter()
                .map(|&(name, scale)| {
                    let a = info.get(name).unwrap_or(0.0);
                    let b = other.get(name).unwrap_or(0.0);
                    ((a - b).abs() / scale).min(1.0)
                })
                .sum::<f64>()
                / scales.len() as f64
        };
        others
            .iter()
            .map(|&other| distance(other))
            .fold(1.0, f64::min)
    }
}

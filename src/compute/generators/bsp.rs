//! Binary space partitioning generator.
//!
//! The level is split recursively into a tree of partitions stored in an
//! index arena. Each leaf gets a room covering most of its partition, and
//! sibling subtrees are joined with L-shaped hallways bottom-up.

use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::compute::evolution::SearchRng;
use crate::compute::problems::{Tile, TileGrid};

/// Tree depths swept by the CLI.
pub const BSP_SWEEP_DEPTHS: RangeInclusive<usize> = 2..=11;

/// Partitions at or below this side length are not split along it.
const MIN_SPLIT_SIDE: usize = 4;

/// Rooms grow until they cover this share of their partition.
const ROOM_COVERAGE: f64 = 0.75;

/// Axis-aligned rectangle in tile coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl Rect {
    pub fn area(&self) -> usize {
        self.w * self.h
    }

    pub fn center(&self) -> (usize, usize) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }

    fn contains(&self, inner: &Rect) -> bool {
        inner.x >= self.x
            && inner.y >= self.y
            && inner.x + inner.w <= self.x + self.w
            && inner.y + inner.h <= self.y + self.h
    }
}

/// One partition of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BspNode {
    pub bounds: Rect,
    /// Arena indices of the two halves, if split.
    pub children: Option<[usize; 2]>,
    /// Room placed in a leaf.
    pub room: Option<Rect>,
}

impl BspNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Partition tree. Node 0 is the root.
#[derive(Debug, Clone, Default)]
pub struct BspTree {
    nodes: Vec<BspNode>,
}

impl BspTree {
    pub fn nodes(&self) -> &[BspNode] {
        &self.nodes
    }

    pub fn root(&self) -> Option<&BspNode> {
        self.nodes.first()
    }

    pub fn leaves(&self) -> impl Iterator<Item = &BspNode> {
        self.nodes.iter().filter(|node| node.is_leaf())
    }

    /// Split the half-open box `[x0, x1) x [y0, y1)` up to `depth` more times.
    fn partition(
        &mut self,
        (x0, y0, x1, y1): (usize, usize, usize, usize),
        depth: usize,
        rng: &mut SearchRng,
    ) -> usize {
        let index = self.nodes.len();
        self.nodes.push(BspNode {
            bounds: Rect {
                x: x0,
                y: y0,
                w: x1 - x0,
                h: y1 - y0,
            },
            children: None,
            room: None,
        });
        if depth == 0 {
            return index;
        }

        let horizontal = rng.chance(0.5);
        let halves = if horizontal && y1 - y0 > MIN_SPLIT_SIDE {
            let split = rng.gen_range(y0 + 2..y1 - 2);
            Some(((x0, y0, x1, split), (x0, split + 1, x1, y1)))
        } else if !horizontal && x1 - x0 > MIN_SPLIT_SIDE {
            let split = rng.gen_range(x0 + 2..x1 - 2);
            Some(((x0, y0, split, y1), (split + 1, y0, x1, y1)))
        } else {
            None
        };

        if let Some((first, second)) = halves {
            let a = self.partition(first, depth - 1, rng);
            let b = self.partition(second, depth - 1, rng);
            self.nodes[index].children = Some([a, b]);
        }
        index
    }

    /// Place a room in every leaf.
    fn place_rooms(&mut self, rng: &mut SearchRng) {
        for node in self.nodes.iter_mut().filter(|node| node.children.is_none()) {
            node.room = Some(room_within(node.bounds, rng));
        }
    }

    /// Join the subtrees under `index` and return a point inside one of its rooms.
    fn connect(&self, index: usize, grid: &mut TileGrid, rng: &mut SearchRng) -> (usize, usize) {
        let node = &self.nodes[index];
        match node.children {
            None => node.room.unwrap_or(node.bounds).center(),
            Some([a, b]) => {
                let first = self.connect(a, grid, rng);
                let second = self.connect(b, grid, rng);
                carve_hallway(grid, first, second, rng);
                if rng.chance(0.5) { first } else { second }
            }
        }
    }
}

/// Grow a room from about three quarters of each side until it covers
/// [`ROOM_COVERAGE`] of the partition, then center it.
fn room_within(bounds: Rect, rng: &mut SearchRng) -> Rect {
    let mut w = rng.gen_range(side_floor(bounds.w)..=bounds.w);
    let mut h = rng.gen_range(side_floor(bounds.h)..=bounds.h);
    let target = ROOM_COVERAGE * bounds.area() as f64;

    while ((w * h) as f64) < target {
        let can_widen = w < bounds.w;
        let can_heighten = h < bounds.h;
        match (can_widen, can_heighten) {
            (false, false) => break,
            (true, false) => w += 1,
            (false, true) => h += 1,
            (true, true) => {
                if rng.chance(0.5) {
                    w += 1;
                } else {
                    h += 1;
                }
            }
        }
    }

    Rect {
        x: bounds.x + (bounds.w - w) / 2,
        y: bounds.y + (bounds.h - h) / 2,
        w,
        h,
    }
}

fn side_floor(side: usize) -> usize {
    (side / 4 * 3).max(2).min(side)
}

/// Carve an L-shaped corridor between two points. Rooms are left intact.
fn carve_hallway(
    grid: &mut TileGrid,
    (x1, y1): (usize, usize),
    (x2, y2): (usize, usize),
    rng: &mut SearchRng,
) {
    let xs = x1.min(x2)..=x1.max(x2);
    let ys = y1.min(y2)..=y1.max(y2);
    if rng.chance(0.5) {
        for x in xs {
            grid.carve(x, y1, Tile::Corridor);
        }
        for y in ys {
            grid.carve(x2, y, Tile::Corridor);
        }
    } else {
        for y in ys {
            grid.carve(x1, y, Tile::Corridor);
        }
        for x in xs {
            grid.carve(x, y2, Tile::Corridor);
        }
    }
}

/// Parameters recorded alongside a BSP-generated level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BspParams {
    pub depth: usize,
}

/// Binary space partitioning dungeon generator.
#[derive(Debug, Clone)]
pub struct BspGenerator {
    width: usize,
    height: usize,
    depth: usize,
}

impl BspGenerator {
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    pub fn params(&self) -> BspParams {
        BspParams { depth: self.depth }
    }

    /// Build the partition tree with rooms placed in its leaves.
    pub fn build_tree(&self, rng: &mut SearchRng) -> BspTree {
        let mut tree = BspTree::default();
        tree.partition((0, 0, self.width, self.height), self.depth, rng);
        tree.place_rooms(rng);
        tree
    }

    /// Generate a level: partition, fill rooms, then connect siblings.
    pub fn generate(&self, rng: &mut SearchRng) -> TileGrid {
        let tree = self.build_tree(rng);
        let mut grid = TileGrid::filled(self.width, self.height, Tile::Solid);

        for room in tree.leaves().filter_map(|leaf| leaf.room) {
            for y in room.y..room.y + room.h {
                for x in room.x..room.x + room.w {
                    grid.set(x, y, Tile::Room);
                }
            }
        }
        if !tree.nodes.is_empty() {
            tree.connect(0, &mut grid, rng);
        }

        log::debug!(
            "BSP depth {} produced {} leaves",
            self.depth,
            tree.leaves().count()
        );
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::problems::BinaryProblem;
    use crate::schema::BinaryConfig;

    #[test]
    fn test_partitions_tile_their_parent() {
        let generator = BspGenerator::new(60, 60, 4);
        let tree = generator.build_tree(&mut SearchRng::new(5));

        let root = tree.root().unwrap();
        let full = Rect {
            x: 0,
            y: 0,
            w: 60,
            h: 60,
        };
        assert_eq!(root.bounds, full);

        for node in tree.nodes() {
            if let Some([a, b]) = node.children {
                let (a, b) = (tree.nodes()[a].bounds, tree.nodes()[b].bounds);
                assert!(node.bounds.contains(&a));
                assert!(node.bounds.contains(&b));
                assert!(a.w >= 2 && a.h >= 2);
                assert!(b.w >= 2 && b.h >= 2);
                // One tile wall between the halves.
                let along_x = a.h == node.bounds.h;
                let gap = if along_x {
                    node.bounds.w - a.w - b.w
                } else {
                    node.bounds.h - a.h - b.h
                };
                assert_eq!(gap, 1);
            }
        }
    }

    #[test]
    fn test_rooms_cover_most_of_leaf() {
        let generator = BspGenerator::new(60, 60, 3);
        let tree = generator.build_tree(&mut SearchRng::new(8));

        let leaves: Vec<_> = tree.leaves().collect();
        assert!(!leaves.is_empty());
        for leaf in leaves {
            let room = leaf.room.unwrap();
            assert!(leaf.bounds.contains(&room));
            assert!(room.area() as f64 >= ROOM_COVERAGE * leaf.bounds.area() as f64);
        }
    }

    #[test]
    fn test_depth_zero_is_single_room() {
        let generator = BspGenerator::new(20, 20, 0);
        let tree = generator.build_tree(&mut SearchRng::new(1));
        assert_eq!(tree.nodes().len(), 1);
        assert!(tree.root().unwrap().room.is_some());
    }

    #[test]
    fn test_generated_level_is_connected() {
        let problem = BinaryProblem::new(BinaryConfig::default()).unwrap();
        for seed in 0..5 {
            let grid = BspGenerator::new(60, 60, 4).generate(&mut SearchRng::new(seed));
            let info = problem.measure(&grid);
            assert_eq!(info.get("regions"), Some(1.0), "seed {seed}");
        }
    }

    #[test]
    fn test_hallway_keeps_rooms() {
        let mut grid = TileGrid::filled(10, 10, Tile::Solid);
        grid.set(5, 2, Tile::Room);
        let mut rng = SearchRng::new(0);
        carve_hallway(&mut grid, (2, 2), (7, 7), &mut rng);

        assert_eq!(grid.get(5, 2), Tile::Room);
        assert!(grid.get(2, 2).is_passable());
        assert!(grid.get(7, 7).is_passable());
    }

    #[test]
    fn test_room_floor_is_bounded() {
        assert_eq!(side_floor(2), 2);
        assert_eq!(side_floor(3), 2);
        assert_eq!(side_floor(8), 6);
        assert_eq!(side_floor(60), 45);
    }
}

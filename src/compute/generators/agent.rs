//! Agent-based digger: a wandering agent carves corridors and drops rooms.

use std::ops::{Range, RangeInclusive};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::compute::evolution::SearchRng;
use crate::compute::problems::{Tile, TileGrid};

/// Turn/room probability increments swept by the CLI.
pub const AGENT_SWEEP_INCREASES: [f64; 7] = [0.25, 0.5, 0.75, 1.0, 2.0, 5.0, 10.0];

/// Initial turn and room probabilities, in percent.
const P_TURN_INIT: f64 = 5.0;
const P_ROOM_INIT: f64 = 5.0;

/// Room side lengths are drawn from this range.
const ROOM_SIZES: Range<usize> = 3..8;

/// Compass heading of the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    North,
    South,
    East,
    West,
}

impl Heading {
    const ALL: [Heading; 4] = [
        Heading::North,
        Heading::South,
        Heading::East,
        Heading::West,
    ];

    fn delta(self) -> (isize, isize) {
        match self {
            Heading::North => (0, -1),
            Heading::South => (0, 1),
            Heading::East => (1, 0),
            Heading::West => (-1, 0),
        }
    }

    /// The two perpendicular headings.
    fn turns(self) -> [Heading; 2] {
        match self {
            Heading::North | Heading::South => [Heading::East, Heading::West],
            Heading::East | Heading::West => [Heading::North, Heading::South],
        }
    }
}

/// Parameters recorded alongside an agent-generated level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentParams {
    pub p_turn_increase: f64,
    pub p_room_increase: f64,
    pub steps: usize,
}

/// Agent-based dungeon digger.
///
/// Each step the agent moves one tile, carves a corridor, then rolls to turn
/// and to drop a room. A failed roll raises that probability by its increment;
/// a successful one resets it to zero.
#[derive(Debug, Clone)]
pub struct AgentDigger {
    width: usize,
    height: usize,
    p_turn_increase: f64,
    p_room_increase: f64,
}

struct Agent {
    x: usize,
    y: usize,
    heading: Heading,
}

impl AgentDigger {
    pub fn new(width: usize, height: usize, p_turn_increase: f64, p_room_increase: f64) -> Self {
        Self {
            width,
            height,
            p_turn_increase,
            p_room_increase,
        }
    }

    pub fn params(&self, steps: usize) -> AgentParams {
        AgentParams {
            p_turn_increase: self.p_turn_increase,
            p_room_increase: self.p_room_increase,
            steps,
        }
    }

    /// Dig a level with `steps` agent moves.
    pub fn generate(&self, steps: usize, rng: &mut SearchRng) -> TileGrid {
        let mut grid = TileGrid::filled(self.width, self.height, Tile::Solid);
        let mut agent = Agent {
            x: self.width / 2,
            y: self.height / 2,
            heading: Heading::ALL[rng.index(Heading::ALL.len())],
        };
        let mut p_turn = P_TURN_INIT;
        let mut p_room = P_ROOM_INIT;

        self.drop_room(&mut grid, &agent, rng);
        for _ in 0..steps {
            self.advance(&mut agent);
            grid.carve(agent.x, agent.y, Tile::Corridor);

            if (rng.gen_range(0..100) as f64) < p_turn {
                agent.heading = agent.heading.turns()[rng.index(2)];
                p_turn = 0.0;
            } else {
                p_turn += self.p_turn_increase;
            }

            if (rng.gen_range(0..100) as f64) < p_room {
                self.drop_room(&mut grid, &agent, rng);
                p_room = 0.0;
            } else {
                p_room += self.p_room_increase;
            }
        }
        self.drop_room(&mut grid, &agent, rng);

        grid
    }

    /// Move one tile, staying off the border on both axes.
    fn advance(&self, agent: &mut Agent) {
        let (dx, dy) = agent.heading.delta();
        agent.x = agent
            .x
            .saturating_add_signed(dx)
            .clamp(1, self.width.saturating_sub(2).max(1));
        agent.y = agent
            .y
            .saturating_add_signed(dy)
            .clamp(1, self.height.saturating_sub(2).max(1));
    }

    /// Carve a square room around the agent, clipped away from the far edges.
    fn drop_room(&self, grid: &mut TileGrid, agent: &Agent, rng: &mut SearchRng) {
        let span = room_span(rng.gen_range(ROOM_SIZES));
        for dy in span.clone() {
            for dx in span.clone() {
                let (Some(x), Some(y)) = (
                    agent.x.checked_add_signed(dx),
                    agent.y.checked_add_signed(dy),
                ) else {
                    continue;
                };
                if x + 1 < self.width && y + 1 < self.height {
                    grid.set(x, y, Tile::Room);
                }
            }
        }
    }
}

/// Offsets covered by a room of the given size: `-ceil(size / 2)..=floor(size / 2)`,
/// so a room is `size + 1` tiles wide and leans toward the negative side.
fn room_span(size: usize) -> RangeInclusive<isize> {
    let size = size as isize;
    -((size + 1) / 2)..=size / 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::problems::BinaryProblem;
    use crate::schema::BinaryConfig;

    #[test]
    fn test_generate_carves_from_center() {
        let digger = AgentDigger::new(30, 30, 5.0, 5.0);
        let mut rng = SearchRng::new(1);
        let grid = digger.generate(100, &mut rng);

        assert_eq!((grid.width(), grid.height()), (30, 30));
        assert!(grid.get(15, 15).is_passable());
        // Neither the agent nor its rooms reach the far edges.
        assert!((0..30).all(|i| !grid.get(29, i).is_passable()));
        assert!((0..30).all(|i| !grid.get(i, 29).is_passable()));
    }

    #[test]
    fn test_digger_output_is_connected() {
        let problem = BinaryProblem::new(BinaryConfig::default()).unwrap();
        let digger = AgentDigger::new(60, 60, 1.0, 2.0);
        let mut rng = SearchRng::new(3);
        let grid = digger.generate(500, &mut rng);

        let info = problem.measure(&grid);
        assert_eq!(info.get("regions"), Some(1.0));
        assert!(info.get("path").unwrap() > 0.0);
    }

    #[test]
    fn test_generate_is_seeded() {
        let digger = AgentDigger::new(40, 40, 2.0, 2.0);
        let a = digger.generate(200, &mut SearchRng::new(9));
        let b = digger.generate(200, &mut SearchRng::new(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_room_spans() {
        assert_eq!(room_span(3), -2..=1);
        assert_eq!(room_span(4), -2..=2);
        assert_eq!(room_span(7), -4..=3);
        let widths: Vec<usize> = ROOM_SIZES.map(|s| room_span(s).count()).collect();
        assert_eq!(widths, vec![4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_turns_are_perpendicular() {
        for heading in Heading::ALL {
            for turn in heading.turns() {
                let (a, b) = (heading.delta(), turn.delta());
                assert_eq!(a.0 * b.0 + a.1 * b.1, 0);
            }
        }
    }
}

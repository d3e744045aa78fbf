//! Grid archive holding one elite per descriptor cell.

use crate::compute::problems::Problem;
use crate::schema::{ArchiveSnapshot, DescriptorSpace, FitnessRule};

use super::chromosome::{Chromosome, Evaluation};
use super::error::SearchError;

/// Square grid of optional elites, stored flat with `(ix, iy) -> ix * side + iy`.
pub struct EliteGrid<P: Problem> {
    side: usize,
    space: DescriptorSpace,
    fitness: FitnessRule,
    cells: Vec<Option<Chromosome<P>>>,
}

impl<P: Problem> Clone for EliteGrid<P> {
    fn clone(&self) -> Self {
        Self {
            side: self.side,
            space: self.space.clone(),
            fitness: self.fitness,
            cells: self.cells.clone(),
        }
    }
}

impl<P: Problem> EliteGrid<P> {
    /// Create an empty grid. `side` must be non-zero.
    pub fn new(side: usize, space: DescriptorSpace, fitness: FitnessRule) -> Self {
        assert!(side > 0, "grid side must be non-zero");
        Self {
            side,
            space,
            fitness,
            cells: (0..side * side).map(|_| None).collect(),
        }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn space(&self) -> &DescriptorSpace {
        &self.space
    }

    pub fn fitness_rule(&self) -> FitnessRule {
        self.fitness
    }

    /// Total number of cells.
    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Fraction of occupied cells.
    pub fn coverage(&self) -> f64 {
        self.len() as f64 / self.capacity() as f64
    }

    #[inline]
    fn index(&self, ix: usize, iy: usize) -> usize {
        debug_assert!(ix < self.side && iy < self.side);
        ix * self.side + iy
    }

    /// Occupant of `(ix, iy)`, if any.
    pub fn get(&self, ix: usize, iy: usize) -> Option<&Chromosome<P>> {
        if ix >= self.side || iy >= self.side {
            return None;
        }
        self.cells[self.index(ix, iy)].as_ref()
    }

    /// All elites in row-major order.
    pub fn elites(&self) -> impl Iterator<Item = &Chromosome<P>> {
        self.cells.iter().flatten()
    }

    /// Cell the chromosome maps to. Requires an evaluated chromosome.
    pub fn cell_of(
        &self,
        problem: &P,
        chromosome: &Chromosome<P>,
    ) -> Result<(usize, usize), SearchError> {
        let info = chromosome.info().ok_or(SearchError::NotEvaluated)?;
        let descriptor = problem.behavior_descriptor(info)?;
        Ok(self.space.cell(descriptor, self.side))
    }

    /// Place `chromosome` if it beats the occupant of its cell under the grid's fitness rule.
    ///
    /// Returns whether the cell changed. Ties keep the incumbent.
    pub fn try_place(
        &mut self,
        problem: &P,
        chromosome: Chromosome<P>,
    ) -> Result<bool, SearchError> {
        let rule = self.fitness;
        self.try_place_by(problem, chromosome, |e| rule.score(e))
    }

    /// Like [`try_place`](Self::try_place) with an explicit fitness function.
    pub fn try_place_by<F>(
        &mut self,
        problem: &P,
        chromosome: Chromosome<P>,
        fitness: F,
    ) -> Result<bool, SearchError>
    where
        F: Fn(&Evaluation) -> f64,
    {
        let (ix, iy) = self.cell_of(problem, &chromosome)?;
        let challenger = chromosome
            .evaluation()
            .map(&fitness)
            .ok_or(SearchError::NotEvaluated)?;

        let index = self.index(ix, iy);
        let slot = &mut self.cells[index];
        let replace = match slot.as_ref().and_then(|c| c.evaluation()) {
            None => true,
            Some(incumbent) => challenger > fitness(incumbent),
        };

        if replace {
            log::debug!("Cell ({ix}, {iy}) takes new elite with fitness {challenger:.4}");
            *slot = Some(chromosome);
        }
        Ok(replace)
    }

    /// Serializable view of the grid.
    pub fn snapshot(&self, iter: usize) -> ArchiveSnapshot<P::Control> {
        let grid = self
            .cells
            .chunks(self.side)
            .map(|row| {
                row.iter()
                    .map(|cell| cell.as_ref().and_then(Chromosome::to_record))
                    .collect()
            })
            .collect();

        ArchiveSnapshot {
            iter,
            space_size: self.capacity(),
            coverage: self.coverage(),
            grid,
        }
    }
}

//! The MAP-Elites evolution loop.

use crate::compute::problems::Problem;
use crate::schema::SearchConfig;

use super::archive::EliteGrid;
use super::chromosome::Chromosome;
use super::error::SearchError;
use super::evaluator::evaluate_batch;
use super::rng::SearchRng;
use super::snapshot::{NullSink, SnapshotSink};

/// Lifecycle of the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// No archive has been seeded yet.
    Uninitialized,
    /// Freshly seeded from a random population.
    Seeded,
    /// At least one step has evolved the archive.
    Stepping,
}

/// Counters for one initialization or step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepReport {
    /// Iteration index after the step.
    pub iteration: usize,
    /// Chromosomes generated.
    pub offspring: usize,
    /// Offspring produced by crossover (then mutation) rather than plain mutation.
    pub crossovers: usize,
    /// Offspring excluded because evaluation or descriptor projection failed.
    pub failed: usize,
    /// Cells whose elite changed.
    pub replacements: usize,
    /// Archive coverage after the step.
    pub coverage: f64,
}

/// Result of a call to [`MapElites::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// Fewer than two elites existed, so the archive was seeded again from scratch.
    Reseeded(StepReport),
    /// The archive was evolved.
    Evolved(StepReport),
}

impl StepOutcome {
    pub fn report(&self) -> &StepReport {
        match self {
            StepOutcome::Reseeded(report) | StepOutcome::Evolved(report) => report,
        }
    }
}

/// Summary of [`MapElites::run`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub steps: usize,
    pub reseeds: usize,
    pub evaluations: u64,
    pub coverage: f64,
    pub best_quality: Option<f64>,
}

/// MAP-Elites search over a problem.
///
/// Owns the archive, the random source and the snapshot sink. Every random
/// draw and every archive placement happens on the caller's thread in a fixed
/// order; only evaluation is parallel, so a seeded run is reproducible.
pub struct MapElites<P: Problem, S = NullSink> {
    problem: P,
    config: SearchConfig,
    rng: SearchRng,
    archive: EliteGrid<P>,
    phase: RunPhase,
    iteration: usize,
    evaluations: u64,
    sink: S,
}

impl<P: Problem> MapElites<P> {
    /// Create an engine without snapshot output.
    pub fn new(problem: P, config: SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        problem.descriptor_space().validate()?;

        let archive = EliteGrid::new(
            config.space_size,
            problem.descriptor_space().clone(),
            config.fitness,
        );

        Ok(Self {
            rng: SearchRng::from_seed_option(config.random_seed),
            problem,
            config,
            archive,
            phase: RunPhase::Uninitialized,
            iteration: 0,
            evaluations: 0,
            sink: NullSink,
        })
    }
}

impl<P: Problem, S: SnapshotSink<P::Control>> MapElites<P, S> {
    /// Replace the snapshot sink.
    pub fn with_sink<T: SnapshotSink<P::Control>>(self, sink: T) -> MapElites<P, T> {
        MapElites {
            problem: self.problem,
            config: self.config,
            rng: self.rng,
            archive: self.archive,
            phase: self.phase,
            iteration: self.iteration,
            evaluations: self.evaluations,
            sink,
        }
    }

    pub fn problem(&self) -> &P {
        &self.problem
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn archive(&self) -> &EliteGrid<P> {
        &self.archive
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Total chromosome evaluations across the engine's lifetime.
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Start a new run: reset the random source to the configured seed and
    /// seed a fresh archive with `space_size²` random chromosomes.
    pub fn initialize(&mut self) -> Result<StepReport, SearchError> {
        self.rng = SearchRng::from_seed_option(self.config.random_seed);
        self.seed_random()
    }

    /// Start a new run from an explicit population instead of random chromosomes.
    pub fn initialize_with(
        &mut self,
        population: Vec<Chromosome<P>>,
    ) -> Result<StepReport, SearchError> {
        self.rng = SearchRng::from_seed_option(self.config.random_seed);
        self.seed_from(population)
    }

    fn seed_random(&mut self) -> Result<StepReport, SearchError> {
        let population: Vec<Chromosome<P>> = (0..self.config.capacity())
            .map(|_| Chromosome::random(&self.problem, &mut self.rng))
            .collect();
        self.seed_from(population)
    }

    fn seed_from(
        &mut self,
        mut population: Vec<Chromosome<P>>,
    ) -> Result<StepReport, SearchError> {
        self.archive = EliteGrid::new(
            self.config.space_size,
            self.problem.descriptor_space().clone(),
            self.config.fitness,
        );
        self.iteration = 0;

        let batch = evaluate_batch(&self.problem, &mut population);
        self.evaluations += population.len() as u64;
        let (replacements, skipped) = self.place_all(population)?;
        self.phase = RunPhase::Seeded;

        let report = StepReport {
            iteration: 0,
            offspring: batch.evaluated + batch.failed,
            crossovers: 0,
            failed: batch.failed + skipped,
            replacements,
            coverage: self.archive.coverage(),
        };
        log::info!(
            "Seeded {} archive: {}/{} cells ({:.1}% coverage)",
            self.problem.name(),
            self.archive.len(),
            self.archive.capacity(),
            report.coverage * 100.0
        );

        self.emit_snapshot()?;
        Ok(report)
    }

    /// Run one evolutionary step, seeding first if the archive was never initialized.
    ///
    /// With fewer than two elites there is no parent pair, so the archive is
    /// seeded again from a fresh random stream instead.
    pub fn step(&mut self) -> Result<StepOutcome, SearchError> {
        if self.phase == RunPhase::Uninitialized {
            return self.initialize().map(StepOutcome::Reseeded);
        }

        let elites: Vec<Chromosome<P>> = self.archive.elites().cloned().collect();
        if elites.len() < 2 {
            log::warn!(
                "Degenerate archive with {} elite(s); re-seeding {}",
                elites.len(),
                self.problem.name()
            );
            self.rng = self.rng.fork();
            return self.seed_random().map(StepOutcome::Reseeded);
        }

        let mut report = StepReport::default();
        let mut children = Vec::with_capacity(self.config.children_num);

        for _ in 0..self.config.changes_in_iter {
            let p1 = &elites[self.rng.index(elites.len())];
            let p2 = &elites[self.rng.index(elites.len())];

            for _ in 0..self.config.children_num {
                let child = if self.rng.chance(self.config.p_crossover) {
                    report.crossovers += 1;
                    p1.crossover(p2, &self.problem, &mut self.rng).mutate(
                        &self.problem,
                        self.config.mut_rate,
                        &mut self.rng,
                    )
                } else {
                    p1.mutate(&self.problem, self.config.mut_rate, &mut self.rng)
                };
                children.push(child);
            }

            let batch = evaluate_batch(&self.problem, &mut children);
            self.evaluations += children.len() as u64;
            report.offspring += children.len();
            report.failed += batch.failed;

            let (replacements, skipped) = self.place_all(children.drain(..))?;
            report.replacements += replacements;
            report.failed += skipped;
        }

        self.iteration += 1;
        self.phase = RunPhase::Stepping;
        report.iteration = self.iteration;
        report.coverage = self.archive.coverage();

        log::info!(
            "Iteration {}: {} offspring, {} replacements, {:.1}% coverage",
            self.iteration,
            report.offspring,
            report.replacements,
            report.coverage * 100.0
        );

        self.emit_snapshot()?;
        Ok(StepOutcome::Evolved(report))
    }

    /// Initialize if needed, then run `steps` steps.
    pub fn run(&mut self, steps: usize) -> Result<RunSummary, SearchError> {
        if self.phase == RunPhase::Uninitialized {
            self.initialize()?;
        }

        let mut reseeds = 0;
        for _ in 0..steps {
            if let StepOutcome::Reseeded(_) = self.step()? {
                reseeds += 1;
            }
        }

        Ok(RunSummary {
            steps,
            reseeds,
            evaluations: self.evaluations,
            coverage: self.archive.coverage(),
            best_quality: self.best_quality(),
        })
    }

    /// Highest quality among current elites.
    pub fn best_quality(&self) -> Option<f64> {
        self.archive
            .elites()
            .filter_map(Chromosome::quality)
            .max_by(|a, b| a.total_cmp(b))
    }

    /// Place evaluated chromosomes in order, returning `(replacements, skipped)`.
    ///
    /// Unevaluated chromosomes and those whose info lacks a descriptor field
    /// are skipped; any other placement error aborts.
    fn place_all<I>(&mut self, chromosomes: I) -> Result<(usize, usize), SearchError>
    where
        I: IntoIterator<Item = Chromosome<P>>,
    {
        let mut replacements = 0;
        let mut skipped = 0;

        for chromosome in chromosomes {
            if !chromosome.is_evaluated() {
                continue;
            }
            match self.archive.try_place(&self.problem, chromosome) {
                Ok(true) => replacements += 1,
                Ok(false) => {}
                Err(SearchError::MissingDescriptorField(field)) => {
                    log::warn!("Skipping chromosome without descriptor field '{field}'");
                    skipped += 1;
                }
                Err(err) => return Err(err),
            }
        }

        Ok((replacements, skipped))
    }

    fn emit_snapshot(&mut self) -> Result<(), SearchError> {
        let snapshot = self.archive.snapshot(self.iteration);
        self.sink.record(self.problem.name(), &snapshot)?;
        Ok(())
    }
}

//! Benchmarks for MAP-Elites evaluation, placement and stepping.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use pcg_elites::{
    compute::{
        evolution::{Chromosome, EliteGrid, MapElites, SearchRng, evaluate_batch},
        problems::{BinaryProblem, Problem},
    },
    schema::{BinaryConfig, FitnessRule, SearchConfig},
};

fn problem(side: usize) -> BinaryProblem {
    BinaryProblem::new(BinaryConfig {
        width: side,
        height: side,
        path: side * 2,
    })
    .unwrap()
}

fn random_batch(
    problem: &BinaryProblem,
    size: usize,
    seed: u64,
) -> Vec<Chromosome<BinaryProblem>> {
    let mut rng = SearchRng::new(seed);
    (0..size)
        .map(|_| Chromosome::random(problem, &mut rng))
        .collect()
}

fn bench_evaluate_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate_batch");

    for side in [20, 40, 60] {
        let problem = problem(side);
        let batch = random_batch(&problem, 100, 1);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", side, side)),
            &side,
            |b, _| {
                b.iter(|| {
                    let mut batch = batch.clone();
                    evaluate_batch(&problem, black_box(&mut batch))
                });
            },
        );
    }

    group.finish();
}

fn bench_try_place(c: &mut Criterion) {
    let problem = problem(20);
    let mut batch = random_batch(&problem, 500, 2);
    evaluate_batch(&problem, &mut batch);

    c.bench_function("try_place_500", |b| {
        b.iter(|| {
            let mut grid = EliteGrid::new(
                10,
                problem.descriptor_space().clone(),
                FitnessRule::Quality,
            );
            for chromosome in batch.iter().cloned() {
                let _ = grid.try_place(&problem, black_box(chromosome));
            }
            grid.len()
        });
    });
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");
    group.sample_size(10);

    for space_size in [5, 10, 20] {
        let config = SearchConfig {
            space_size,
            random_seed: Some(7),
            ..Default::default()
        };
        let mut engine = MapElites::new(problem(30), config).unwrap();
        engine.initialize().unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", space_size, space_size)),
            &space_size,
            |b, _| {
                b.iter(|| engine.step().unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_evaluate_batch, bench_try_place, bench_step);
criterion_main!(benches);

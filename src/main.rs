//! PCG Elites CLI - Run MAP-Elites searches and generator sweeps.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::error::Error;
use std::fs;
use std::path::Path;
use std::time::Instant;

use serde::Serialize;

use pcg_elites::{
    compute::{
        evolution::{JsonSnapshotWriter, MapElites, SearchRng, SnapshotSink, StepOutcome},
        generators::{
            AGENT_SWEEP_INCREASES, AgentDigger, BSP_SWEEP_DEPTHS, BspGenerator, GenerationReport,
        },
        problems::{BinaryControl, BinaryProblem},
    },
    schema::{BinaryConfig, RunConfig},
};

/// Levels generated per parameter combination in a sweep.
const AGENT_SWEEP_SAMPLES: usize = 25;
const AGENT_SWEEP_STEPS: usize = 500;
const BSP_SWEEP_SAMPLES: usize = 10;

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    let result = match args.get(1).map(String::as_str) {
        Some("--example") => print_example_config(),
        Some("run") if args.len() > 2 => {
            let iterations = args.get(3).and_then(|s| s.parse().ok());
            run_search(Path::new(&args[2]), iterations)
        }
        Some("sweep") if args.len() > 3 => {
            let seed = args.get(4).and_then(|s| s.parse().ok());
            run_sweep(&args[2], Path::new(&args[3]), seed)
        }
        _ => {
            print_usage(&args[0]);
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} run <config.json> [iterations]", program);
    eprintln!("       {} sweep <agent|bsp> <out_dir> [seed]", program);
    eprintln!("       {} --example", program);
    eprintln!();
    eprintln!("Run a MAP-Elites search over binary dungeon levels, or sweep a");
    eprintln!("constructive generator's parameters.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  config.json  Path to run configuration file");
    eprintln!("  iterations   Number of steps (default: from config)");
    eprintln!("  out_dir      Directory generated levels are written to");
    eprintln!();
    eprintln!("Example configuration is generated with --example flag.");
}

fn print_example_config() -> Result<(), Box<dyn Error>> {
    println!("Example configuration (config.json):");
    println!("{}", serde_json::to_string_pretty(&RunConfig::default())?);
    Ok(())
}

fn run_search(config_path: &Path, iterations: Option<usize>) -> Result<(), Box<dyn Error>> {
    let config_str = fs::read_to_string(config_path)
        .map_err(|e| format!("reading {}: {}", config_path.display(), e))?;
    let config: RunConfig = serde_json::from_str(&config_str)?;
    config.validate()?;

    let iterations = iterations.unwrap_or(config.iterations);
    let problem = BinaryProblem::new(config.problem)?;

    println!("PCG Elites Search");
    println!("=================");
    println!(
        "Level: {}x{} (path target {})",
        config.problem.width, config.problem.height, config.problem.path
    );
    println!(
        "Archive: {}x{} cells, {} evaluations/step",
        config.search.space_size,
        config.search.space_size,
        config.search.evaluations_per_step()
    );
    println!("Fitness: {:?}", config.search.fitness);
    println!("Iterations: {}", iterations);
    println!();

    let engine = MapElites::new(problem, config.search)?;
    match config.output_dir {
        Some(dir) => {
            println!("Snapshots: {}", dir.display());
            drive(engine.with_sink(JsonSnapshotWriter::new(dir)), iterations)
        }
        None => drive(engine, iterations),
    }
}

fn drive<S>(
    mut engine: MapElites<BinaryProblem, S>,
    iterations: usize,
) -> Result<(), Box<dyn Error>>
where
    S: SnapshotSink<BinaryControl>,
{
    let start = Instant::now();
    let seeded = engine.initialize()?;
    println!("Initial archive: {} elites", engine.archive().len());
    log::debug!("Initial placement: {:?}", seeded);

    let mut reseeds = 0;
    for i in 0..iterations {
        let outcome = engine.step()?;
        if let StepOutcome::Reseeded(_) = outcome {
            reseeds += 1;
        }

        // Print progress every 10%
        if (i + 1) % (iterations / 10).max(1) == 0 {
            let report = outcome.report();
            println!(
                "  Step {}/{}: coverage={:.3}, replacements={}, failed={}, best={:.4}",
                i + 1,
                iterations,
                report.coverage,
                report.replacements,
                report.failed,
                engine.best_quality().unwrap_or(0.0)
            );
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("Final archive:");
    println!(
        "  Elites: {}/{}",
        engine.archive().len(),
        engine.archive().capacity()
    );
    println!("  Coverage: {:.4}", engine.archive().coverage());
    println!("  Best quality: {:.4}", engine.best_quality().unwrap_or(0.0));
    println!("  Reseeds: {}", reseeds);
    println!(
        "Time: {:.2}s ({} evaluations)",
        elapsed.as_secs_f32(),
        engine.evaluations()
    );
    Ok(())
}

fn run_sweep(kind: &str, out_dir: &Path, seed: Option<u64>) -> Result<(), Box<dyn Error>> {
    let config = BinaryConfig::default();
    let problem = BinaryProblem::new(config)?;
    let mut rng = SearchRng::from_seed_option(seed);
    let start = Instant::now();
    let mut written = 0;

    match kind {
        "agent" => {
            for &turn in &AGENT_SWEEP_INCREASES {
                for &room in &AGENT_SWEEP_INCREASES {
                    let digger = AgentDigger::new(config.width, config.height, turn, room);
                    for i in 0..AGENT_SWEEP_SAMPLES {
                        let grid = digger.generate(AGENT_SWEEP_STEPS, &mut rng);
                        let params = digger.params(AGENT_SWEEP_STEPS);
                        let report = GenerationReport::score(&problem, params, &grid);
                        let path = out_dir
                            .join("agent")
                            .join(format!("turn{}_room{}_{}.json", turn, room, i));
                        write_report(&path, &report)?;
                        written += 1;
                    }
                }
            }
        }
        "bsp" => {
            for depth in BSP_SWEEP_DEPTHS {
                let generator = BspGenerator::new(config.width, config.height, depth);
                for i in 0..BSP_SWEEP_SAMPLES {
                    let grid = generator.generate(&mut rng);
                    let report = GenerationReport::score(&problem, generator.params(), &grid);
                    let path = out_dir
                        .join("bsp")
                        .join(format!("depth_{}", depth))
                        .join(format!("{}.json", i));
                    write_report(&path, &report)?;
                    written += 1;
                }
            }
        }
        other => {
            return Err(format!("unknown generator '{}' (expected agent or bsp)", other).into());
        }
    }

    println!(
        "Wrote {} levels to {} in {:.2}s",
        written,
        out_dir.display(),
        start.elapsed().as_secs_f32()
    );
    Ok(())
}

fn write_report<T: Serialize>(
    path: &Path,
    report: &GenerationReport<T>,
) -> Result<(), Box<dyn Error>> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, serde_json::to_string(report)?)?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

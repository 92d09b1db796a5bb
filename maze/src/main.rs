mod terminal;

use dotmaze::logging::Stats;
use dotmaze::{ConfigError, EvolutionConfig, Headless, MazeConfig, Simulation};

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use rayon::prelude::*;
use serde::Deserialize;
use tracing::info;

/// Evolve agents across a walled grid.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// RON scenario file; the classic scenario is used if omitted.
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Seed for the run (or the first of several runs).
    #[arg(long, default_value_t = 0xFACA_DEAF)]
    seed: u64,
    /// Overrides the scenario's number of generations.
    #[arg(long)]
    generations: Option<usize>,
    /// Never draw, whatever the scenario says.
    #[arg(long)]
    headless: bool,
    /// Pause between drawn ticks, in milliseconds.
    #[arg(long, default_value_t = 50)]
    delay_ms: u64,
    /// Run this many independently seeded headless runs in
    /// parallel and report statistics over them.
    #[arg(long)]
    runs: Option<usize>,
}

#[derive(Deserialize)]
struct Scenario {
    maze: MazeConfig,
    #[serde(default)]
    evolution: EvolutionConfig,
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let args = Args::parse();

    let mut scenario = match &args.scenario {
        Some(path) => ron::from_str::<Scenario>(&fs::read_to_string(path)?)?,
        None => Scenario {
            maze: MazeConfig::classic(),
            evolution: EvolutionConfig::default(),
        },
    };
    if let Some(generations) = args.generations {
        scenario.evolution.max_generations = generations;
    }
    if args.headless {
        scenario.maze.visualize = false;
    }

    match args.runs {
        Some(runs) => stress_test(&scenario, args.seed, runs),
        None => single_run(scenario, &args),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn single_run(scenario: Scenario, args: &Args) -> Result<(), Box<dyn Error>> {
    let visualize = scenario.maze.visualize;
    let mut simulation = Simulation::with_seed(scenario.maze, scenario.evolution, args.seed)?;
    let summaries = if visualize {
        // Dropping the sink restores the terminal before the report.
        let mut sink = terminal::TerminalSink::new(Duration::from_millis(args.delay_ms))?;
        simulation.run(&mut sink)
    } else {
        simulation.run(&mut Headless)
    };

    for summary in &summaries {
        info!(
            generation = summary.generation,
            ticks = summary.ticks,
            best_fitness = summary.best_fitness,
            goal_arrivals = summary.goal_arrivals,
            "generation finished"
        );
    }
    match summaries.last() {
        Some(last) => println!(
            "{} generation(s), final best fitness {:.6} with {} agent(s) at the goal",
            summaries.len(),
            last.best_fitness,
            last.goal_arrivals
        ),
        None => println!("stopped before the first generation finished"),
    }
    Ok(())
}

fn stress_test(scenario: &Scenario, seed: u64, runs: usize) -> Result<(), Box<dyn Error>> {
    let mut maze = scenario.maze.clone();
    maze.visualize = false;

    let outcomes = (0..runs as u64)
        .into_par_iter()
        .map(|run| {
            let mut simulation = Simulation::with_seed(
                maze.clone(),
                scenario.evolution.clone(),
                seed.wrapping_add(run),
            )?;
            let summaries = simulation.run(&mut Headless);
            let best = summaries
                .iter()
                .map(|s| s.best_fitness)
                .fold(0.0, f64::max);
            let first_arrival = summaries
                .iter()
                .find(|s| s.goal_arrivals > 0)
                .map(|s| s.generation);
            Ok((best, first_arrival))
        })
        .collect::<Result<Vec<(f64, Option<usize>)>, ConfigError>>()?;

    println!(
        "Best fitness over {} runs: {:?}",
        runs,
        Stats::from(outcomes.iter().map(|(best, _)| *best))
    );
    println!(
        "Generation of first goal arrival {:?}, {}% of runs never arrived",
        Stats::from(
            outcomes
                .iter()
                .filter_map(|(_, arrival)| arrival.map(|g| g as f64))
        ),
        outcomes.iter().filter(|(_, a)| a.is_none()).count() as f32 * 100.0 / runs.max(1) as f32,
    );
    Ok(())
}

//! The generation loop tying a [`Population`] to its
//! scenario: ticks every agent until all have died,
//! records the leader's trail, and evolves the next
//! generation until the configured number of
//! generations is reached.
mod config;
mod render;

use crate::agents::Death;
use crate::errors::{ConfigError, SimulationError};
use crate::geometry::Cell;
use crate::populations::{EvolutionConfig, Population};
pub use config::MazeConfig;
pub use render::{Headless, RenderSink, Snapshot};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, warn};

/// Outcome of one fully-run generation,
/// taken before selection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenerationSummary {
    pub generation: usize,
    /// Ticks until the last agent died.
    pub ticks: usize,
    pub champion_index: usize,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    /// Agents that died on the goal cell.
    pub goal_arrivals: usize,
}

/// A genetic-algorithm run over one scenario.
///
/// The randomness source is owned by the simulation,
/// so a seeded generator makes the whole run reproducible.
pub struct Simulation<R = StdRng> {
    maze: MazeConfig,
    evolution: EvolutionConfig,
    population: Population,
    best_path: Vec<Cell>,
    ticks: usize,
    rng: R,
}

impl Simulation<StdRng> {
    /// Creates a simulation driven by a [`StdRng`] seeded with `seed`.
    ///
    /// # Errors
    /// Returns an error if either configuration is invalid.
    pub fn with_seed(
        maze: MazeConfig,
        evolution: EvolutionConfig,
        seed: u64,
    ) -> Result<Simulation<StdRng>, ConfigError> {
        Simulation::new(maze, evolution, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Simulation<R> {
    /// Creates a simulation with a freshly randomized
    /// population placed on the start cell.
    ///
    /// # Errors
    /// Returns an error if either configuration is invalid.
    ///
    /// # Examples
    /// ```
    /// use dotmaze::{Cell, EvolutionConfig, MazeConfig, Simulation};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let maze = MazeConfig::new(10, 10, 1, Cell::new(5, 1), Cell::new(5, 8), false);
    /// let simulation = Simulation::new(maze, EvolutionConfig::default(), StdRng::seed_from_u64(3))?;
    ///
    /// assert_eq!(simulation.generation(), 0);
    /// assert!(simulation.any_alive());
    /// # Ok::<(), dotmaze::ConfigError>(())
    /// ```
    pub fn new(
        maze: MazeConfig,
        evolution: EvolutionConfig,
        mut rng: R,
    ) -> Result<Simulation<R>, ConfigError> {
        maze.validate()?;
        evolution.validate()?;
        if evolution.elitism != 1 {
            warn!(
                elitism = evolution.elitism,
                "only the single fittest agent is carried over unmodified"
            );
        }
        let population = Population::new(&evolution, maze.start, &mut rng);
        Ok(Simulation {
            maze,
            evolution,
            population,
            best_path: vec![],
            ticks: 0,
            rng,
        })
    }

    /// Records the leader's cell on the trail, then
    /// advances every agent one step. Returns whether
    /// any agent remains alive. Does nothing once every
    /// agent has died.
    pub fn tick(&mut self) -> bool {
        if !self.population.any_alive() {
            return false;
        }
        self.best_path.push(self.population.leader().position());
        self.population
            .step_all(&self.maze.arena(), &self.evolution);
        self.ticks += 1;
        self.population.any_alive()
    }

    pub fn any_alive(&self) -> bool {
        self.population.any_alive()
    }

    /// Ticks until every agent has died and returns
    /// the generation's outcome.
    pub fn run_generation(&mut self) -> GenerationSummary {
        while self.tick() {}
        self.summary()
    }

    /// Returns the current generation's outcome so far.
    pub fn summary(&self) -> GenerationSummary {
        let champion_index = self.population.champion_index();
        GenerationSummary {
            generation: self.population.generation(),
            ticks: self.ticks,
            champion_index,
            best_fitness: self.population.champion().fitness(),
            mean_fitness: self.population.total_fitness() / self.population.len() as f64,
            goal_arrivals: self
                .population
                .agents()
                .filter(|a| a.death() == Some(Death::ReachedGoal))
                .count(),
        }
    }

    /// Performs one generation transition: selection,
    /// crossover and mutation, then puts every agent back
    /// on the start cell and clears the trail.
    ///
    /// # Errors
    /// Returns an error if agents are still alive or the
    /// final generation has been reached.
    pub fn evolve_and_reset(&mut self) -> Result<(), SimulationError> {
        if self.is_done() {
            return Err(SimulationError::Finished {
                generation: self.generation(),
            });
        }
        let alive = self.population.alive_count();
        if alive > 0 {
            return Err(SimulationError::StillRunning { alive });
        }

        let summary = self.summary();
        debug!(
            generation = summary.generation,
            ticks = summary.ticks,
            best_fitness = summary.best_fitness,
            mean_fitness = summary.mean_fitness,
            goal_arrivals = summary.goal_arrivals,
            "evolving generation"
        );

        self.population
            .evolve(&self.evolution, self.maze.start, &mut self.rng);
        self.best_path.clear();
        self.ticks = 0;
        Ok(())
    }

    /// Runs generations until [`is_done`], feeding every tick
    /// to `sink` if the scenario is visualized. Stops early,
    /// between ticks, if the sink asks to. Returns the
    /// outcome of every completed generation.
    ///
    /// [`is_done`]: Simulation::is_done
    ///
    /// # Examples
    /// ```
    /// use dotmaze::{Cell, EvolutionConfig, Headless, MazeConfig, Simulation};
    /// use std::num::NonZeroUsize;
    ///
    /// let maze = MazeConfig::new(10, 10, 1, Cell::new(5, 1), Cell::new(5, 8), false);
    /// let evolution = EvolutionConfig {
    ///     population_size: NonZeroUsize::new(10).unwrap(),
    ///     brain_size: NonZeroUsize::new(20).unwrap(),
    ///     max_generations: 3,
    ///     ..EvolutionConfig::default()
    /// };
    /// let mut simulation = Simulation::with_seed(maze, evolution, 42)?;
    /// let summaries = simulation.run(&mut Headless);
    ///
    /// assert_eq!(summaries.len(), 3);
    /// assert!(simulation.is_done());
    /// # Ok::<(), dotmaze::ConfigError>(())
    /// ```
    pub fn run<S: RenderSink + ?Sized>(&mut self, sink: &mut S) -> Vec<GenerationSummary> {
        let mut summaries = vec![];
        while !self.is_done() {
            loop {
                if !sink.keep_running() {
                    return summaries;
                }
                if !self.any_alive() {
                    break;
                }
                self.tick();
                if self.maze.visualize {
                    sink.render(&self.snapshot());
                }
            }
            summaries.push(self.summary());
            if let Err(e) = self.evolve_and_reset() {
                warn!("{}", e);
                break;
            }
        }
        summaries
    }

    /// Returns the current generation number.
    pub fn generation(&self) -> usize {
        self.population.generation()
    }

    /// Returns whether the configured number of
    /// generations has been reached.
    pub fn is_done(&self) -> bool {
        self.generation() >= self.evolution.max_generations
    }

    /// Returns the render data for the current tick.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            generation: self.generation(),
            bounds: (self.maze.width, self.maze.height),
            offset: self.maze.offset,
            agent_positions: self.population.agents().map(|a| a.position()).collect(),
            leader_position: self.population.leader().position(),
            best_path: self.best_path.clone(),
            walls: self.maze.walls.clone(),
            goal: self.maze.goal,
        }
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// The leader's cells this generation, oldest first.
    pub fn best_path(&self) -> &[Cell] {
        &self.best_path
    }

    pub fn maze_config(&self) -> &MazeConfig {
        &self.maze
    }

    pub fn evolution_config(&self) -> &EvolutionConfig {
        &self.evolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    fn small(max_generations: usize) -> (MazeConfig, EvolutionConfig) {
        (
            MazeConfig::new(10, 10, 1, Cell::new(5, 1), Cell::new(5, 8), false),
            EvolutionConfig {
                population_size: NonZeroUsize::new(5).unwrap(),
                brain_size: NonZeroUsize::new(20).unwrap(),
                max_generations,
                ..EvolutionConfig::default()
            },
        )
    }

    #[test]
    fn trail_records_leader_before_each_step() {
        let (maze, evolution) = small(1);
        let mut simulation = Simulation::with_seed(maze, evolution, 5).unwrap();
        let mut expected = vec![];
        while simulation.any_alive() {
            expected.push(simulation.population().leader().position());
            simulation.tick();
        }
        assert_eq!(simulation.best_path(), expected.as_slice());
        assert_eq!(expected[0], Cell::new(5, 1));
        assert!(!simulation.tick());
        assert_eq!(simulation.best_path().len(), expected.len());
    }

    #[test]
    fn evolving_while_alive_is_refused() {
        let (maze, evolution) = small(2);
        let mut simulation = Simulation::with_seed(maze, evolution, 5).unwrap();
        assert_eq!(
            simulation.evolve_and_reset(),
            Err(SimulationError::StillRunning { alive: 5 })
        );
    }

    #[test]
    fn evolving_clears_trail_and_advances_generation() {
        let (maze, evolution) = small(2);
        let mut simulation = Simulation::with_seed(maze, evolution, 5).unwrap();
        simulation.run_generation();
        assert!(!simulation.best_path().is_empty());

        simulation.evolve_and_reset().unwrap();
        assert_eq!(simulation.generation(), 1);
        assert!(simulation.best_path().is_empty());
        assert!(simulation.any_alive());
        assert!(!simulation.is_done());
        assert_eq!(simulation.summary().ticks, 0);
    }

    #[test]
    fn evolving_past_the_last_generation_is_refused() {
        let (maze, evolution) = small(1);
        let mut simulation = Simulation::with_seed(maze, evolution, 5).unwrap();
        simulation.run_generation();
        simulation.evolve_and_reset().unwrap();
        assert!(simulation.is_done());

        simulation.run_generation();
        assert_eq!(
            simulation.evolve_and_reset(),
            Err(SimulationError::Finished { generation: 1 })
        );
    }

    #[test]
    fn same_seed_same_run() {
        let run = |seed| {
            let (maze, evolution) = small(4);
            let mut simulation = Simulation::with_seed(maze, evolution, seed).unwrap();
            simulation.run(&mut Headless)
        };
        assert_eq!(run(17), run(17));
    }

    struct Recorder {
        frames: usize,
        budget: usize,
    }

    impl RenderSink for Recorder {
        fn render(&mut self, snapshot: &Snapshot) {
            assert_eq!(snapshot.agent_positions.len(), 5);
            assert!(!snapshot.best_path.is_empty());
            self.frames += 1;
        }

        fn keep_running(&mut self) -> bool {
            self.frames < self.budget
        }
    }

    #[test]
    fn sink_can_stop_the_run_between_ticks() {
        let (mut maze, evolution) = small(50);
        maze.visualize = true;
        let mut simulation = Simulation::with_seed(maze, evolution, 5).unwrap();
        let mut sink = Recorder {
            frames: 0,
            budget: 2,
        };
        let summaries = simulation.run(&mut sink);
        assert_eq!(sink.frames, 2);
        assert!(summaries.is_empty());
        assert_eq!(simulation.best_path().len(), 2);
    }

    #[test]
    fn hidden_scenarios_are_not_rendered() {
        let (maze, evolution) = small(1);
        let mut simulation = Simulation::with_seed(maze, evolution, 5).unwrap();
        let mut sink = Recorder {
            frames: 0,
            budget: usize::MAX,
        };
        let summaries = simulation.run(&mut sink);
        assert_eq!(sink.frames, 0);
        assert_eq!(summaries.len(), 1);
    }
}

//! Evolves a population of agents to cross a walled grid
//! from a start cell to a goal cell, using a genetic
//! algorithm over fixed-length sequences of acceleration
//! commands.
//!
//! Agents are not reactive: each one's whole trajectory is
//! determined by its [`Brain`], replayed one command per tick
//! until it hits a wall, leaves the grid, reaches the goal,
//! or runs out of commands. Its fitness is then scored from
//! its distance to the goal, with a bonus for arriving early.
//! Each generation keeps its fittest agent unmodified and
//! fills the rest by fitness-proportionate selection,
//! single-point crossover and per-command mutation.
//!
//! All randomness flows through a generator owned by the
//! [`Simulation`], so a seeded run is fully reproducible.
//!
//! # Example usage: crossing an open grid
//! ```
//! use dotmaze::{Cell, EvolutionConfig, MazeConfig, Simulation};
//! use std::num::NonZeroUsize;
//!
//! let maze = MazeConfig::new(10, 10, 1, Cell::new(5, 1), Cell::new(5, 8), false)
//!     .with_cell_wall(0, 4, 5, 1);
//! let evolution = EvolutionConfig {
//!     population_size: NonZeroUsize::new(30).unwrap(),
//!     brain_size: NonZeroUsize::new(20).unwrap(),
//!     max_generations: 10,
//!     ..EvolutionConfig::default()
//! };
//!
//! let mut simulation = Simulation::with_seed(maze, evolution, 0xDEAD_BEEF).unwrap();
//! while !simulation.is_done() {
//!     let summary = simulation.run_generation();
//!     println!(
//!         "generation {}: best fitness {:.4}, {} at the goal",
//!         summary.generation, summary.best_fitness, summary.goal_arrivals
//!     );
//!     if let Err(e) = simulation.evolve_and_reset() {
//!         eprintln!("{}", e);
//!         break;
//!     }
//! }
//! ```

mod agents;
mod errors;
mod genome;
mod geometry;
mod populations;
mod rng;
mod simulation;

pub use agents::*;
pub use errors::*;
pub use genome::*;
pub use geometry::*;
pub use populations::*;
pub use simulation::*;

use super::Population;
use crate::agents::{Agent, Death};

use serde::Serialize;

use std::fmt;

/// Defines different possible reporting levels for logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportingLevel {
    /// Clones the entire population.
    AllAgents,
    /// Clones only the population champion.
    Champion,
    /// Clones no agents.
    NoAgents,
}

/// A snapshot of a scored generation.
#[derive(Clone, Debug)]
pub struct Log {
    pub generation_number: usize,
    pub generation_sample: GenerationMemberRecord,
    pub fitness: Stats,
    pub steps: Stats,
    pub goal_arrivals: usize,
}

impl fmt::Display for Log {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "generation {}: {} at goal, best fitness {:.6} (median {:.6}), \
            steps {}..{} (mean {:.1})",
            self.generation_number,
            self.goal_arrivals,
            self.fitness.maximum,
            self.fitness.median,
            self.steps.minimum,
            self.steps.maximum,
            self.steps.mean,
        )
    }
}

/// A struct for reporting basic statistical data.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Stats {
    pub maximum: f64,
    pub minimum: f64,
    pub mean: f64,
    pub median: f64,
}

impl Stats {
    /// Returns statistics about numbers in a sequence.
    /// An empty sequence yields all zeroes.
    ///
    /// # Examples
    /// ```
    /// use dotmaze::logging::Stats;
    ///
    /// // Fitnesses of five agents: four died 1, 2, 3 and 4 cells
    /// // from the goal, one reached it in 4 steps.
    /// let fitnesses = [0.5, 0.2, 1.0 + 1.0 / 16.0, 0.1, 1.0 / 17.0];
    /// let stats = Stats::from(fitnesses.iter().copied());
    /// assert_eq!(stats.maximum, 1.0625);
    /// assert_eq!(stats.minimum, 1.0 / 17.0);
    /// assert_eq!(stats.median, 0.2);
    /// assert!((stats.mean - 0.384_265).abs() < 1e-6);
    /// ```
    pub fn from(data: impl Iterator<Item = f64>) -> Stats {
        let mut data: Vec<f64> = data.collect();
        if data.is_empty() {
            return Stats {
                maximum: 0.0,
                minimum: 0.0,
                mean: 0.0,
                median: 0.0,
            };
        }
        let (mut max, mut min, mut sum) = (f64::MIN, f64::MAX, 0.0);
        for d in &data {
            max = d.max(max);
            min = d.min(min);
            sum += d;
        }
        let mean = sum / data.len() as f64;
        data.sort_unstable_by(f64::total_cmp);
        let mid = data.len() / 2;
        let median = if data.len() % 2 == 0 {
            (data[mid - 1] + data[mid]) / 2.0
        } else {
            data[mid]
        };
        Stats {
            maximum: max,
            minimum: min,
            mean,
            median,
        }
    }
}

/// A reporting-level dependant store
/// of agents from a generation.
#[derive(Clone, Debug)]
pub enum GenerationMemberRecord {
    /// Every agent, in population order.
    Agents(Vec<Agent>),
    /// Only the population champion.
    Champion(Agent),
    /// Empty.
    None,
}

/// A log of the evolution of a population over time.
#[derive(Clone, Debug)]
pub struct EvolutionLogger {
    reporting_level: ReportingLevel,
    logs: Vec<Log>,
}

impl EvolutionLogger {
    /// Returns a logger with the appropiate reporting level.
    ///
    /// # Examples
    /// ```
    /// use dotmaze::logging::{EvolutionLogger, ReportingLevel};
    ///
    /// let logger = EvolutionLogger::new(ReportingLevel::NoAgents);
    /// ```
    pub fn new(reporting_level: ReportingLevel) -> EvolutionLogger {
        EvolutionLogger {
            reporting_level,
            logs: vec![],
        }
    }

    /// Store a snapshot of a population. Meant to be
    /// called once every agent has died, before the
    /// population is evolved.
    ///
    /// # Examples
    /// ```
    /// use dotmaze::{Cell, EvolutionConfig, Population};
    /// use dotmaze::logging::{EvolutionLogger, ReportingLevel};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut logger = EvolutionLogger::new(ReportingLevel::Champion);
    /// let population = Population::new(
    ///     &EvolutionConfig::default(),
    ///     Cell::new(0, 0),
    ///     &mut StdRng::seed_from_u64(0),
    /// );
    ///
    /// // Run the population to exhaustion...
    /// // Then log a snapshot.
    /// logger.log(&population);
    /// assert_eq!(logger.iter().count(), 1);
    /// ```
    pub fn log(&mut self, population: &Population) {
        self.logs.push(Log {
            generation_number: population.generation(),
            generation_sample: match self.reporting_level {
                ReportingLevel::AllAgents => {
                    GenerationMemberRecord::Agents(population.agents().cloned().collect())
                }
                ReportingLevel::Champion => {
                    GenerationMemberRecord::Champion(population.champion().clone())
                }
                ReportingLevel::NoAgents => GenerationMemberRecord::None,
            },
            fitness: Stats::from(population.fitnesses()),
            steps: Stats::from(population.agents().map(|a| a.steps_taken() as f64)),
            goal_arrivals: population
                .agents()
                .filter(|a| a.death() == Some(Death::ReachedGoal))
                .count(),
        })
    }

    /// Iterate over all logged snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &Log> {
        self.logs.iter()
    }

    /// Returns the most recent snapshot, if any.
    pub fn latest(&self) -> Option<&Log> {
        self.logs.last()
    }
}

use crate::agents::{CollisionPolicy, Physics};
use crate::errors::ConfigError;

use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

/// How survivors are drawn from a scored population.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionPolicy {
    /// Fitness-proportionate walk against a single running
    /// total, seeded with the population's total fitness and
    /// decremented across *every* draw of the generation.
    /// Once it is exhausted, every further draw picks the
    /// first agent.
    Legacy,
    /// Conventional roulette wheel: each draw walks from a
    /// fresh uniform value in `[0, total_fitness)`.
    Roulette,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        SelectionPolicy::Legacy
    }
}

/// Configuration data for population generation
/// and evolution.
///
/// # Note
/// All quantities expressing probabilities
/// should be in the range [0.0, 1.0]. This is
/// checked by [`validate`].
///
/// [`validate`]: EvolutionConfig::validate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Chance that each brain command of a
    /// non-elite survivor is re-randomized.
    pub mutation_rate: f64,
    /// Chance that an adjacent pair of non-elite
    /// survivors exchange brain tails.
    pub crossover_rate: f64,
    /// Declared number of elites. Only the single
    /// fittest agent is ever carried over unmodified,
    /// whatever this value is.
    pub elitism: usize,
    /// Number of agents in every generation.
    pub population_size: NonZeroUsize,
    /// Generation count at which evolution halts.
    pub max_generations: usize,
    /// Number of commands in every brain.
    pub brain_size: NonZeroUsize,
    /// Upper bound on each velocity axis.
    pub max_velocity: i32,
    pub selection: SelectionPolicy,
    pub collision: CollisionPolicy,
}

impl EvolutionConfig {
    /// Returns the classic configuration: 100 agents with
    /// 200-command brains, evolved for 100 generations at
    /// a 0.1 mutation rate and 0.3 crossover rate.
    pub const fn classic() -> EvolutionConfig {
        EvolutionConfig {
            mutation_rate: 0.1,
            crossover_rate: 0.3,
            elitism: 1,
            // SAFETY: 100 is a valid NonZeroUsize.
            population_size: unsafe { NonZeroUsize::new_unchecked(100) },
            max_generations: 100,
            // SAFETY: 200 is a valid NonZeroUsize.
            brain_size: unsafe { NonZeroUsize::new_unchecked(200) },
            max_velocity: 5,
            selection: SelectionPolicy::Legacy,
            collision: CollisionPolicy::Legacy,
        }
    }

    /// Returns the movement tunables agents are advanced with.
    pub fn physics(&self) -> Physics {
        Physics {
            max_velocity: self.max_velocity,
            collision: self.collision,
        }
    }

    /// Checks that probabilities lie in [0, 1] and
    /// that the velocity bound is positive.
    ///
    /// # Examples
    /// ```
    /// use dotmaze::EvolutionConfig;
    ///
    /// assert!(EvolutionConfig::default().validate().is_ok());
    /// assert!(EvolutionConfig {
    ///     mutation_rate: 1.5,
    ///     ..EvolutionConfig::default()
    /// }
    /// .validate()
    /// .is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("mutation rate", self.mutation_rate),
            ("crossover rate", self.crossover_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ProbabilityOutOfRange { name, value });
            }
        }
        if self.max_velocity <= 0 {
            return Err(ConfigError::InvalidVelocityBound(self.max_velocity));
        }
        Ok(())
    }
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        EvolutionConfig::classic()
    }
}

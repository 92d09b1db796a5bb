//! A Population is the ordered collection of agents
//! sharing one generation's lifecycle. Agents are
//! stepped together until all have died, then the
//! population is evolved into the next generation
//! through elitist fitness-proportionate selection,
//! single-point crossover, and per-command mutation.
mod config;
pub mod logging;
mod offspring_factory;

use crate::agents::Agent;
use crate::geometry::{Arena, Cell};
use crate::Brain;
pub use config::{EvolutionConfig, SelectionPolicy};
use offspring_factory::OffspringFactory;

use rand::Rng;
use tracing::trace;

/// A population of agents.
#[derive(Clone, Debug)]
pub struct Population {
    agents: Vec<Agent>,
    generation: usize,
}

impl Population {
    /// Creates a population of [`population_size`] agents
    /// with random brains, all at rest on `start`.
    ///
    /// [`population_size`]: EvolutionConfig::population_size
    ///
    /// # Examples
    /// ```
    /// use dotmaze::{Cell, EvolutionConfig, Population};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let config = EvolutionConfig::default();
    /// let population = Population::new(&config, Cell::new(50, 10), &mut StdRng::seed_from_u64(1));
    ///
    /// assert_eq!(population.len(), 100);
    /// assert!(population.agents().all(|a| a.brain().len() == 200));
    /// ```
    pub fn new<R: Rng + ?Sized>(config: &EvolutionConfig, start: Cell, rng: &mut R) -> Population {
        Population {
            agents: (0..config.population_size.get())
                .map(|_| Agent::random(config.brain_size.get(), start, rng))
                .collect(),
            generation: 0,
        }
    }

    /// Creates a generation-0 population from the given agents.
    ///
    /// # Panics
    /// Panics if `agents` is empty, or if their brains are
    /// empty or differ in length.
    pub fn from_agents(agents: Vec<Agent>) -> Population {
        assert!(!agents.is_empty(), "a population needs at least one agent");
        let brain_size = agents[0].brain().len();
        assert!(brain_size > 0, "agents need at least one command");
        assert!(
            agents.iter().all(|a| a.brain().len() == brain_size),
            "all agents of a population need brains of {} commands",
            brain_size
        );
        Population {
            agents,
            generation: 0,
        }
    }

    /// Advances every agent by one tick. Dead agents
    /// are left untouched.
    pub fn step_all(&mut self, arena: &Arena, config: &EvolutionConfig) {
        let physics = config.physics();
        for agent in &mut self.agents {
            agent.advance(arena, &physics);
        }
    }

    /// Returns whether any agent is still moving.
    pub fn any_alive(&self) -> bool {
        self.agents.iter().any(Agent::is_alive)
    }

    pub fn alive_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_alive()).count()
    }

    /// Returns the agent at index 0. The leader keeps
    /// its index for the whole generation, and is not
    /// necessarily the fittest agent.
    pub fn leader(&self) -> &Agent {
        &self.agents[0]
    }

    /// Returns the index of the first agent
    /// holding the highest fitness.
    pub fn champion_index(&self) -> usize {
        fittest_index(&self.agents)
    }

    /// Returns the first agent holding the highest fitness.
    pub fn champion(&self) -> &Agent {
        &self.agents[self.champion_index()]
    }

    pub fn total_fitness(&self) -> f64 {
        self.agents.iter().map(Agent::fitness).sum()
    }

    /// Returns every agent's fitness, in population order.
    pub fn fitnesses(&self) -> impl Iterator<Item = f64> + '_ {
        self.agents.iter().map(Agent::fitness)
    }

    /// Puts every agent back on `start`, alive and at rest.
    pub fn reset(&mut self, start: Cell) {
        for agent in &mut self.agents {
            agent.reset(start);
        }
    }

    /// Draws the survivors of the current generation:
    /// the fittest agent first, followed by fitness-proportionate
    /// draws according to the configured [`SelectionPolicy`].
    /// Survivors are independent copies that keep their
    /// parents' fitness and kinetic state.
    ///
    /// # Examples
    /// ```
    /// use dotmaze::{Agent, Arena, Brain, Cell, EvolutionConfig, Population, Vector};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let arena = Arena { width: 10, height: 10, offset: 1, walls: &[], goal: Cell::new(5, 8) };
    /// let config = EvolutionConfig::default();
    /// let mut population = Population::from_agents(vec![
    ///     Agent::new(Brain::from_accelerations(vec![Vector::new(0, 0)]), Cell::new(5, 1)),
    ///     Agent::new(Brain::from_accelerations(vec![Vector::new(0, 1)]), Cell::new(5, 6)),
    ///     Agent::new(Brain::from_accelerations(vec![Vector::new(1, 0)]), Cell::new(5, 1)),
    /// ]);
    /// population.step_all(&arena, &config);
    ///
    /// let survivors = population.select(&config, &mut StdRng::seed_from_u64(0));
    /// assert_eq!(survivors.len(), 3);
    /// assert_eq!(survivors[0].position(), Cell::new(5, 7));
    /// ```
    pub fn select<R: Rng + ?Sized>(&self, config: &EvolutionConfig, rng: &mut R) -> Vec<Agent> {
        OffspringFactory::new(&self.agents, config, rng).select()
    }

    /// Replaces the population with its offspring, advances
    /// the generation counter, and puts every agent back on
    /// `start`.
    ///
    /// # Panics
    /// Panics if offspring generation changed the
    /// population size or any brain's length.
    pub fn evolve<R: Rng + ?Sized>(&mut self, config: &EvolutionConfig, start: Cell, rng: &mut R) {
        let offspring = OffspringFactory::new(&self.agents, config, rng).generate_offspring();
        assert_eq!(
            offspring.len(),
            self.agents.len(),
            "offspring generation changed the population size"
        );
        let brain_size = self.agents[0].brain().len();
        assert!(
            offspring.iter().all(|a| a.brain().len() == brain_size),
            "offspring generation changed brain lengths"
        );
        self.agents = offspring;
        self.generation += 1;
        self.reset(start);
    }

    /// Returns an iterator over all current agents.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Agent> {
        self.agents.get(index)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Returns the current generation number.
    pub fn generation(&self) -> usize {
        self.generation
    }
}

/// Index of the first agent holding the highest fitness.
fn fittest_index(agents: &[Agent]) -> usize {
    let mut best = 0;
    for (i, agent) in agents.iter().enumerate() {
        if agent.fitness() > agents[best].fitness() {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vector;
    use rand::{rngs::StdRng, SeedableRng};
    use std::num::NonZeroUsize;

    const OPEN: Arena<'static> = Arena {
        width: 10,
        height: 10,
        offset: 1,
        walls: &[],
        goal: Cell::new(5, 8),
    };

    /// An agent that dies after one tick, `dy` cells below (5, 1).
    fn mover(dy: i32) -> Agent {
        Agent::new(
            Brain::from_accelerations(vec![Vector::new(0, dy.signum())]),
            Cell::new(5, 1 + dy - dy.signum()),
        )
    }

    fn scored(dys: &[i32]) -> Population {
        let mut population = Population::from_agents(dys.iter().copied().map(mover).collect());
        population.step_all(&OPEN, &EvolutionConfig::default());
        assert!(!population.any_alive());
        population
    }

    fn config(size: usize) -> EvolutionConfig {
        EvolutionConfig {
            population_size: NonZeroUsize::new(size).unwrap(),
            brain_size: NonZeroUsize::new(1).unwrap(),
            ..EvolutionConfig::default()
        }
    }

    #[test]
    fn champion_ties_resolve_to_first_occurrence() {
        let population = scored(&[0, 3, 3, 1]);
        assert_eq!(population.champion_index(), 1);
        assert_eq!(population.champion().position(), Cell::new(5, 4));
    }

    #[test]
    fn elite_is_the_champion_under_ties() {
        // (4, 7) and (5, 6) are both two cells from the goal.
        let sideways = Agent::new(
            Brain::from_accelerations(vec![Vector::new(1, 0)]),
            Cell::new(3, 7),
        );
        let mut population = Population::from_agents(vec![mover(1), sideways, mover(5)]);
        population.step_all(&OPEN, &EvolutionConfig::default());
        assert_eq!(population.champion_index(), 1);

        for selection in [SelectionPolicy::Legacy, SelectionPolicy::Roulette] {
            let config = EvolutionConfig {
                selection,
                ..config(3)
            };
            let survivors = population.select(&config, &mut StdRng::seed_from_u64(4));
            assert_eq!(survivors[0].position(), Cell::new(4, 7));
            assert_eq!(survivors[0].brain(), population.champion().brain());
        }
    }

    #[test]
    #[should_panic(expected = "at least one command")]
    fn empty_brains_are_refused() {
        Population::from_agents(vec![Agent::new(
            Brain::from_accelerations(vec![]),
            Cell::new(5, 1),
        )]);
    }

    #[test]
    #[should_panic(expected = "brains of 1 commands")]
    fn mismatched_brains_are_refused() {
        Population::from_agents(vec![
            mover(1),
            Agent::new(
                Brain::from_accelerations(vec![Vector::ZERO; 2]),
                Cell::new(5, 1),
            ),
        ]);
    }

    #[test]
    fn legacy_selection_exhausts_then_repeats_the_first_agent() {
        let population = scored(&[0, 1, 2, 3, 4]);
        let survivors = population.select(&config(5), &mut StdRng::seed_from_u64(99));

        let positions: Vec<i32> = survivors.iter().map(|a| a.position().y).collect();
        // Elite (closest to the goal), then the walk exhausts the
        // shared total at the last agent, after which only the
        // first agent is ever picked.
        assert_eq!(positions, [5, 5, 1, 1, 1]);
    }

    #[test]
    fn roulette_selection_draws_fresh_each_time() {
        let population = scored(&[0, 1, 2, 3, 4]);
        let config = EvolutionConfig {
            selection: SelectionPolicy::Roulette,
            ..config(5)
        };
        let mut rng = StdRng::seed_from_u64(4);
        let mut picks = vec![0usize; 5];
        for _ in 0..200 {
            let survivors = population.select(&config, &mut rng);
            assert_eq!(survivors.len(), 5);
            assert_eq!(survivors[0].position().y, 5);
            for agent in &survivors[1..] {
                picks[(agent.position().y - 1) as usize] += 1;
            }
        }
        // The agent closest to the goal dominates the wheel
        // but every agent keeps a nonzero share.
        assert!(picks.iter().all(|&p| p > 0));
        assert_eq!(picks.iter().enumerate().max_by_key(|(_, p)| **p).unwrap().0, 4);
    }

    #[test]
    fn selected_agents_are_independent_copies() {
        let population = scored(&[2, 2]);
        let mut survivors = population.select(&config(2), &mut StdRng::seed_from_u64(0));
        survivors[1].reset(Cell::new(0, 0));
        assert_eq!(population.get(1).unwrap().position(), Cell::new(5, 3));
        assert_eq!(survivors[0].fitness(), population.champion().fitness());
    }

    #[test]
    fn evolution_keeps_size_and_resets_agents() {
        let config = EvolutionConfig {
            population_size: NonZeroUsize::new(7).unwrap(),
            brain_size: NonZeroUsize::new(12).unwrap(),
            ..EvolutionConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(21);
        let start = Cell::new(5, 1);
        let mut population = Population::new(&config, start, &mut rng);
        while population.any_alive() {
            population.step_all(&OPEN, &config);
        }
        let champion = population.champion().brain().clone();

        population.evolve(&config, start, &mut rng);
        assert_eq!(population.generation(), 1);
        assert_eq!(population.len(), 7);
        assert_eq!(population.leader().brain(), &champion);
        assert!(population
            .agents()
            .all(|a| a.is_alive() && a.position() == start && a.fitness() == 0.0));
    }

    #[test]
    fn zero_rates_preserve_selected_brains() {
        let config = EvolutionConfig {
            population_size: NonZeroUsize::new(6).unwrap(),
            brain_size: NonZeroUsize::new(15).unwrap(),
            mutation_rate: 0.0,
            crossover_rate: 0.0,
            ..EvolutionConfig::default()
        };
        let start = Cell::new(5, 1);
        let mut population = Population::new(&config, start, &mut StdRng::seed_from_u64(8));
        while population.any_alive() {
            population.step_all(&OPEN, &config);
        }
        let survivors = population.select(&config, &mut StdRng::seed_from_u64(3));

        population.evolve(&config, start, &mut StdRng::seed_from_u64(3));
        for (survivor, agent) in survivors.iter().zip(population.agents()) {
            assert_eq!(survivor.brain(), agent.brain());
        }
    }

    #[test]
    fn full_mutation_rewrites_every_non_elite() {
        let config = EvolutionConfig {
            population_size: NonZeroUsize::new(4).unwrap(),
            brain_size: NonZeroUsize::new(400).unwrap(),
            mutation_rate: 1.0,
            crossover_rate: 0.0,
            ..EvolutionConfig::default()
        };
        let start = Cell::new(5, 1);
        let mut population = Population::new(&config, start, &mut StdRng::seed_from_u64(8));
        while population.any_alive() {
            population.step_all(&OPEN, &config);
        }
        let survivors = population.select(&config, &mut StdRng::seed_from_u64(3));

        population.evolve(&config, start, &mut StdRng::seed_from_u64(3));
        let mut agents = population.agents();
        assert_eq!(agents.next().unwrap().brain(), survivors[0].brain());
        for (survivor, agent) in survivors[1..].iter().zip(agents) {
            // 400 fresh commands from 9 choices all matching is out of the question.
            assert_ne!(survivor.brain(), agent.brain());
        }
    }
}

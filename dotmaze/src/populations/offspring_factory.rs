use super::*;
use crate::rng;

/// Auxiliary type for offspring generation.
/// Handles selecting survivors from a scored
/// generation, then recombining and mutating
/// them according to the given config.
pub(super) struct OffspringFactory<'a, R: ?Sized> {
    parents: &'a [Agent],
    config: &'a EvolutionConfig,
    rng: &'a mut R,
}

impl<'a, R: Rng + ?Sized> OffspringFactory<'a, R> {
    pub(super) fn new(
        parents: &'a [Agent],
        config: &'a EvolutionConfig,
        rng: &'a mut R,
    ) -> OffspringFactory<'a, R> {
        OffspringFactory {
            parents,
            config,
            rng,
        }
    }

    /// Generate the next generation's agents. Their
    /// kinetic state is still that of their parents.
    pub(super) fn generate_offspring(&mut self) -> Vec<Agent> {
        let mut offspring = self.select();
        self.recombine(&mut offspring);
        offspring
    }

    /// Select as many survivors as there are parents,
    /// the fittest first.
    pub(super) fn select(&mut self) -> Vec<Agent> {
        let mut survivors = Vec::with_capacity(self.parents.len());
        survivors.push(self.elite().clone());

        let total_fitness: f64 = self.parents.iter().map(Agent::fitness).sum();
        let mut running_total = total_fitness;
        for _ in 1..self.parents.len() {
            let draw = rng::uniform(self.rng, running_total);
            let chosen = match self.config.selection {
                SelectionPolicy::Legacy => self.walk(&mut running_total),
                SelectionPolicy::Roulette => {
                    let mut remaining = draw;
                    self.walk(&mut remaining)
                }
            };
            survivors.push(chosen.clone());
        }
        survivors
    }

    /// The first agent holding the highest fitness.
    fn elite(&self) -> &'a Agent {
        &self.parents[fittest_index(self.parents)]
    }

    /// Subtracts fitnesses from `remaining` in population order,
    /// stopping at the first agent that brings it to ≤ 0. Falls
    /// back to the last agent if it never gets there.
    fn walk(&self, remaining: &mut f64) -> &'a Agent {
        for agent in self.parents {
            *remaining -= agent.fitness();
            if *remaining <= 0.0 {
                return agent;
            }
        }
        trace!(remaining = *remaining, "selection walk fell through");
        &self.parents[self.parents.len() - 1]
    }

    /// Cross over adjacent survivor pairs (1, 2), (3, 4), ...
    /// and mutate every survivor but the elite. A survivor
    /// left without a partner is only mutated.
    fn recombine(&mut self, offspring: &mut [Agent]) {
        let mut i = 1;
        while i + 1 < offspring.len() {
            let (head, tail) = offspring.split_at_mut(i + 1);
            let (first, second) = (&mut head[i], &mut tail[0]);
            if rng::chance(self.rng, self.config.crossover_rate) {
                let cut = self.rng.gen_range(0..=first.brain().len());
                Brain::crossover(first.brain_mut(), second.brain_mut(), cut);
            }
            first.brain_mut().mutate(self.config.mutation_rate, self.rng);
            second.brain_mut().mutate(self.config.mutation_rate, self.rng);
            i += 2;
        }
        if let Some(unpaired) = offspring.get_mut(i) {
            unpaired
                .brain_mut()
                .mutate(self.config.mutation_rate, self.rng);
        }
    }
}

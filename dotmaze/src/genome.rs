use crate::geometry::Vector;
use crate::rng;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A brain is an agent's genome: a fixed-length
/// sequence of acceleration commands, replayed one
/// per tick. Every axis of every command lies in {-1, 0, 1}.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brain {
    accelerations: Vec<Vector>,
}

impl Brain {
    /// Returns a brain of `size` randomized commands.
    ///
    /// # Examples
    /// ```
    /// use dotmaze::Brain;
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let brain = Brain::random(200, &mut StdRng::seed_from_u64(7));
    /// assert_eq!(brain.len(), 200);
    /// assert!(brain.accelerations().iter().all(|a| a.x.abs() <= 1 && a.y.abs() <= 1));
    /// ```
    pub fn random<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Brain {
        Brain {
            accelerations: (0..size).map(|_| rng::random_acceleration(rng)).collect(),
        }
    }

    /// Returns a brain replaying exactly the given commands.
    ///
    /// # Panics
    /// Panics if any command has an axis outside {-1, 0, 1}.
    pub fn from_accelerations(accelerations: Vec<Vector>) -> Brain {
        assert!(
            accelerations.iter().all(|a| a.x.abs() <= 1 && a.y.abs() <= 1),
            "acceleration commands must lie in {{-1, 0, 1}} on both axes"
        );
        Brain { accelerations }
    }

    pub fn len(&self) -> usize {
        self.accelerations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accelerations.is_empty()
    }

    /// Returns the command replayed at `step`, if any.
    pub fn get(&self, step: usize) -> Option<Vector> {
        self.accelerations.get(step).copied()
    }

    pub fn accelerations(&self) -> &[Vector] {
        &self.accelerations
    }

    /// Single-point crossover in place. After the call
    /// `first` holds `first[..cut] + second[cut..]` and
    /// `second` holds `second[..cut] + first[cut..]`.
    ///
    /// # Panics
    /// Panics if the brains differ in length or
    /// `cut` exceeds their length.
    ///
    /// # Examples
    /// ```
    /// use dotmaze::{Brain, Vector};
    ///
    /// let mut a = Brain::from_accelerations(vec![Vector::new(1, 1); 4]);
    /// let mut b = Brain::from_accelerations(vec![Vector::new(-1, 0); 4]);
    /// Brain::crossover(&mut a, &mut b, 1);
    ///
    /// assert_eq!(a.get(0), Some(Vector::new(1, 1)));
    /// assert_eq!(a.get(1), Some(Vector::new(-1, 0)));
    /// assert_eq!(b.get(0), Some(Vector::new(-1, 0)));
    /// assert_eq!(b.get(3), Some(Vector::new(1, 1)));
    /// ```
    pub fn crossover(first: &mut Brain, second: &mut Brain, cut: usize) {
        assert_eq!(
            first.len(),
            second.len(),
            "crossover between brains of different lengths"
        );
        assert!(cut <= first.len(), "crossover cut {} out of range", cut);
        first.accelerations[cut..].swap_with_slice(&mut second.accelerations[cut..]);
    }

    /// Replaces each command, independently with probability
    /// `rate`, by a freshly randomized one. Returns the number
    /// of commands replaced.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rate: f64, rng: &mut R) -> usize {
        let mut replaced = 0;
        for acceleration in &mut self.accelerations {
            if rng::chance(rng, rate) {
                *acceleration = rng::random_acceleration(rng);
                replaced += 1;
            }
        }
        replaced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn crossover_preserves_length_for_every_cut() {
        let mut rng = StdRng::seed_from_u64(11);
        for cut in 0..=20 {
            let mut a = Brain::random(20, &mut rng);
            let mut b = Brain::random(20, &mut rng);
            let (old_a, old_b) = (a.clone(), b.clone());
            Brain::crossover(&mut a, &mut b, cut);

            assert_eq!(a.len(), 20);
            assert_eq!(b.len(), 20);
            assert_eq!(a.accelerations()[..cut], old_a.accelerations()[..cut]);
            assert_eq!(a.accelerations()[cut..], old_b.accelerations()[cut..]);
            assert_eq!(b.accelerations()[..cut], old_b.accelerations()[..cut]);
            assert_eq!(b.accelerations()[cut..], old_a.accelerations()[cut..]);
        }
    }

    #[test]
    #[should_panic]
    fn crossover_rejects_mismatched_lengths() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut a = Brain::random(5, &mut rng);
        let mut b = Brain::random(6, &mut rng);
        Brain::crossover(&mut a, &mut b, 2);
    }

    #[test]
    fn zero_rate_mutation_is_identity() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut brain = Brain::random(200, &mut rng);
        let before = brain.clone();
        assert_eq!(brain.mutate(0.0, &mut rng), 0);
        assert_eq!(brain, before);
    }

    #[test]
    fn full_rate_mutation_replaces_every_command() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut brain = Brain::random(200, &mut rng);
        assert_eq!(brain.mutate(1.0, &mut rng), 200);
        assert!(brain
            .accelerations()
            .iter()
            .all(|a| (-1..=1).contains(&a.x) && (-1..=1).contains(&a.y)));
    }

    #[test]
    fn random_brains_cover_every_command() {
        let brain = Brain::random(2000, &mut StdRng::seed_from_u64(9));
        for x in -1..=1 {
            for y in -1..=1 {
                assert!(brain.accelerations().contains(&Vector::new(x, y)));
            }
        }
    }
}

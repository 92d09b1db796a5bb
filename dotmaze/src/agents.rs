//! Agents replay their brain one command per tick,
//! moving through an [`Arena`] until they die.
use crate::geometry::{Arena, Cell, Vector};
use crate::Brain;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// How an agent's position is corrected after
/// moving into a wall along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionPolicy {
    /// Moving forward snaps to the grid coordinate of the
    /// wall's near edge; moving backward (or standing still)
    /// snaps to the grid coordinate of the wall's far edge
    /// minus one cell-size worth of cells. The snapped cell
    /// usually still overlaps the wall, so the agent dies.
    Legacy,
    /// Snaps to the cell immediately outside the wall on the
    /// side the agent came from. The snapped cell never overlaps
    /// the wall that caused the correction.
    Flush,
}

impl Default for CollisionPolicy {
    fn default() -> Self {
        CollisionPolicy::Legacy
    }
}

impl CollisionPolicy {
    /// Returns the corrected grid coordinate along one axis,
    /// given the agent's velocity on that axis and the wall's
    /// pixel extent `[near, far)` on the same axis.
    fn snap(self, velocity: i32, near: i32, far: i32, offset: i32) -> i32 {
        match self {
            CollisionPolicy::Legacy => {
                if velocity > 0 {
                    near.div_euclid(offset)
                } else {
                    far.div_euclid(offset) - offset
                }
            }
            CollisionPolicy::Flush => {
                if velocity > 0 {
                    near.div_euclid(offset) - 1
                } else {
                    -(-far).div_euclid(offset)
                }
            }
        }
    }
}

/// Movement tunables shared by every agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Physics {
    /// Upper bound on each velocity axis. There is
    /// no matching lower bound.
    pub max_velocity: i32,
    pub collision: CollisionPolicy,
}

impl Default for Physics {
    fn default() -> Self {
        Physics {
            max_velocity: 5,
            collision: CollisionPolicy::default(),
        }
    }
}

/// The reason an agent stopped moving.
///
/// When several apply on the same tick, the first
/// listed here wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Death {
    /// Ended the tick overlapping a wall.
    Wall,
    /// Ended the tick outside the grid.
    OutOfBounds,
    /// Ended the tick on the goal cell.
    ReachedGoal,
    /// Replayed every command in its brain.
    Exhausted,
}

/// A single player: a brain plus kinetic state.
#[derive(Clone, Debug)]
pub struct Agent {
    brain: Brain,
    position: Cell,
    velocity: Vector,
    step: usize,
    steps_taken: usize,
    alive: bool,
    fitness: f64,
    death: Option<Death>,
}

impl Agent {
    /// Returns a live agent at rest on `start`.
    pub fn new(brain: Brain, start: Cell) -> Agent {
        Agent {
            brain,
            position: start,
            velocity: Vector::ZERO,
            step: 0,
            steps_taken: 0,
            alive: true,
            fitness: 0.0,
            death: None,
        }
    }

    /// Returns a live agent at rest on `start`
    /// with a randomized brain of `brain_size` commands.
    pub fn random<R: Rng + ?Sized>(brain_size: usize, start: Cell, rng: &mut R) -> Agent {
        Agent::new(Brain::random(brain_size, rng), start)
    }

    /// Replays the next brain command: accelerates, moves
    /// along x then y resolving wall collisions per axis,
    /// and dies if the tick ended in a terminal state,
    /// scoring its fitness once.
    ///
    /// Does nothing if the agent is already dead.
    ///
    /// # Examples
    /// ```
    /// use dotmaze::{Agent, Arena, Brain, Cell, Death, Physics, Vector};
    ///
    /// let brain = Brain::from_accelerations(vec![Vector::new(0, 1); 3]);
    /// let mut agent = Agent::new(brain, Cell::new(5, 1));
    /// let arena = Arena { width: 10, height: 10, offset: 1, walls: &[], goal: Cell::new(5, 4) };
    ///
    /// agent.advance(&arena, &Physics::default());
    /// agent.advance(&arena, &Physics::default());
    ///
    /// // Velocities 1 then 2 carry the agent from y = 1 to y = 4.
    /// assert_eq!(agent.position(), Cell::new(5, 4));
    /// assert_eq!(agent.death(), Some(Death::ReachedGoal));
    /// assert_eq!(agent.fitness(), 1.0 + 1.0 / 4.0);
    /// ```
    pub fn advance(&mut self, arena: &Arena, physics: &Physics) {
        if !self.alive {
            return;
        }

        let acceleration = self.brain.get(self.step).unwrap_or_else(|| {
            panic!(
                "live agent at step {} has a brain of {} commands",
                self.step,
                self.brain.len()
            )
        });
        self.velocity.x = self.velocity.x.saturating_add(acceleration.x).min(physics.max_velocity);
        self.velocity.y = self.velocity.y.saturating_add(acceleration.y).min(physics.max_velocity);

        self.position.x = self.position.x.saturating_add(self.velocity.x);
        if let Some(wall) = arena.collision(self.position) {
            self.position.x =
                physics
                    .collision
                    .snap(self.velocity.x, wall.x, wall.right(), arena.offset);
        }
        self.position.y = self.position.y.saturating_add(self.velocity.y);
        if let Some(wall) = arena.collision(self.position) {
            self.position.y =
                physics
                    .collision
                    .snap(self.velocity.y, wall.y, wall.bottom(), arena.offset);
        }

        self.step += 1;
        self.steps_taken += 1;

        if let Some(death) = self.terminal_state(arena) {
            self.die(death, arena.goal);
        }
    }

    fn terminal_state(&self, arena: &Arena) -> Option<Death> {
        if arena.collision(self.position).is_some() {
            Some(Death::Wall)
        } else if !self.position.within(arena.width, arena.height) {
            Some(Death::OutOfBounds)
        } else if self.position == arena.goal {
            Some(Death::ReachedGoal)
        } else if self.step >= self.brain.len() {
            Some(Death::Exhausted)
        } else {
            None
        }
    }

    fn die(&mut self, death: Death, goal: Cell) {
        self.alive = false;
        self.death = Some(death);
        self.fitness = score(
            self.position.manhattan_distance(goal),
            (death == Death::ReachedGoal).then(|| self.steps_taken),
        );
    }

    /// Puts the agent back on `start` at rest,
    /// alive, unscored, and at the first command.
    /// The brain is left untouched.
    pub fn reset(&mut self, start: Cell) {
        self.position = start;
        self.velocity = Vector::ZERO;
        self.step = 0;
        self.steps_taken = 0;
        self.alive = true;
        self.fitness = 0.0;
        self.death = None;
    }

    pub fn brain(&self) -> &Brain {
        &self.brain
    }

    pub(crate) fn brain_mut(&mut self) -> &mut Brain {
        &mut self.brain
    }

    pub fn position(&self) -> Cell {
        self.position
    }

    pub fn velocity(&self) -> Vector {
        self.velocity
    }

    /// Index of the next brain command to replay.
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// The agent's fitness. Zero while alive;
    /// in `(0, 2]` once dead.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn death(&self) -> Option<Death> {
        self.death
    }
}

/// Fitness of an agent that died `distance` cells (Manhattan)
/// from the goal: `1 / (1 + distance²)`, plus `1 / steps²` if
/// it died on the goal after `steps` ticks.
///
/// # Examples
/// ```
/// use dotmaze::score;
///
/// assert_eq!(score(0, None), 1.0);
/// assert_eq!(score(3, None), 0.1);
/// assert_eq!(score(0, Some(2)), 1.25);
/// ```
pub fn score(distance: i64, goal_steps: Option<usize>) -> f64 {
    let mut fitness = 1.0 / (1.0 + (distance * distance) as f64);
    if let Some(steps) = goal_steps {
        fitness += 1.0 / (steps * steps) as f64;
    }
    fitness
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn open_arena(goal: Cell) -> Arena<'static> {
        Arena {
            width: 10,
            height: 10,
            offset: 1,
            walls: &[],
            goal,
        }
    }

    fn agent_with(commands: &[(i32, i32)], start: Cell) -> Agent {
        Agent::new(
            Brain::from_accelerations(commands.iter().map(|&(x, y)| Vector::new(x, y)).collect()),
            start,
        )
    }

    #[test]
    fn advancing_a_dead_agent_is_a_noop() {
        let arena = open_arena(Cell::new(9, 9));
        let mut agent = agent_with(&[(1, 0)], Cell::new(2, 2));
        agent.advance(&arena, &Physics::default());
        assert!(!agent.is_alive());

        let before = format!("{:?}", agent);
        agent.advance(&arena, &Physics::default());
        assert_eq!(format!("{:?}", agent), before);
    }

    #[test]
    fn velocity_has_no_lower_bound() {
        let arena = Arena {
            width: 10_000,
            height: 10_000,
            offset: 1,
            walls: &[],
            goal: Cell::new(0, 0),
        };
        let physics = Physics::default();
        let mut agent = agent_with(&[(-1, 1); 40], Cell::new(5_000, 0));
        for _ in 0..20 {
            agent.advance(&arena, &physics);
        }
        assert!(agent.is_alive());
        assert_eq!(agent.velocity(), Vector::new(-20, 5));
    }

    #[test]
    fn exhausting_the_brain_scores_distance_only() {
        let goal = Cell::new(5, 8);
        let arena = open_arena(goal);
        let mut agent = agent_with(&[(0, 0); 4], Cell::new(5, 1));
        for _ in 0..4 {
            agent.advance(&arena, &Physics::default());
        }
        assert_eq!(agent.death(), Some(Death::Exhausted));
        assert_eq!(agent.steps_taken(), 4);
        assert_eq!(agent.step(), 4);
        assert_eq!(agent.fitness(), 1.0 / 50.0);
    }

    #[test]
    fn leaving_the_grid_kills() {
        let arena = open_arena(Cell::new(9, 9));
        let mut agent = agent_with(&[(-1, 0); 5], Cell::new(0, 3));
        agent.advance(&arena, &Physics::default());
        assert_eq!(agent.position(), Cell::new(-1, 3));
        assert_eq!(agent.death(), Some(Death::OutOfBounds));
        assert_eq!(agent.fitness(), score(16, None));
    }

    #[test]
    fn reaching_the_goal_beats_stopping_short() {
        let goal = Cell::new(5, 3);
        let arena = open_arena(goal);
        let mut reached = agent_with(&[(0, 1), (0, 0)], Cell::new(5, 1));
        let mut short = agent_with(&[(0, 1), (0, -1)], Cell::new(5, 0));
        for _ in 0..2 {
            reached.advance(&arena, &Physics::default());
            short.advance(&arena, &Physics::default());
        }
        assert_eq!(reached.death(), Some(Death::ReachedGoal));
        assert_eq!(short.death(), Some(Death::Exhausted));
        assert_eq!(reached.steps_taken(), short.steps_taken());
        assert!(reached.fitness() > short.fitness());
    }

    #[test]
    fn fitness_stays_in_range() {
        assert!(score(0, Some(1)) <= 2.0);
        assert!(score(i32::MAX as i64, None) > 0.0);
    }

    #[test]
    fn legacy_snap_uses_grid_division() {
        // Moving right into a wall at pixel x = 20..30 with cells of 5px.
        assert_eq!(CollisionPolicy::Legacy.snap(3, 20, 30, 5), 4);
        // Moving left: far edge 30 / 5 = 6, minus one offset (5) of cells.
        assert_eq!(CollisionPolicy::Legacy.snap(-3, 20, 30, 5), 1);
        assert_eq!(CollisionPolicy::Legacy.snap(0, 20, 30, 5), 1);
    }

    #[test]
    fn legacy_collision_usually_kills() {
        let walls = [Rect::new(6, 0, 2, 10)];
        let arena = Arena {
            width: 10,
            height: 10,
            offset: 1,
            walls: &walls,
            goal: Cell::new(9, 9),
        };
        let mut agent = agent_with(&[(1, 0), (1, 0), (1, 0)], Cell::new(3, 5));
        agent.advance(&arena, &Physics::default());
        agent.advance(&arena, &Physics::default());
        // 3 -> 4 -> 6 collides and x snaps onto the wall's near edge. The
        // y pass still overlaps at rest and snaps to the far edge, 10 - 1.
        assert_eq!(agent.position(), Cell::new(6, 9));
        assert_eq!(agent.death(), Some(Death::Wall));
        assert_eq!(agent.steps_taken(), 2);
    }

    #[test]
    fn flush_snap_leaves_the_wall() {
        let walls = [Rect::new(10, 0, 7, 50)];
        for offset in [1, 3, 5] {
            for velocity in [-4, 0, 4] {
                let x = CollisionPolicy::Flush.snap(velocity, walls[0].x, walls[0].right(), offset);
                let cell = Cell::new(x, 0);
                assert!(
                    crate::first_collision(cell, offset, &walls).is_none(),
                    "offset {} velocity {} snapped to {}",
                    offset,
                    velocity,
                    x
                );
            }
        }
    }

    #[test]
    fn flush_collision_keeps_agent_alive() {
        let walls = [Rect::new(6, 0, 2, 10)];
        let arena = Arena {
            width: 10,
            height: 10,
            offset: 1,
            walls: &walls,
            goal: Cell::new(9, 9),
        };
        let physics = Physics {
            collision: CollisionPolicy::Flush,
            ..Physics::default()
        };
        let mut agent = agent_with(&[(1, 0), (1, 0), (0, 0), (0, 0)], Cell::new(3, 5));
        agent.advance(&arena, &physics);
        agent.advance(&arena, &physics);
        assert_eq!(agent.position(), Cell::new(5, 5));
        assert!(agent.is_alive());
    }

    #[test]
    fn wall_over_goal_withholds_bonus() {
        let goal = Cell::new(5, 3);
        let walls = [Rect::of_cell(goal, 1)];
        let arena = Arena {
            width: 10,
            height: 10,
            offset: 1,
            walls: &walls,
            goal,
        };
        let mut agent = agent_with(&[(0, 1), (0, 0)], Cell::new(5, 1));
        agent.advance(&arena, &Physics::default());
        agent.advance(&arena, &Physics::default());
        // Moving down onto the wall snaps to its near edge, i.e. the goal row.
        assert_eq!(agent.position(), goal);
        assert_eq!(agent.death(), Some(Death::Wall));
        assert_eq!(agent.fitness(), 1.0);
    }

    #[test]
    fn reset_restores_initial_state() {
        let arena = open_arena(Cell::new(9, 9));
        let mut agent = agent_with(&[(1, 1), (1, 1)], Cell::new(2, 2));
        agent.advance(&arena, &Physics::default());
        agent.advance(&arena, &Physics::default());
        let brain = agent.brain().clone();

        agent.reset(Cell::new(2, 2));
        assert!(agent.is_alive());
        assert_eq!(agent.position(), Cell::new(2, 2));
        assert_eq!(agent.velocity(), Vector::ZERO);
        assert_eq!(agent.step(), 0);
        assert_eq!(agent.fitness(), 0.0);
        assert_eq!(agent.death(), None);
        assert_eq!(agent.brain(), &brain);
    }
}

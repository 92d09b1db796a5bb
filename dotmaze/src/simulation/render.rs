use crate::geometry::{Cell, Rect};

use serde::Serialize;

/// Read-only render data for one tick.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub generation: usize,
    /// Grid width and height, in cells.
    pub bounds: (i32, i32),
    /// Pixel size of a cell.
    pub offset: i32,
    /// Every agent's cell, in population order.
    pub agent_positions: Vec<Cell>,
    pub leader_position: Cell,
    /// The leader's cells this generation, oldest first.
    pub best_path: Vec<Cell>,
    pub walls: Vec<Rect>,
    pub goal: Cell,
}

/// A passive display fed by [`Simulation::run`].
///
/// [`Simulation::run`]: crate::Simulation::run
pub trait RenderSink {
    /// Draws a snapshot. Called once per tick.
    fn render(&mut self, snapshot: &Snapshot);

    /// Polled once per tick, before the tick runs.
    /// Returning `false` stops the run between ticks.
    fn keep_running(&mut self) -> bool {
        true
    }
}

/// A sink that draws nothing and never stops the run.
#[derive(Clone, Copy, Debug, Default)]
pub struct Headless;

impl RenderSink for Headless {
    fn render(&mut self, _snapshot: &Snapshot) {}
}

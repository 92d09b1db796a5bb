use crate::geometry::{Cell, Rect};

use std::error::Error;
use std::fmt;

/// An error type indicating a configuration
/// a simulation cannot be built from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The grid has no cells.
    EmptyGrid { width: i32, height: i32 },
    /// The cell size is not positive.
    InvalidOffset(i32),
    /// The grid's pixel extent does not fit in `i32`.
    GridTooLarge { width: i32, height: i32, offset: i32 },
    /// A wall's far edge does not fit in `i32`.
    WallOutOfRange(Rect),
    /// A named cell (start or goal) lies outside the grid.
    CellOutOfBounds { name: &'static str, cell: Cell },
    /// A named probability lies outside [0, 1].
    ProbabilityOutOfRange { name: &'static str, value: f64 },
    /// The velocity bound is not positive.
    InvalidVelocityBound(i32),
}

/// An error type indicating a generation
/// transition that cannot take place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationError {
    /// Some agents are still alive.
    StillRunning { alive: usize },
    /// The configured number of generations has been reached.
    Finished { generation: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { width, height } => {
                write!(f, "grid of {}x{} cells has no cells", width, height)
            }
            Self::InvalidOffset(offset) => write!(f, "cell size {} is not positive", offset),
            Self::GridTooLarge {
                width,
                height,
                offset,
            } => write!(
                f,
                "grid of {}x{} cells of {}px exceeds the pixel range",
                width, height, offset
            ),
            Self::WallOutOfRange(wall) => write!(
                f,
                "wall at ({}, {}) sized {}x{} exceeds the pixel range",
                wall.x, wall.y, wall.width, wall.height
            ),
            Self::CellOutOfBounds { name, cell } => {
                write!(f, "{} cell {} lies outside the grid", name, cell)
            }
            Self::ProbabilityOutOfRange { name, value } => {
                write!(f, "{} of {} is not a probability", name, value)
            }
            Self::InvalidVelocityBound(bound) => {
                write!(f, "maximum velocity {} is not positive", bound)
            }
        }
    }
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StillRunning { alive } => write!(
                f,
                "attempted evolution while {} agent(s) are still alive",
                alive
            ),
            Self::Finished { generation } => write!(
                f,
                "attempted evolution past the final generation {}",
                generation
            ),
        }
    }
}

impl Error for ConfigError {}
impl Error for SimulationError {}

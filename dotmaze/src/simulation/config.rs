use crate::errors::ConfigError;
use crate::geometry::{Arena, Cell, Rect};

use serde::{Deserialize, Serialize};

/// The static scenario a simulation runs in.
///
/// Walls are pixel-space rectangles, checked for
/// collisions in the order they were added.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeConfig {
    /// Grid width, in cells.
    pub width: i32,
    /// Grid height, in cells.
    pub height: i32,
    /// Pixel size of a cell.
    pub offset: i32,
    pub start: Cell,
    pub goal: Cell,
    /// Whether the simulation feeds a display sink.
    pub visualize: bool,
    #[serde(default)]
    pub walls: Vec<Rect>,
}

impl MazeConfig {
    /// Returns a scenario without walls.
    ///
    /// # Examples
    /// ```
    /// use dotmaze::{Cell, MazeConfig};
    ///
    /// let maze = MazeConfig::new(10, 10, 1, Cell::new(5, 1), Cell::new(5, 8), false)
    ///     .with_cell_wall(0, 4, 6, 1);
    ///
    /// assert!(maze.validate().is_ok());
    /// assert_eq!(maze.walls.len(), 1);
    /// ```
    pub fn new(
        width: i32,
        height: i32,
        offset: i32,
        start: Cell,
        goal: Cell,
        visualize: bool,
    ) -> MazeConfig {
        MazeConfig {
            width,
            height,
            offset,
            start,
            goal,
            visualize,
            walls: vec![],
        }
    }

    /// Returns the classic scenario: a 100×100 grid of
    /// 5px cells, with a wall spanning the left three
    /// quarters of the grid between start and goal.
    pub fn classic() -> MazeConfig {
        MazeConfig::new(100, 100, 5, Cell::new(50, 10), Cell::new(50, 90), true)
            .with_cell_wall(0, 50, 75, 10)
    }

    /// Appends a wall given in pixels.
    pub fn with_wall(mut self, wall: Rect) -> MazeConfig {
        self.walls.push(wall);
        self
    }

    /// Appends a wall covering `width` × `height` cells
    /// with its top-left cell at `(x, y)`.
    pub fn with_cell_wall(self, x: i32, y: i32, width: i32, height: i32) -> MazeConfig {
        let offset = self.offset;
        self.with_wall(Rect::from_cells(x, y, width, height, offset))
    }

    /// Checks that the grid is non-empty, the cell size
    /// positive, and that start and goal lie on the grid.
    /// The grid and every wall must also fit in `i32` pixels.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        if self.offset <= 0 {
            return Err(ConfigError::InvalidOffset(self.offset));
        }
        if self.width.checked_mul(self.offset).is_none()
            || self.height.checked_mul(self.offset).is_none()
        {
            return Err(ConfigError::GridTooLarge {
                width: self.width,
                height: self.height,
                offset: self.offset,
            });
        }
        if let Some(wall) = self.walls.iter().find(|wall| !wall.is_representable()) {
            return Err(ConfigError::WallOutOfRange(*wall));
        }
        for (name, cell) in [("start", self.start), ("goal", self.goal)] {
            if !cell.within(self.width, self.height) {
                return Err(ConfigError::CellOutOfBounds { name, cell });
            }
        }
        Ok(())
    }

    /// Returns the view of the scenario agents move through.
    pub fn arena(&self) -> Arena<'_> {
        Arena {
            width: self.width,
            height: self.height,
            offset: self.offset,
            walls: &self.walls,
            goal: self.goal,
        }
    }
}

//! Grid cells, pixel-space rectangles, and the
//! wall collision test used by agent movement.
use serde::{Deserialize, Serialize};

use std::fmt;

/// A grid cell coordinate. Agents occupy exactly
/// one cell; the pixel area of a cell is
/// `[x·offset, y·offset, offset, offset]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    /// Returns the cell at `(x, y)`.
    pub const fn new(x: i32, y: i32) -> Cell {
        Cell { x, y }
    }

    /// Returns the Manhattan distance between two cells.
    ///
    /// # Examples
    /// ```
    /// use dotmaze::Cell;
    ///
    /// assert_eq!(Cell::new(5, 1).manhattan_distance(Cell::new(2, 8)), 10);
    /// ```
    pub fn manhattan_distance(self, other: Cell) -> i64 {
        (self.x as i64 - other.x as i64).abs() + (self.y as i64 - other.y as i64).abs()
    }

    /// Returns whether the cell lies inside a grid
    /// of `width` × `height` cells, i.e. in `[0, width) × [0, height)`.
    pub fn within(self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < width && self.y < height
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Cell {
        Cell { x, y }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An integer 2-D vector, used both for
/// accelerations and velocities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vector {
    pub x: i32,
    pub y: i32,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Vector {
        Vector { x, y }
    }
}

/// An axis-aligned rectangle in pixel space.
///
/// Rectangles with a non-positive width or height
/// are empty and never intersect anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Rect {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns the pixel rectangle covered by `cell`.
    ///
    /// # Examples
    /// ```
    /// use dotmaze::{Cell, Rect};
    ///
    /// assert_eq!(Rect::of_cell(Cell::new(3, 4), 5), Rect::new(15, 20, 5, 5));
    /// ```
    pub fn of_cell(cell: Cell, offset: i32) -> Rect {
        Rect::from_cells(cell.x, cell.y, 1, 1, offset)
    }

    /// Returns the pixel rectangle covering a block of
    /// `width` × `height` cells whose top-left cell is `(x, y)`.
    ///
    /// Coordinates saturate at the `i32` bounds; such a
    /// rectangle fails [`Rect::is_representable`].
    pub fn from_cells(x: i32, y: i32, width: i32, height: i32, offset: i32) -> Rect {
        Rect::new(
            x.saturating_mul(offset),
            y.saturating_mul(offset),
            width.saturating_mul(offset),
            height.saturating_mul(offset),
        )
    }

    /// Pixel coordinate one past the rectangle's right edge.
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Pixel coordinate one past the rectangle's bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Returns whether two rectangles overlap. Rectangles
    /// that merely share an edge do not intersect.
    ///
    /// # Examples
    /// ```
    /// use dotmaze::Rect;
    ///
    /// let wall = Rect::new(0, 10, 20, 5);
    /// assert!(wall.intersects(&Rect::new(19, 14, 5, 5)));
    /// assert!(!wall.intersects(&Rect::new(20, 10, 5, 5)));
    /// ```
    pub fn intersects(&self, other: &Rect) -> bool {
        self.overlaps(other.span())
    }

    /// Returns whether both edges fit in `i32`.
    pub fn is_representable(&self) -> bool {
        self.x.checked_add(self.width).is_some() && self.y.checked_add(self.height).is_some()
    }

    fn span(&self) -> Span {
        Span {
            x: self.x as i64,
            y: self.y as i64,
            width: self.width as i64,
            height: self.height as i64,
        }
    }

    fn overlaps(&self, other: Span) -> bool {
        let own = self.span();
        own.width > 0
            && own.height > 0
            && other.width > 0
            && other.height > 0
            && own.x < other.x + other.width
            && other.x < own.x + own.width
            && own.y < other.y + other.height
            && other.y < own.y + own.height
    }
}

/// A pixel rectangle widened to `i64`, so cells
/// far outside the grid still have an area.
#[derive(Clone, Copy)]
struct Span {
    x: i64,
    y: i64,
    width: i64,
    height: i64,
}

impl Span {
    fn of_cell(cell: Cell, offset: i32) -> Span {
        let offset = offset as i64;
        Span {
            x: cell.x as i64 * offset,
            y: cell.y as i64 * offset,
            width: offset,
            height: offset,
        }
    }
}

/// The static surroundings an agent moves through:
/// grid bounds in cells, the pixel size of a cell,
/// the walls in declaration order, and the goal cell.
#[derive(Clone, Copy, Debug)]
pub struct Arena<'a> {
    pub width: i32,
    pub height: i32,
    pub offset: i32,
    pub walls: &'a [Rect],
    pub goal: Cell,
}

impl<'a> Arena<'a> {
    /// Returns the first wall, in declaration order,
    /// overlapping the pixel area of `cell`.
    pub fn collision(&self, cell: Cell) -> Option<&'a Rect> {
        first_collision(cell, self.offset, self.walls)
    }
}

/// Returns the first wall in `walls` whose pixel
/// rectangle intersects the pixel area of `cell`,
/// or `None` if the cell is clear.
///
/// # Examples
/// ```
/// use dotmaze::{first_collision, Cell, Rect};
///
/// let walls = [Rect::new(0, 0, 10, 10), Rect::new(5, 5, 10, 10)];
/// assert_eq!(first_collision(Cell::new(1, 1), 5, &walls), Some(&walls[0]));
/// assert_eq!(first_collision(Cell::new(2, 2), 5, &walls), Some(&walls[1]));
/// assert_eq!(first_collision(Cell::new(3, 0), 5, &walls), None);
/// ```
pub fn first_collision(cell: Cell, offset: i32, walls: &[Rect]) -> Option<&Rect> {
    let area = Span::of_cell(cell, offset);
    walls.iter().find(|wall| wall.overlaps(area))
}

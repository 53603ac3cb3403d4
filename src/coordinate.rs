//! Cell addressing on a square board.

use core::fmt;

/// Orthogonal step direction. `ALL` lists them in the fixed probing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// The direction pointing the other way.
    pub fn reverse(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }
}

/// A `(row, col)` pair, 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    row: usize,
    col: usize,
}

impl Coordinate {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    /// Returns `true` if the coordinate lies within an `size`×`size` board.
    pub fn in_bounds(&self, size: usize) -> bool {
        self.row < size && self.col < size
    }

    /// Row-major index into a `size`×`size` grid.
    pub fn index(&self, size: usize) -> usize {
        self.row * size + self.col
    }

    /// Inverse of [`Coordinate::index`].
    pub fn from_index(idx: usize, size: usize) -> Self {
        Self::new(idx / size, idx % size)
    }

    /// One step towards `dir`, or `None` when that leaves the board.
    pub fn step(&self, dir: Direction, size: usize) -> Option<Self> {
        let (row, col) = match dir {
            Direction::Up => (self.row.checked_sub(1)?, self.col),
            Direction::Right => (self.row, self.col + 1),
            Direction::Down => (self.row + 1, self.col),
            Direction::Left => (self.row, self.col.checked_sub(1)?),
        };
        let next = Self::new(row, col);
        next.in_bounds(size).then_some(next)
    }

    /// In-bounds orthogonal neighbours, in `Direction::ALL` order.
    pub fn neighbors(self, size: usize) -> impl Iterator<Item = Coordinate> {
        Direction::ALL
            .into_iter()
            .filter_map(move |dir| self.step(dir, size))
    }

    /// In-bounds cells of the 3×3 square centred here, the centre included.
    pub fn surrounding(self, size: usize) -> impl Iterator<Item = Coordinate> {
        let rows = self.row.saturating_sub(1)..=(self.row + 1).min(size.saturating_sub(1));
        let cols = self.col.saturating_sub(1)..=(self.col + 1).min(size.saturating_sub(1));
        rows.flat_map(move |r| cols.clone().map(move |c| Coordinate::new(r, c)))
            .filter(move |c| c.in_bounds(size))
    }
}

impl From<(usize, usize)> for Coordinate {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

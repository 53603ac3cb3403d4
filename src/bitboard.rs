//! A runtime-sized bit grid.
//!
//! Cells of a `size×size` board are packed row-major into a vector of
//! unsigned words `T`. Used for ship occupancy and placement halos, where
//! overlap tests reduce to word-wise `AND`s.

use alloc::vec::Vec;
use core::ops::{BitOr, BitOrAssign};
use core::{fmt, mem};
use num_traits::{PrimInt, Unsigned, Zero};

use crate::coordinate::Coordinate;

/// Errors returned by bit grid operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitGridError {
    /// Row or column index is out of bounds [0..size).
    IndexOutOfBounds { row: usize, col: usize },
}

impl fmt::Display for BitGridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitGridError::IndexOutOfBounds { row, col } => {
                write!(f, "IndexOutOfBounds: row={}, col={}", row, col)
            }
        }
    }
}

/// A `size×size` grid of bits stored in words of type `T`.
#[derive(Clone, PartialEq, Eq)]
pub struct BitGrid<T = u64>
where
    T: PrimInt + Unsigned + Zero,
{
    size: usize,
    words: Vec<T>,
}

impl<T> BitGrid<T>
where
    T: PrimInt + Unsigned + Zero,
{
    const WORD_BITS: usize = mem::size_of::<T>() * 8;

    /// Create an empty grid (all bits cleared).
    pub fn new(size: usize) -> Self {
        let cells = size * size;
        let len = cells.div_ceil(Self::WORD_BITS);
        let mut words = Vec::with_capacity(len);
        words.resize(len, T::zero());
        BitGrid { size, words }
    }

    /// Side length of the grid.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Gets the bit at `coord`.
    pub fn get(&self, coord: Coordinate) -> Result<bool, BitGridError> {
        let (word, bit) = self.locate(coord)?;
        Ok(((self.words[word] >> bit) & T::one()) != T::zero())
    }

    /// Sets the bit at `coord`.
    pub fn set(&mut self, coord: Coordinate) -> Result<(), BitGridError> {
        let (word, bit) = self.locate(coord)?;
        self.words[word] = self.words[word] | (T::one() << bit);
        Ok(())
    }

    /// True when both grids share at least one set cell.
    pub fn intersects(&self, other: &Self) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .any(|(a, b)| !(*a & *b).is_zero())
    }

    #[inline]
    fn locate(&self, coord: Coordinate) -> Result<(usize, usize), BitGridError> {
        if !coord.in_bounds(self.size) {
            return Err(BitGridError::IndexOutOfBounds {
                row: coord.row(),
                col: coord.col(),
            });
        }
        let idx = coord.index(self.size);
        Ok((idx / Self::WORD_BITS, idx % Self::WORD_BITS))
    }
}

impl<T> BitOrAssign<&BitGrid<T>> for BitGrid<T>
where
    T: PrimInt + Unsigned + Zero,
{
    fn bitor_assign(&mut self, rhs: &BitGrid<T>) {
        debug_assert_eq!(self.size, rhs.size);
        for (a, b) in self.words.iter_mut().zip(rhs.words.iter()) {
            *a = *a | *b;
        }
    }
}

impl<T> BitOr for &BitGrid<T>
where
    T: PrimInt + Unsigned + Zero,
{
    type Output = BitGrid<T>;

    fn bitor(self, rhs: Self) -> BitGrid<T> {
        let mut out = self.clone();
        out |= rhs;
        out
    }
}

impl<T> fmt::Debug for BitGrid<T>
where
    T: PrimInt + Unsigned + Zero,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BitGrid<{}, {}>:", core::any::type_name::<T>(), self.size)?;
        fmt::Display::fmt(self, f)
    }
}

impl<T> fmt::Display for BitGrid<T>
where
    T: PrimInt + Unsigned + Zero,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.size {
            for c in 0..self.size {
                let bit = if self.get(Coordinate::new(r, c)).unwrap_or(false) {
                    '■'
                } else {
                    '□'
                };
                write!(f, "{} ", bit)?;
            }
            if r + 1 < self.size {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

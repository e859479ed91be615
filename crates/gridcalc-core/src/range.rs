//! Inclusive coordinate pairs (cell ranges)

use crate::cell::CellRef;
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// An inclusive pair of grid coordinates (e.g., "A1:A3")
///
/// The pair is stored exactly as written. A reversed pair (start below or
/// to the right of end) is representable; what it expands to is decided by
/// the grid resolving it, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRefArray {
    /// First coordinate of the pair
    pub start: CellRef,
    /// Second coordinate of the pair
    pub end: CellRef,
}

impl CellRefArray {
    /// Create a coordinate pair. Start/end are kept as given.
    pub fn new(start: CellRef, end: CellRef) -> Self {
        Self { start, end }
    }

    /// Parse a pair from "A1:B2" notation
    ///
    /// Both halves must be valid coordinates; their ordering is not
    /// checked.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        let Some((start, end)) = s.split_once(':') else {
            return Err(Error::InvalidRange(format!("missing ':' in '{}'", s)));
        };

        Ok(Self::new(CellRef::parse(start)?, CellRef::parse(end)?))
    }

    /// Number of rows covered; 0 when the pair is row-reversed
    pub fn row_count(&self) -> u32 {
        if self.end.row < self.start.row {
            0
        } else {
            self.end.row - self.start.row + 1
        }
    }

    /// Number of columns covered; 0 when the pair is column-reversed
    pub fn col_count(&self) -> u16 {
        if self.end.col < self.start.col {
            0
        } else {
            self.end.col - self.start.col + 1
        }
    }

    /// Total number of cells covered
    pub fn cell_count(&self) -> u64 {
        self.row_count() as u64 * self.col_count() as u64
    }

    /// Check whether a cell lies within the pair's rectangle
    pub fn contains(&self, cell: &CellRef) -> bool {
        cell.row >= self.start.row
            && cell.row <= self.end.row
            && cell.col >= self.start.col
            && cell.col <= self.end.col
    }

    /// Iterate the covered cells row by row
    ///
    /// Yields nothing when the pair is reversed on either axis.
    pub fn cells(&self) -> CellRefArrayIter {
        CellRefArrayIter {
            array: *self,
            row: self.start.row,
            col: self.start.col,
            done: self.end.row < self.start.row || self.end.col < self.start.col,
        }
    }

    /// Format as "A1:B2"
    pub fn to_a1_string(&self) -> String {
        format!("{}:{}", self.start.to_a1_string(), self.end.to_a1_string())
    }
}

impl fmt::Display for CellRefArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellRefArray {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Iterator over the cells covered by a [`CellRefArray`]
pub struct CellRefArrayIter {
    array: CellRefArray,
    row: u32,
    col: u16,
    done: bool,
}

impl Iterator for CellRefArrayIter {
    type Item = CellRef;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let cell = CellRef::new(self.row, self.col);

        if self.col == self.array.end.col {
            self.col = self.array.start.col;
            if self.row == self.array.end.row {
                self.done = true;
            } else {
                self.row += 1;
            }
        } else {
            self.col += 1;
        }

        Some(cell)
    }
}

//! # gridcalc-core
//!
//! Grid addressing vocabulary for the gridcalc formula engine.
//!
//! This crate provides the types shared by everything that talks about a
//! grid of cells:
//! - [`CellRef`] - a single A1-style coordinate
//! - [`CellRefArray`] - an inclusive coordinate pair ("A1:A3")
//! - [`Grid`] - the capability trait formula evaluation reads cells through
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_core::{CellRef, CellRefArray};
//!
//! let cell = CellRef::parse("B2").unwrap();
//! assert_eq!(cell.row, 1);
//! assert_eq!(cell.col, 1);
//!
//! let array = CellRefArray::parse("A1:A3").unwrap();
//! assert_eq!(array.cells().count(), 3);
//! ```

pub mod cell;
pub mod error;
pub mod grid;
pub mod range;

// Re-exports for convenience
pub use cell::CellRef;
pub use error::{Error, Result};
pub use grid::Grid;
pub use range::{CellRefArray, CellRefArrayIter};

/// Maximum number of rows a coordinate may address
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns a coordinate may address
pub const MAX_COLS: u16 = 16_384;

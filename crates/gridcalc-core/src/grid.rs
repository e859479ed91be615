//! The grid capability consumed by formula evaluation

use crate::cell::CellRef;
use crate::range::CellRefArray;

/// Read-only access to a grid of numeric cells
///
/// Formula evaluation depends only on this trait, never on a concrete
/// storage type. Implementations must be deterministic: the same
/// coordinate yields the same value for the lifetime of an evaluation.
pub trait Grid {
    /// Value stored at a single cell
    fn value_for_cell(&self, cell: &CellRef) -> f64;

    /// Expand a coordinate pair into the ordered cell references it covers
    ///
    /// The grid owns the expansion order, including what a reversed pair
    /// means. [`CellRefArray::cells`] gives the row-major expansion for
    /// grids that want the natural one.
    fn cell_references_from_array(&self, array: &CellRefArray) -> Vec<CellRef>;
}

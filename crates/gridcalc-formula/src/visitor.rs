//! Tree-rewrite passes over expression trees

use crate::ast::{AggregateExpr, Expr};
use crate::error::FormulaResult;
use gridcalc_core::Grid;

/// Node-replacement strategy for [`rewrite`]
pub trait ExpressionVisitor {
    /// Offer a replacement for `expr`
    ///
    /// `Ok(None)` keeps the node; [`rewrite`] then recurses into its
    /// children.
    fn visit(&self, expr: &Expr) -> FormulaResult<Option<Expr>>;
}

/// Apply `visitor` over a tree, rebuilding any node it does not replace
pub fn rewrite(expr: &Expr, visitor: &dyn ExpressionVisitor) -> FormulaResult<Expr> {
    if let Some(replacement) = visitor.visit(expr)? {
        return Ok(replacement);
    }

    match expr {
        Expr::BinaryOp { op, left, right } => Ok(Expr::BinaryOp {
            op: *op,
            left: Box::new(rewrite(left, visitor)?),
            right: Box::new(rewrite(right, visitor)?),
        }),
        Expr::Aggregate(agg) => {
            let children = agg
                .children()
                .iter()
                .map(|child| rewrite(child, visitor))
                .collect::<FormulaResult<Vec<_>>>()?;
            Ok(Expr::Aggregate(AggregateExpr::new(agg.function(), children)))
        }
        Expr::Block(items) => {
            let items = items
                .iter()
                .map(|item| rewrite(item, visitor))
                .collect::<FormulaResult<Vec<_>>>()?;
            Ok(Expr::Block(items))
        }
        other => Ok(other.clone()),
    }
}

/// Rewrite an optional subtree; an absent subtree becomes [`Expr::Empty`]
/// rather than failing
pub fn rewrite_opt(
    expr: Option<&Expr>,
    visitor: &dyn ExpressionVisitor,
) -> FormulaResult<Expr> {
    match expr {
        Some(expr) => rewrite(expr, visitor),
        None => Ok(Expr::Empty),
    }
}

/// Rewrites cell and range references into values read from a grid
///
/// Single references become [`Expr::Number`]; ranges expand (in the order
/// the grid decides) into an [`Expr::Block`] of resolved values, the
/// sequence shape aggregates flatten while reducing.
pub struct GridVisitor<'g> {
    grid: &'g dyn Grid,
}

impl<'g> GridVisitor<'g> {
    /// Visitor reading through the given grid
    pub fn new(grid: &'g dyn Grid) -> Self {
        Self { grid }
    }

    /// The grid this visitor resolves against
    pub fn grid(&self) -> &dyn Grid {
        self.grid
    }
}

impl ExpressionVisitor for GridVisitor<'_> {
    fn visit(&self, expr: &Expr) -> FormulaResult<Option<Expr>> {
        match expr {
            Expr::CellRef(cell) => Ok(Some(Expr::Number(self.grid.value_for_cell(cell)))),
            Expr::RangeRef(array) => {
                let values = self
                    .grid
                    .cell_references_from_array(array)
                    .iter()
                    .map(|cell| Expr::Number(self.grid.value_for_cell(cell)))
                    .collect();
                Ok(Some(Expr::Block(values)))
            }
            _ => Ok(None),
        }
    }
}

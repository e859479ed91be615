//! Formula expression tree types

use crate::error::{FormulaError, FormulaResult};
use crate::functions::AggregateFunction;
use gridcalc_core::{CellRef, CellRefArray};
use std::fmt;
use std::sync::Arc;

/// Formula expression AST
///
/// Nodes are immutable once built; child subtrees are exclusively owned by
/// their parent.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal
    Number(f64),
    /// String literal
    Text(String),
    /// Single cell reference, replaced by a value during grid resolution
    CellRef(CellRef),
    /// Range reference, expanded during grid resolution
    RangeRef(CellRefArray),
    /// Binary arithmetic
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Variadic function call: SUM, MIN, and registered extensions
    Aggregate(AggregateExpr),
    /// Ordered sequence produced by range expansion; aggregates flatten
    /// one level of these when reducing
    Block(Vec<Expr>),
    /// Semantic no-op expression
    Empty,
}

/// Binary arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOperator {
    /// Map an operator token's text to its operator
    pub fn from_symbol(symbol: &str) -> FormulaResult<Self> {
        match symbol {
            "+" => Ok(BinaryOperator::Add),
            "-" => Ok(BinaryOperator::Subtract),
            "*" => Ok(BinaryOperator::Multiply),
            "/" => Ok(BinaryOperator::Divide),
            other => Err(FormulaError::UnexpectedToken(other.to_string())),
        }
    }

    /// The operator's source symbol
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
        }
    }

    /// Apply the operator to two scalars
    ///
    /// Division follows IEEE-754 `f64` rules: dividing by zero yields an
    /// infinity or NaN rather than an error.
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            BinaryOperator::Add => left + right,
            BinaryOperator::Subtract => left - right,
            BinaryOperator::Multiply => left * right,
            BinaryOperator::Divide => left / right,
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A variadic function node: an ordered child list plus the combine rule
/// resolved from the function registry
///
/// The combine rule is a stateless behavior value shared through an `Arc`;
/// the child subtrees stay single-owner.
#[derive(Clone)]
pub struct AggregateExpr {
    function: Arc<dyn AggregateFunction>,
    children: Vec<Expr>,
}

impl AggregateExpr {
    /// Create an aggregate node over an ordered argument list
    pub fn new(function: Arc<dyn AggregateFunction>, children: Vec<Expr>) -> Self {
        Self { function, children }
    }

    /// The function name this node was built from
    pub fn name(&self) -> &str {
        self.function.name()
    }

    /// The ordered argument list
    pub fn children(&self) -> &[Expr] {
        &self.children
    }

    /// The combine rule behind this node
    pub fn function(&self) -> Arc<dyn AggregateFunction> {
        Arc::clone(&self.function)
    }

    /// Collapse ordered operand values with this node's combine rule
    pub fn combine(&self, values: &[f64]) -> f64 {
        self.function.combine(values)
    }
}

impl fmt::Debug for AggregateExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregateExpr")
            .field("name", &self.name())
            .field("children", &self.children)
            .finish()
    }
}

/// Two aggregates are equal when they call the same function with
/// structurally equal arguments
impl PartialEq for AggregateExpr {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name() && self.children == other.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::math::{Min, Sum};

    #[test]
    fn test_operator_symbols() {
        assert_eq!(BinaryOperator::from_symbol("+").unwrap(), BinaryOperator::Add);
        assert_eq!(BinaryOperator::from_symbol("/").unwrap(), BinaryOperator::Divide);
        assert!(BinaryOperator::from_symbol("%").is_err());
    }

    #[test]
    fn test_operator_apply() {
        assert_eq!(BinaryOperator::Add.apply(2.0, 3.0), 5.0);
        assert_eq!(BinaryOperator::Subtract.apply(2.0, 3.0), -1.0);
        assert_eq!(BinaryOperator::Multiply.apply(2.0, 3.0), 6.0);
        assert_eq!(BinaryOperator::Divide.apply(3.0, 2.0), 1.5);
        assert!(BinaryOperator::Divide.apply(1.0, 0.0).is_infinite());
    }

    #[test]
    fn test_aggregate_equality() {
        let a = AggregateExpr::new(Arc::new(Sum), vec![Expr::Number(1.0)]);
        let b = AggregateExpr::new(Arc::new(Sum), vec![Expr::Number(1.0)]);
        let c = AggregateExpr::new(Arc::new(Min), vec![Expr::Number(1.0)]);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}

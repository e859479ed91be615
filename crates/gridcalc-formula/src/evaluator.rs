//! Formula evaluation pipeline
//!
//! Tokenize, build, optionally rewrite through a grid visitor, reduce
//! aggregates, then collapse to a scalar.

use crate::ast::{AggregateExpr, Expr};
use crate::error::{FormulaError, FormulaResult};
use crate::functions::{AggregateFunction, FunctionRegistry};
use crate::parser::{ExpressionBuilder, Precedence};
use crate::token::tokenize;
use crate::visitor::{rewrite, ExpressionVisitor};
use std::sync::Arc;

/// The public evaluation surface: formula text in, scalar out
///
/// Each evaluator owns its function registry, so evaluators are isolated
/// formula dialects. Registration takes `&mut self` while evaluation
/// borrows shared: the registry is frozen for as long as any evaluation
/// holds it.
///
/// # Example
/// ```
/// use gridcalc_formula::FormulaEvaluator;
///
/// let evaluator = FormulaEvaluator::new();
/// assert_eq!(evaluator.evaluate_formula("SUM(1,2,3)").unwrap(), 6.0);
/// assert_eq!(evaluator.evaluate_formula("MIN(2,1,3)").unwrap(), 1.0);
/// ```
pub struct FormulaEvaluator {
    registry: FunctionRegistry,
    precedence: Precedence,
}

impl FormulaEvaluator {
    /// Evaluator with the built-in functions and flat operator binding
    pub fn new() -> Self {
        Self {
            registry: FunctionRegistry::new(),
            precedence: Precedence::Flat,
        }
    }

    /// Evaluator with an explicit operator binding mode
    pub fn with_precedence(precedence: Precedence) -> Self {
        Self {
            registry: FunctionRegistry::new(),
            precedence,
        }
    }

    /// Extend the formula language with a new aggregate function
    ///
    /// A registered function is indistinguishable from a built-in.
    pub fn register_function(
        &mut self,
        function: Arc<dyn AggregateFunction>,
    ) -> FormulaResult<()> {
        self.registry.register(function)
    }

    /// The registry backing this evaluator
    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Compile formula text into an expression tree
    pub fn formula_to_expression(&self, formula: &str) -> FormulaResult<Expr> {
        let tokens = tokenize(formula)?;
        ExpressionBuilder::with_precedence(&self.registry, self.precedence).build(&tokens)
    }

    /// Evaluate formula text over literal operands only
    ///
    /// Cell or range references left in the tree make evaluation fail
    /// with [`FormulaError::UnresolvedReference`]; use
    /// [`evaluate_formula_with`](Self::evaluate_formula_with) to resolve
    /// them against a grid.
    pub fn evaluate_formula(&self, formula: &str) -> FormulaResult<f64> {
        let expr = self.formula_to_expression(formula)?;
        evaluate(&reduce(&expr)?)
    }

    /// Evaluate formula text, first rewriting the tree through `visitor`
    /// (typically a [`GridVisitor`](crate::visitor::GridVisitor))
    pub fn evaluate_formula_with(
        &self,
        formula: &str,
        visitor: &dyn ExpressionVisitor,
    ) -> FormulaResult<f64> {
        let expr = rewrite(&self.formula_to_expression(formula)?, visitor)?;
        evaluate(&reduce(&expr)?)
    }
}

impl Default for FormulaEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapse every aggregate in the tree into a single value node
///
/// Non-aggregate nodes are rebuilt with reduced children, so nested
/// aggregates anywhere in the tree collapse in one pass.
pub fn reduce(expr: &Expr) -> FormulaResult<Expr> {
    match expr {
        Expr::Aggregate(agg) => reduce_aggregate(agg),
        Expr::BinaryOp { op, left, right } => Ok(Expr::BinaryOp {
            op: *op,
            left: Box::new(reduce(left)?),
            right: Box::new(reduce(right)?),
        }),
        Expr::Block(items) => Ok(Expr::Block(
            items.iter().map(reduce).collect::<FormulaResult<Vec<_>>>()?,
        )),
        other => Ok(other.clone()),
    }
}

/// Reduce one aggregate node
///
/// Children are reduced first; a child that reduced to a range-expansion
/// sequence is flattened one level. Every flattened operand is evaluated
/// to a scalar and the node's combine rule folds the ordered values.
fn reduce_aggregate(agg: &AggregateExpr) -> FormulaResult<Expr> {
    if agg.children().is_empty() {
        return Err(FormulaError::EmptyAggregate(agg.name().to_string()));
    }

    let mut operands = Vec::with_capacity(agg.children().len());
    for child in agg.children() {
        match reduce(child)? {
            Expr::Block(items) => operands.extend(items),
            reduced => operands.push(reduced),
        }
    }

    let mut values = Vec::with_capacity(operands.len());
    for operand in &operands {
        values.push(evaluate(operand)?);
    }

    // Every child may have expanded to an empty sequence
    if values.is_empty() {
        return Err(FormulaError::EmptyAggregate(agg.name().to_string()));
    }

    Ok(Expr::Number(agg.combine(&values)))
}

/// Evaluate a (reduced) expression to its scalar value
pub fn evaluate(expr: &Expr) -> FormulaResult<f64> {
    match expr {
        Expr::Number(value) => Ok(*value),
        Expr::BinaryOp { op, left, right } => Ok(op.apply(evaluate(left)?, evaluate(right)?)),
        Expr::Aggregate(agg) => evaluate(&reduce_aggregate(agg)?),
        Expr::CellRef(cell) => Err(FormulaError::UnresolvedReference(cell.to_string())),
        Expr::RangeRef(array) => Err(FormulaError::UnresolvedReference(array.to_string())),
        Expr::Text(text) => Err(FormulaError::NonNumeric(format!("string \"{}\"", text))),
        Expr::Block(_) => Err(FormulaError::NonNumeric("cell sequence".into())),
        Expr::Empty => Err(FormulaError::NonNumeric("empty expression".into())),
    }
}

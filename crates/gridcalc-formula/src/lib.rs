//! # gridcalc-formula
//!
//! Formula compilation and evaluation for gridcalc.
//!
//! This crate provides:
//! - Tokenizing formula text into a typed token stream
//! - Building expression trees from tokens (recursive descent)
//! - An extensible, case-insensitive function registry (SUM and MIN built in)
//! - Grid resolution: rewriting cell/range references to grid values
//! - Reduction of variadic aggregates down to a single scalar
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_formula::FormulaEvaluator;
//!
//! let evaluator = FormulaEvaluator::new();
//! assert_eq!(evaluator.evaluate_formula("SUM(1,2,3)").unwrap(), 6.0);
//! ```
//!
//! Formulas that reference grid cells are evaluated through a
//! [`GridVisitor`] wrapping any [`gridcalc_core::Grid`] implementation:
//!
//! ```rust,ignore
//! let visitor = GridVisitor::new(&grid);
//! let total = evaluator.evaluate_formula_with("SUM(A1:A3)", &visitor)?;
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;
pub mod token;
pub mod visitor;

pub use ast::{AggregateExpr, BinaryOperator, Expr};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, reduce, FormulaEvaluator};
pub use functions::{AggregateFunction, FunctionRegistry};
pub use parser::{ExpressionBuilder, Precedence};
pub use token::{tokenize, Token, TokenType};
pub use visitor::{rewrite, rewrite_opt, ExpressionVisitor, GridVisitor};

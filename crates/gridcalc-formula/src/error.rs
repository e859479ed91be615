//! Formula pipeline error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors raised while tokenizing, parsing, rewriting, or evaluating a
/// formula
///
/// All of these are terminal for the evaluation that raised them: there is
/// no retry and no partial result.
#[derive(Debug, Error)]
pub enum FormulaError {
    /// Empty or missing token stream handed to the expression builder
    #[error("Empty formula: there is nothing to parse")]
    EmptyInput,

    /// A token that fits no factor form
    #[error("Unexpected token: '{0}'")]
    UnexpectedToken(String),

    /// Missing or misplaced closing parenthesis
    #[error("Unbalanced parentheses")]
    UnbalancedParentheses,

    /// Token stream ended in the middle of a construct
    #[error("Incomplete expression: formula ended unexpectedly")]
    IncompleteExpression,

    /// A constant token whose text is not a number
    #[error("Invalid number format: '{0}'")]
    InvalidNumberFormat(String),

    /// Function name missing from the registry
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// A function value that cannot be registered
    #[error("Registration failed: {0}")]
    Registration(String),

    /// Name already taken; registrations never overwrite
    #[error("Function {0} is already registered")]
    DuplicateFunction(String),

    /// Aggregate reduced with no operands
    #[error("{0} requires at least one operand")]
    EmptyAggregate(String),

    /// Function token not followed by an opening parenthesis
    #[error("Malformed call to {0}: expected '(' after the function name")]
    MalformedCall(String),

    /// Character the tokenizer does not recognize
    #[error("Unexpected character '{0}' in formula")]
    UnexpectedCharacter(char),

    /// Parenthesis/argument nesting beyond the supported depth
    #[error("Formula nesting exceeds {0} levels")]
    NestingTooDeep(usize),

    /// Cell or range reference evaluated without a grid
    #[error("Unresolved reference {0}: no grid visitor was supplied")]
    UnresolvedReference(String),

    /// Non-numeric expression in a scalar position
    #[error("Cannot evaluate {0} as a number")]
    NonNumeric(String),

    /// Invalid coordinate text inside a reference token
    #[error(transparent)]
    Reference(#[from] gridcalc_core::Error),
}

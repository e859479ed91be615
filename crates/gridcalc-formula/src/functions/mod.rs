//! Aggregate function behaviors and the registry that names them

pub mod math;

use crate::error::{FormulaError, FormulaResult};
use ahash::AHashMap;
use std::sync::Arc;

/// Combination rule behind an [`Aggregate`](crate::ast::Expr::Aggregate)
/// expression node
///
/// Implement this and register the value with
/// [`FunctionRegistry::register`] (or
/// [`FormulaEvaluator::register_function`](crate::evaluator::FormulaEvaluator::register_function))
/// to extend the formula language with a new function; the expression
/// builder needs no changes.
pub trait AggregateFunction: Send + Sync {
    /// Name the function is registered and called by
    ///
    /// Matching is case-insensitive. A blank name cannot be registered.
    fn name(&self) -> &str;

    /// Collapse the ordered operand values into a single scalar
    ///
    /// `values` is never empty: reduction rejects empty aggregates before
    /// the combine rule runs.
    fn combine(&self, values: &[f64]) -> f64;
}

/// Mapping from case-insensitive function names to combine rules
///
/// Built-ins (SUM, MIN) are present from construction. Registration takes
/// `&mut self` while every lookup borrows shared, so a registry is frozen
/// for as long as any evaluation holds it.
pub struct FunctionRegistry {
    functions: AHashMap<String, Arc<dyn AggregateFunction>>,
}

impl FunctionRegistry {
    /// Registry pre-populated with the built-in functions
    pub fn new() -> Self {
        let mut registry = Self {
            functions: AHashMap::new(),
        };

        registry.insert(Arc::new(math::Sum));
        registry.insert(Arc::new(math::Min));

        registry
    }

    // Built-ins carry fixed, known-good names
    fn insert(&mut self, function: Arc<dyn AggregateFunction>) {
        self.functions
            .insert(function.name().to_uppercase(), function);
    }

    /// Register a new function
    ///
    /// Fails if the function declares a blank name or the name (compared
    /// case-insensitively) is already taken. Existing registrations are
    /// never overwritten.
    pub fn register(&mut self, function: Arc<dyn AggregateFunction>) -> FormulaResult<()> {
        let name = function.name().trim();
        if name.is_empty() {
            return Err(FormulaError::Registration(
                "function declares no name".into(),
            ));
        }

        let key = name.to_uppercase();
        if self.functions.contains_key(&key) {
            return Err(FormulaError::DuplicateFunction(name.to_string()));
        }

        self.functions.insert(key, function);
        Ok(())
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn AggregateFunction>> {
        self.functions.get(&name.to_uppercase())
    }

    /// Look up a function by name, failing if it is not registered
    pub fn resolve(&self, name: &str) -> FormulaResult<Arc<dyn AggregateFunction>> {
        self.get(name)
            .cloned()
            .ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

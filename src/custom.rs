// Custom function extension layer
//
// External code registers functions by name. Every dispatcher copies the
// registry it is built from, so registrations made afterwards are invisible
// to it. Custom entries shadow built-ins of the same name.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::evaluator::{Evaluator, EvaluatorError};
use crate::value::JValue;

/// Handler of a custom function: receives the evaluated arguments and an
/// [`Executor`] bound to the calling evaluator and root value.
pub type CustomFunction =
    Arc<dyn Fn(&[JValue], &Executor<'_>) -> Result<JValue, EvaluatorError> + Send + Sync>;

/// Name → handler table.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, CustomFunction>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&[JValue], &Executor<'_>) -> Result<JValue, EvaluatorError> + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!(%name, "registering custom function");
        self.functions.insert(name, Arc::new(function));
    }

    pub fn get(&self, name: &str) -> Option<&CustomFunction> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("FunctionRegistry").field("functions", &names).finish()
    }
}

static GLOBAL_FUNCTIONS: OnceLock<RwLock<FunctionRegistry>> = OnceLock::new();

fn global() -> &'static RwLock<FunctionRegistry> {
    GLOBAL_FUNCTIONS.get_or_init(|| RwLock::new(FunctionRegistry::new()))
}

/// Register `function` in the process-wide registry.
///
/// Only evaluators built after this call see the function. Register before
/// evaluating from several threads.
pub fn register_function<F>(name: impl Into<String>, function: F)
where
    F: Fn(&[JValue], &Executor<'_>) -> Result<JValue, EvaluatorError> + Send + Sync + 'static,
{
    global().write().register(name, function);
}

/// Snapshot of the process-wide registry.
pub fn global_registry() -> FunctionRegistry {
    global().read().clone()
}

/// Lets a custom function evaluate expression references it was handed.
pub struct Executor<'a> {
    evaluator: &'a Evaluator,
    root: &'a JValue,
}

impl<'a> Executor<'a> {
    pub(crate) fn new(evaluator: &'a Evaluator, root: &'a JValue) -> Self {
        Executor { evaluator, root }
    }

    /// Evaluate the expression reference `expr` with `item` as the current value.
    ///
    /// The root value stays the one of the outer evaluation.
    pub fn execute(&self, expr: &JValue, item: &JValue) -> Result<JValue, EvaluatorError> {
        let expr = expr.as_expression_ref().ok_or(EvaluatorError::NonExpression)?;
        self.evaluator.execute(expr.node(), item, self.root)
    }

    /// Call another function (built-in or custom) through the same dispatcher.
    pub fn call_function(&self, name: &str, args: Vec<JValue>) -> Result<JValue, EvaluatorError> {
        self.evaluator
            .dispatcher()
            .call(name, args, self.evaluator, self.root)
    }

    pub fn root(&self) -> &JValue {
        self.root
    }
}

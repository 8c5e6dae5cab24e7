// Function registry and dispatch
//
// Resolves a call by name: custom functions first, then the built-in table.
// Built-ins get their arguments validated against their signature; handlers
// that evaluate expression references also receive the evaluator and root.

use std::collections::HashMap;
use std::fmt;

use crate::custom::{self, Executor, FunctionRegistry};
use crate::evaluator::{Evaluator, EvaluatorError};
use crate::functions;
use crate::signature::{resolve_arguments, Arg, ArgSpec};
use crate::value::JValue;

pub type BuiltinFn = fn(Vec<Arg>) -> Result<JValue, EvaluatorError>;

/// Handler taking the evaluator and root value ahead of its arguments.
pub type ContextFn = fn(&Evaluator, &JValue, Vec<Arg>) -> Result<JValue, EvaluatorError>;

#[derive(Clone, Copy)]
pub enum Handler {
    Plain(BuiltinFn),
    WithContext(ContextFn),
}

/// A built-in function: name, argument slots and handler.
#[derive(Clone)]
pub struct FunctionSpec {
    pub name: &'static str,
    pub args: Vec<ArgSpec>,
    pub handler: Handler,
}

impl FunctionSpec {
    pub fn new(name: &'static str, args: Vec<ArgSpec>, handler: BuiltinFn) -> Self {
        FunctionSpec {
            name,
            args,
            handler: Handler::Plain(handler),
        }
    }

    pub fn with_context(name: &'static str, args: Vec<ArgSpec>, handler: ContextFn) -> Self {
        FunctionSpec {
            name,
            args,
            handler: Handler::WithContext(handler),
        }
    }

    pub fn needs_context(&self) -> bool {
        matches!(self.handler, Handler::WithContext(_))
    }
}

impl fmt::Debug for FunctionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionSpec")
            .field("name", &self.name)
            .field("args", &self.args)
            .field("needs_context", &self.needs_context())
            .finish()
    }
}

/// Built-in table plus a snapshot of custom functions.
pub struct Dispatcher {
    builtins: HashMap<&'static str, FunctionSpec>,
    custom: FunctionRegistry,
}

impl Dispatcher {
    /// Dispatcher over the built-ins and a snapshot of the process-wide registry.
    pub fn new() -> Self {
        Self::with_registry(custom::global_registry())
    }

    pub fn with_registry(custom: FunctionRegistry) -> Self {
        tracing::debug!(custom = custom.len(), "building dispatcher");
        Dispatcher {
            builtins: functions::builtin_table(),
            custom,
        }
    }

    pub fn builtin(&self, name: &str) -> Option<&FunctionSpec> {
        self.builtins.get(name)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.custom.contains(name) || self.builtins.contains_key(name)
    }

    /// Call `name` with already evaluated arguments.
    #[tracing::instrument(level = "debug", skip(self, args, evaluator, root))]
    pub fn call(
        &self,
        name: &str,
        args: Vec<JValue>,
        evaluator: &Evaluator,
        root: &JValue,
    ) -> Result<JValue, EvaluatorError> {
        if let Some(function) = self.custom.get(name) {
            let executor = Executor::new(evaluator, root);
            return function(args.as_slice(), &executor);
        }

        let spec = self
            .builtins
            .get(name)
            .ok_or_else(|| EvaluatorError::UnknownFunction(name.to_string()))?;
        let resolved = resolve_arguments(spec.name, &spec.args, args)?;
        match spec.handler {
            Handler::Plain(handler) => handler(resolved),
            Handler::WithContext(handler) => handler(evaluator, root, resolved),
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("builtins", &self.builtins.len())
            .field("custom", &self.custom)
            .finish()
    }
}

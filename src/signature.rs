// Function signature validation and type checking
//
// A validated argument slot is handed to the handler as a typed `Arg`, so
// handlers match on variants instead of downcasting raw values.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use thiserror::Error;

use crate::value::{ExprRef, JValue, Number};

/// Signature validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignatureError {
    #[error("{name}: expected {} {expected} arguments, got {actual}", arity_bound(.variadic))]
    ArityMismatch {
        name: String,
        expected: usize,
        actual: usize,
        variadic: bool,
    },

    #[error("{name}: invalid type for argument {position}: {value}, expected: {expected}")]
    TypeMismatch {
        name: String,
        position: usize,
        value: String,
        expected: String,
    },
}

fn arity_bound(variadic: &bool) -> &'static str {
    if *variadic {
        "at least"
    } else {
        "exactly"
    }
}

/// Named set of acceptable value kinds for an argument slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass {
    Number,
    String,
    Array,
    Object,
    ExpressionRef,
    Any,
    /// Array whose elements are all numbers
    ArrayOfNumber,
    /// Array whose elements are all strings
    ArrayOfString,
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeClass::Number => "number",
            TypeClass::String => "string",
            TypeClass::Array => "array",
            TypeClass::Object => "object",
            TypeClass::ExpressionRef => "expref",
            TypeClass::Any => "any",
            TypeClass::ArrayOfNumber => "array[number]",
            TypeClass::ArrayOfString => "array[string]",
        };
        f.write_str(name)
    }
}

/// A validated argument
#[derive(Debug, Clone)]
pub enum Arg {
    Number(Number),
    String(Rc<str>),
    Array(Rc<Vec<JValue>>),
    Object(Rc<IndexMap<String, JValue>>),
    ExpressionRef(ExprRef),
    NumberArray(Vec<Number>),
    StringArray(Vec<Rc<str>>),
    /// Slot typed `any`, or an unchecked argument past the declared slots
    Any(JValue),
}

impl Arg {
    /// Back to a plain value (expression references stay references).
    pub fn into_value(self) -> JValue {
        match self {
            Arg::Number(n) => JValue::Number(n),
            Arg::String(s) => JValue::String(s),
            Arg::Array(arr) => JValue::Array(arr),
            Arg::Object(map) => JValue::Object(map),
            Arg::ExpressionRef(expr) => JValue::ExpressionRef(expr),
            Arg::NumberArray(items) => items.into_iter().map(JValue::Number).collect::<Vec<_>>().into(),
            Arg::StringArray(items) => items.into_iter().map(JValue::String).collect::<Vec<_>>().into(),
            Arg::Any(value) => value,
        }
    }
}

impl TypeClass {
    /// Admit `value` into this class, producing the typed slot on success.
    pub fn admit(self, value: &JValue) -> Option<Arg> {
        match (self, value) {
            (TypeClass::Any, v) => Some(Arg::Any(v.clone())),
            (TypeClass::Number, JValue::Number(n)) => Some(Arg::Number(n.clone())),
            (TypeClass::String, JValue::String(s)) => Some(Arg::String(Rc::clone(s))),
            (TypeClass::Object, JValue::Object(map)) => Some(Arg::Object(Rc::clone(map))),
            (TypeClass::ExpressionRef, JValue::ExpressionRef(expr)) => {
                Some(Arg::ExpressionRef(expr.clone()))
            }
            (TypeClass::Array, v) => v.to_sequence().map(Arg::Array),
            (TypeClass::ArrayOfNumber, v) => {
                let seq = v.to_sequence()?;
                seq.iter()
                    .map(|item| item.as_number().cloned())
                    .collect::<Option<Vec<_>>>()
                    .map(Arg::NumberArray)
            }
            (TypeClass::ArrayOfString, v) => {
                let seq = v.to_sequence()?;
                seq.iter()
                    .map(|item| match item {
                        JValue::String(s) => Some(Rc::clone(s)),
                        _ => None,
                    })
                    .collect::<Option<Vec<_>>>()
                    .map(Arg::StringArray)
            }
            _ => None,
        }
    }
}

/// Function parameter definition
#[derive(Debug, Clone)]
pub struct ArgSpec {
    pub types: Vec<TypeClass>,
    pub variadic: bool,
}

impl ArgSpec {
    pub fn new(types: &[TypeClass]) -> Self {
        ArgSpec {
            types: types.to_vec(),
            variadic: false,
        }
    }

    pub fn variadic(types: &[TypeClass]) -> Self {
        ArgSpec {
            types: types.to_vec(),
            variadic: true,
        }
    }

    fn type_check(&self, name: &str, position: usize, value: &JValue) -> Result<Arg, SignatureError> {
        self.types
            .iter()
            .find_map(|class| class.admit(value))
            .ok_or_else(|| SignatureError::TypeMismatch {
                name: name.to_string(),
                position,
                value: value.to_string(),
                expected: self
                    .types
                    .iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>()
                    .join("|"),
            })
    }
}

/// Validate `args` against `specs`.
///
/// Without a variadic slot the count must match exactly and every argument is
/// type-checked. With a trailing variadic slot only the declared minimum is
/// enforced; every argument passes through unchecked as `Arg::Any` and the
/// handler validates what it needs.
pub fn resolve_arguments(
    name: &str,
    specs: &[ArgSpec],
    args: Vec<JValue>,
) -> Result<Vec<Arg>, SignatureError> {
    let variadic = specs.last().is_some_and(|spec| spec.variadic);
    let arity_ok = if variadic {
        args.len() >= specs.len()
    } else {
        args.len() == specs.len()
    };
    if !arity_ok {
        return Err(SignatureError::ArityMismatch {
            name: name.to_string(),
            expected: specs.len(),
            actual: args.len(),
            variadic,
        });
    }

    if variadic {
        return Ok(args.into_iter().map(Arg::Any).collect());
    }
    args.into_iter()
        .zip(specs)
        .enumerate()
        .map(|(i, (value, spec))| spec.type_check(name, i, &value))
        .collect()
}

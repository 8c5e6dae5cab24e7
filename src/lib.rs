// jmespath-core - evaluation core of a JMESPath query engine
// Copyright (c) 2025 jmespath-core contributors
// Licensed under the MIT License

//! # jmespath-core
//!
//! Evaluates an already parsed JMESPath expression against a JSON-like
//! document. The query parser lives outside this crate: ASTs are built in Rust
//! or decoded from their JSON form.
//!
//! ## Architecture
//!
//! - `value` - Dynamic value model (`JValue`), coercions, deep equality, JSON I/O
//! - `record` - Host records and the field resolver used to inspect them
//! - `ast` - Abstract Syntax Tree definitions
//! - `signature` - Function signature validation and typed arguments
//! - `dispatcher` - Function lookup, argument validation and invocation
//! - `functions` - Built-in function implementations
//! - `custom` - Custom function registry and the `Executor` handed to extensions
//! - `utils` - Slice and flatten helpers
//! - `evaluator` - Tree-walking evaluator
//!
//! ```
//! use jmespath_core::{search, AstNode, JValue};
//! use serde_json::json;
//!
//! let ast = AstNode::projection(AstNode::field("people"), AstNode::field("name"));
//! let data: JValue = json!({"people": [{"name": "a"}, {"name": "b"}]}).into();
//! let names = search(&ast, &data).unwrap();
//! assert_eq!(names.to_json_string().unwrap(), r#"["a","b"]"#);
//! ```

pub mod ast;
pub mod custom;
pub mod dispatcher;
pub mod evaluator;
pub mod functions;
pub mod record;
pub mod signature;
pub mod utils;
pub mod value;

pub use ast::{AstNode, Comparator, KeyValPair};
pub use custom::{register_function, Executor, FunctionRegistry};
pub use evaluator::{Evaluator, EvaluatorBuilder, EvaluatorError};
pub use record::{FieldResolver, HostRecord, RecordField, TagFieldResolver};
pub use value::{JValue, Number};

/// Evaluate `ast` against `data` with a fresh default evaluator.
pub fn search(ast: &AstNode, data: &JValue) -> Result<JValue, EvaluatorError> {
    Evaluator::new().evaluate(ast, data)
}

/// JSON text in, JSON text out: the AST in its JSON form and the document.
pub fn search_json(ast_json: &str, data_json: &str) -> Result<String, EvaluatorError> {
    let ast = AstNode::from_json(ast_json)?;
    let data = JValue::from_json_str(data_json)?;
    let result = search(&ast, &data)?;
    Ok(result.to_json_string()?)
}

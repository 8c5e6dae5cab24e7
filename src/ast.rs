// Abstract Syntax Tree consumed by the evaluator
//
// The parser lives outside this crate; ASTs arrive already built, either
// constructed in Rust or decoded from JSON with `AstNode::from_json`.

use serde::{Deserialize, Serialize};

use crate::evaluator::EvaluatorError;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl Comparator {
    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::Equal => "==",
            Comparator::NotEqual => "!=",
            Comparator::LessThan => "<",
            Comparator::LessThanOrEqual => "<=",
            Comparator::GreaterThan => ">",
            Comparator::GreaterThanOrEqual => ">=",
        }
    }
}

/// A `key: expression` entry of a multi-select hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValPair {
    pub key: String,
    pub value: AstNode,
}

/// AST Node types
///
/// One variant per node kind; the payload shape is fixed by the variant, so a
/// node never needs re-validation at evaluation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AstNode {
    /// `lhs <op> rhs`
    Comparator {
        op: Comparator,
        lhs: Box<AstNode>,
        rhs: Box<AstNode>,
    },

    /// `&expr`, evaluates to an expression reference
    ExpressionRef(Box<AstNode>),

    /// `name(args...)`
    FunctionExpression { name: String, args: Vec<AstNode> },

    /// Field name lookup on the current value
    Field(String),

    /// `lhs[?predicate].rhs`
    FilterProjection {
        lhs: Box<AstNode>,
        rhs: Box<AstNode>,
        predicate: Box<AstNode>,
    },

    /// `expr[]`
    Flatten(Box<AstNode>),

    Identity,

    /// `@`
    CurrentNode,

    /// `$`
    RootNode,

    /// `[n]`, negative counts from the end
    Index(i64),

    /// JSON literal
    Literal(serde_json::Value),

    /// `{key: expr, ...}`
    MultiSelectHash(Vec<KeyValPair>),

    /// `[expr, ...]`
    MultiSelectList(Vec<AstNode>),

    Or(Box<AstNode>, Box<AstNode>),

    And(Box<AstNode>, Box<AstNode>),

    Not(Box<AstNode>),

    /// `a | b | ...`
    Pipe(Vec<AstNode>),

    /// `lhs[*].rhs`
    Projection { lhs: Box<AstNode>, rhs: Box<AstNode> },

    /// `lhs.rhs`
    Subexpression { lhs: Box<AstNode>, rhs: Box<AstNode> },

    /// `lhs[...]`
    IndexExpression { lhs: Box<AstNode>, rhs: Box<AstNode> },

    /// `[start:stop:step]`, each bound optional
    Slice {
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    },

    /// `lhs.*.rhs`
    ValueProjection { lhs: Box<AstNode>, rhs: Box<AstNode> },
}

impl AstNode {
    /// Decode an externally built AST from its JSON form.
    ///
    /// Unknown node kinds and malformed payloads surface as `UnknownNode`.
    pub fn from_json(text: &str) -> Result<AstNode, EvaluatorError> {
        serde_json::from_str(text).map_err(|e| EvaluatorError::UnknownNode(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, EvaluatorError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn field(name: impl Into<String>) -> Self {
        AstNode::Field(name.into())
    }

    pub fn literal(value: serde_json::Value) -> Self {
        AstNode::Literal(value)
    }

    pub fn function(name: impl Into<String>, args: Vec<AstNode>) -> Self {
        AstNode::FunctionExpression {
            name: name.into(),
            args,
        }
    }

    pub fn expref(node: AstNode) -> Self {
        AstNode::ExpressionRef(Box::new(node))
    }

    pub fn compare(op: Comparator, lhs: AstNode, rhs: AstNode) -> Self {
        AstNode::Comparator {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn subexpr(lhs: AstNode, rhs: AstNode) -> Self {
        AstNode::Subexpression {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn index_expr(lhs: AstNode, rhs: AstNode) -> Self {
        AstNode::IndexExpression {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn projection(lhs: AstNode, rhs: AstNode) -> Self {
        AstNode::Projection {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn value_projection(lhs: AstNode, rhs: AstNode) -> Self {
        AstNode::ValueProjection {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn filter_projection(lhs: AstNode, rhs: AstNode, predicate: AstNode) -> Self {
        AstNode::FilterProjection {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            predicate: Box::new(predicate),
        }
    }

    pub fn flatten(node: AstNode) -> Self {
        AstNode::Flatten(Box::new(node))
    }

    pub fn or(lhs: AstNode, rhs: AstNode) -> Self {
        AstNode::Or(Box::new(lhs), Box::new(rhs))
    }

    pub fn and(lhs: AstNode, rhs: AstNode) -> Self {
        AstNode::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn not(node: AstNode) -> Self {
        AstNode::Not(Box::new(node))
    }

    pub fn slice(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Self {
        AstNode::Slice { start, stop, step }
    }

    pub fn key_val(key: impl Into<String>, value: AstNode) -> KeyValPair {
        KeyValPair {
            key: key.into(),
            value,
        }
    }
}

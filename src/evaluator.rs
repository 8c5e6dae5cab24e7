// Tree-walking evaluator
//
// One case per AST node kind. Two values are threaded through the recursion:
// the current value, which changes as evaluation descends, and the root value,
// fixed for the whole top-level call. Function calls go through the
// dispatcher, which may call back into `execute` for expression references.

use std::cell::{Cell, RefCell, RefMut};
use std::fmt;

use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::ast::{AstNode, Comparator};
use crate::custom::{self, FunctionRegistry};
use crate::dispatcher::Dispatcher;
use crate::record::{FieldResolver, TagFieldResolver};
use crate::signature::SignatureError;
use crate::utils::{self, SliceBounds};
use crate::value::{ExprRef, JValue};

/// Nested evaluations allowed before `RecursionLimit` is raised.
///
/// Every node costs one level, so `a.b.c` needs three plus one per argument
/// nesting inside it.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Evaluator errors
#[derive(Error, Debug)]
pub enum EvaluatorError {
    #[error("Type error: {0}")]
    TypeError(String),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error("Unknown function: {0}()")]
    UnknownFunction(String),

    #[error("Unknown AST node: {0}")]
    UnknownNode(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Expected an expression reference")]
    NonExpression,

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Invalid slice: {0}")]
    InvalidSlice(String),

    #[error("Maximum recursion depth ({0}) exceeded")]
    RecursionLimit(usize),

    /// Raised by extension handlers.
    #[error("{0}")]
    Custom(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EvaluatorError {
    /// A value of the wrong kind, whether caught by signature validation or by
    /// the handler or node itself.
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            EvaluatorError::TypeError(_) | EvaluatorError::Signature(SignatureError::TypeMismatch { .. })
        )
    }

    pub fn is_arity_error(&self) -> bool {
        matches!(self, EvaluatorError::Signature(SignatureError::ArityMismatch { .. }))
    }
}

/// Configures an [`Evaluator`].
#[derive(Default)]
pub struct EvaluatorBuilder {
    registry: Option<FunctionRegistry>,
    field_resolver: Option<Box<dyn FieldResolver>>,
    seed: Option<u64>,
    max_depth: Option<usize>,
}

impl EvaluatorBuilder {
    /// Custom functions to use instead of a snapshot of the process-wide registry.
    pub fn registry(mut self, registry: FunctionRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn field_resolver(mut self, resolver: impl FieldResolver + 'static) -> Self {
        self.field_resolver = Some(Box::new(resolver));
        self
    }

    /// Seed the generator behind `shuffle`; unseeded evaluators draw from OS entropy.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn build(self) -> Evaluator {
        let registry = self.registry.unwrap_or_else(custom::global_registry);
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Evaluator {
            dispatcher: Dispatcher::with_registry(registry),
            field_resolver: self
                .field_resolver
                .unwrap_or_else(|| Box::new(TagFieldResolver)),
            rng: RefCell::new(rng),
            depth: Cell::new(0),
            max_depth: self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
        }
    }
}

/// Evaluator for JMESPath ASTs
///
/// Owns its dispatcher (built-ins plus a custom-function snapshot), the field
/// resolver used for host records and the generator behind `shuffle`. The AST
/// is only borrowed, so one tree can be evaluated against many documents.
pub struct Evaluator {
    dispatcher: Dispatcher,
    field_resolver: Box<dyn FieldResolver>,
    rng: RefCell<StdRng>,
    depth: Cell<usize>,
    max_depth: usize,
}

impl Evaluator {
    /// Evaluator over the built-ins and a snapshot of the process-wide registry.
    ///
    /// Evaluation fails with `RecursionLimit` once [`DEFAULT_MAX_DEPTH`] nodes
    /// are nested; use [`EvaluatorBuilder::max_depth`] for deeper trees.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> EvaluatorBuilder {
        EvaluatorBuilder::default()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub(crate) fn rng(&self) -> RefMut<'_, StdRng> {
        self.rng.borrow_mut()
    }

    /// Evaluate `node` against `data`, which is also the root value.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn evaluate(&self, node: &AstNode, data: &JValue) -> Result<JValue, EvaluatorError> {
        self.execute(node, data, data)
    }

    /// Evaluate `node` with `value` as the current value and `root` as the root.
    ///
    /// This is the re-entry point used for expression references.
    pub fn execute(&self, node: &AstNode, value: &JValue, root: &JValue) -> Result<JValue, EvaluatorError> {
        let depth = self.depth.get() + 1;
        if depth > self.max_depth {
            return Err(EvaluatorError::RecursionLimit(self.max_depth));
        }
        self.depth.set(depth);
        let result = self.execute_impl(node, value, root);
        self.depth.set(depth - 1);
        result
    }

    fn execute_impl(&self, node: &AstNode, value: &JValue, root: &JValue) -> Result<JValue, EvaluatorError> {
        match node {
            AstNode::Comparator { op, lhs, rhs } => {
                let left = self.execute(lhs, value, root)?;
                let right = self.execute(rhs, value, root)?;
                compare(*op, &left, &right)
            }

            AstNode::ExpressionRef(child) => Ok(JValue::ExpressionRef(ExprRef::new((**child).clone()))),

            AstNode::FunctionExpression { name, args } => {
                let resolved = args
                    .iter()
                    .map(|arg| self.execute(arg, value, root))
                    .collect::<Result<Vec<_>, _>>()?;
                self.dispatcher.call(name, resolved, self, root)
            }

            AstNode::Field(key) => Ok(match value {
                JValue::Object(map) => map.get(key).cloned().unwrap_or(JValue::Null),
                JValue::Record(record) => self
                    .field_resolver
                    .resolve(key, &**record)
                    .unwrap_or(JValue::Null),
                _ => JValue::Null,
            }),

            AstNode::FilterProjection { lhs, rhs, predicate } => {
                let left = self.execute(lhs, value, root)?;
                let Some(items) = left.to_sequence() else {
                    return Ok(JValue::Null);
                };
                tracing::trace!(count = items.len(), "filter projection");
                let mut collected = Vec::new();
                for item in items.iter() {
                    if self.execute(predicate, item, root)?.is_false_like() {
                        continue;
                    }
                    let current = self.execute(rhs, item, root)?;
                    if !current.is_null() {
                        collected.push(current);
                    }
                }
                Ok(JValue::array(collected))
            }

            AstNode::Flatten(child) => {
                let left = self.execute(child, value, root)?;
                Ok(match left.to_sequence() {
                    Some(items) => JValue::array(utils::flatten_once(&items)),
                    None => JValue::Null,
                })
            }

            AstNode::Identity | AstNode::CurrentNode => Ok(value.clone()),

            AstNode::RootNode => Ok(root.clone()),

            AstNode::Index(index) => Ok(match value.to_sequence() {
                Some(items) => {
                    let len = items.len() as i64;
                    let i = if *index < 0 { index + len } else { *index };
                    if (0..len).contains(&i) {
                        items[i as usize].clone()
                    } else {
                        JValue::Null
                    }
                }
                None => JValue::Null,
            }),

            AstNode::Literal(literal) => Ok(JValue::from(literal)),

            AstNode::MultiSelectHash(pairs) => {
                if value.is_null() {
                    return Ok(JValue::Null);
                }
                let mut collected = IndexMap::with_capacity(pairs.len());
                for pair in pairs {
                    collected.insert(pair.key.clone(), self.execute(&pair.value, value, root)?);
                }
                Ok(JValue::object(collected))
            }

            AstNode::MultiSelectList(children) => {
                if value.is_null() {
                    return Ok(JValue::Null);
                }
                let collected = children
                    .iter()
                    .map(|child| self.execute(child, value, root))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(JValue::array(collected))
            }

            AstNode::Or(lhs, rhs) => {
                let left = self.execute(lhs, value, root)?;
                if left.is_false_like() {
                    self.execute(rhs, value, root)
                } else {
                    Ok(left)
                }
            }

            AstNode::And(lhs, rhs) => {
                let left = self.execute(lhs, value, root)?;
                if left.is_false_like() {
                    Ok(left)
                } else {
                    self.execute(rhs, value, root)
                }
            }

            AstNode::Not(child) => Ok(JValue::Bool(self.execute(child, value, root)?.is_false_like())),

            AstNode::Pipe(stages) => {
                let mut current = value.clone();
                for stage in stages {
                    current = self.execute(stage, &current, root)?;
                }
                Ok(current)
            }

            AstNode::Projection { lhs, rhs } => {
                let left = self.execute(lhs, value, root)?;
                match left.to_sequence() {
                    Some(items) => {
                        tracing::trace!(count = items.len(), "projection");
                        self.project(rhs, items.iter(), root)
                    }
                    None => Ok(JValue::Null),
                }
            }

            AstNode::Subexpression { lhs, rhs } | AstNode::IndexExpression { lhs, rhs } => {
                let left = self.execute(lhs, value, root)?;
                self.execute(rhs, &left, root)
            }

            AstNode::Slice { start, stop, step } => match value.to_sequence() {
                Some(items) => {
                    let bounds = SliceBounds {
                        start: *start,
                        stop: *stop,
                        step: *step,
                    };
                    Ok(JValue::array(utils::slice_sequence(&items, bounds)?))
                }
                None => Ok(JValue::Null),
            },

            AstNode::ValueProjection { lhs, rhs } => {
                let left = self.execute(lhs, value, root)?;
                match left.as_object() {
                    Some(map) => {
                        tracing::trace!(count = map.len(), "value projection");
                        self.project(rhs, map.values(), root)
                    }
                    None => Ok(JValue::Null),
                }
            }
        }
    }

    /// Apply `node` to every element, dropping null results.
    fn project<'a>(
        &self,
        node: &AstNode,
        items: impl Iterator<Item = &'a JValue>,
        root: &JValue,
    ) -> Result<JValue, EvaluatorError> {
        let mut collected = Vec::new();
        for item in items {
            let current = self.execute(node, item, root)?;
            if !current.is_null() {
                collected.push(current);
            }
        }
        Ok(JValue::array(collected))
    }
}

fn compare(op: Comparator, left: &JValue, right: &JValue) -> Result<JValue, EvaluatorError> {
    let ordering = |test: fn(f64, f64) -> bool| match (left.coerce_f64(), right.coerce_f64()) {
        (Some(a), Some(b)) => Ok(JValue::Bool(test(a, b))),
        _ => Err(EvaluatorError::TypeError(format!(
            "cannot compare {} {} {}",
            left.kind_name(),
            op.symbol(),
            right.kind_name()
        ))),
    };
    match op {
        Comparator::Equal => Ok(JValue::Bool(left.deep_eq(right))),
        Comparator::NotEqual => Ok(JValue::Bool(!left.deep_eq(right))),
        Comparator::LessThan => ordering(|a, b| a < b),
        Comparator::LessThanOrEqual => ordering(|a, b| a <= b),
        Comparator::GreaterThan => ordering(|a, b| a > b),
        Comparator::GreaterThanOrEqual => ordering(|a, b| a >= b),
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("dispatcher", &self.dispatcher)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jvalue;
    use crate::record::{HostRecord, RecordField};
    use serde_json::json;

    fn evaluator() -> Evaluator {
        Evaluator::builder().registry(FunctionRegistry::new()).build()
    }

    fn eval(node: &AstNode, data: serde_json::Value) -> Result<JValue, EvaluatorError> {
        evaluator().evaluate(node, &data.into())
    }

    fn path(fields: &[&str]) -> AstNode {
        let mut nodes = fields.iter().map(|f| AstNode::field(*f));
        let first = nodes.next().unwrap_or(AstNode::Identity);
        nodes.fold(first, AstNode::subexpr)
    }

    #[test]
    fn test_field_and_subexpression() {
        let data = json!({"a": {"b": {"c": 42}}});
        assert_eq!(eval(&path(&["a", "b", "c"]), data.clone()).unwrap(), jvalue!(42));
        assert_eq!(eval(&path(&["a", "x", "c"]), data).unwrap(), JValue::Null);
        assert_eq!(eval(&AstNode::field("a"), json!([1])).unwrap(), JValue::Null);
    }

    #[test]
    fn test_comparators() {
        let cmp = |op, l: serde_json::Value, r: serde_json::Value| {
            eval(&AstNode::compare(op, AstNode::literal(l), AstNode::literal(r)), json!(null))
        };
        assert_eq!(cmp(Comparator::Equal, json!({"a": [1]}), json!({"a": [1]})).unwrap(), jvalue!(true));
        assert_eq!(cmp(Comparator::NotEqual, json!(1), json!("1")).unwrap(), jvalue!(true));
        assert_eq!(cmp(Comparator::LessThan, json!(1), json!(2)).unwrap(), jvalue!(true));
        assert_eq!(cmp(Comparator::GreaterThanOrEqual, json!("3"), json!(3)).unwrap(), jvalue!(true));
        assert!(cmp(Comparator::GreaterThan, json!([1]), json!(2)).unwrap_err().is_type_error());
    }

    #[test]
    fn test_index() {
        let data = json!(["a", "b", "c"]);
        assert_eq!(eval(&AstNode::Index(0), data.clone()).unwrap(), jvalue!("a"));
        assert_eq!(eval(&AstNode::Index(-1), data.clone()).unwrap(), jvalue!("c"));
        assert_eq!(eval(&AstNode::Index(3), data.clone()).unwrap(), JValue::Null);
        assert_eq!(eval(&AstNode::Index(-4), data).unwrap(), JValue::Null);
        assert_eq!(eval(&AstNode::Index(0), json!({"a": 1})).unwrap(), JValue::Null);
    }

    #[test]
    fn test_slice_node() {
        let data = json!([0, 1, 2, 3, 4]);
        assert_eq!(eval(&AstNode::slice(Some(1), Some(4), None), data.clone()).unwrap(), jvalue!([1, 2, 3]));
        assert_eq!(eval(&AstNode::slice(Some(-2), None, None), data.clone()).unwrap(), jvalue!([3, 4]));
        assert_eq!(eval(&AstNode::slice(None, None, Some(-2)), data.clone()).unwrap(), jvalue!([4, 2, 0]));
        assert!(matches!(
            eval(&AstNode::slice(None, None, Some(0)), data).unwrap_err(),
            EvaluatorError::InvalidSlice(_)
        ));
        assert_eq!(eval(&AstNode::slice(None, None, None), json!("abc")).unwrap(), JValue::Null);
    }

    #[test]
    fn test_projection_drops_nulls() {
        let data = json!({"people": [{"name": "a"}, {"age": 1}, {"name": "c"}]});
        let node = AstNode::projection(AstNode::field("people"), AstNode::field("name"));
        assert_eq!(eval(&node, data).unwrap(), jvalue!(["a", "c"]));

        let node = AstNode::projection(AstNode::field("people"), AstNode::field("name"));
        assert_eq!(eval(&node, json!({"people": {"name": "a"}})).unwrap(), JValue::Null);
    }

    #[test]
    fn test_projection_propagates_child_errors() {
        let node = AstNode::projection(
            AstNode::Identity,
            AstNode::function("no_such_fn", vec![]),
        );
        let err = eval(&node, json!([1])).unwrap_err();
        assert!(matches!(err, EvaluatorError::UnknownFunction(_)));
    }

    #[test]
    fn test_filter_projection() {
        let data = json!({"items": [{"n": 1, "ok": true}, {"n": 2, "ok": false}, {"n": 3, "ok": 0}]});
        let node = AstNode::filter_projection(
            AstNode::field("items"),
            AstNode::field("n"),
            AstNode::field("ok"),
        );
        assert_eq!(eval(&node, data).unwrap(), jvalue!([1, 3]));
    }

    #[test]
    fn test_value_projection() {
        let data = json!({"a": {"x": 1}, "b": {"y": 2}, "c": {"x": 3}});
        let node = AstNode::value_projection(AstNode::Identity, AstNode::field("x"));
        assert_eq!(eval(&node, data).unwrap(), jvalue!([1, 3]));
        assert_eq!(eval(&node, json!([1, 2])).unwrap(), JValue::Null);
    }

    #[test]
    fn test_flatten_one_level() {
        let data = json!([1, [2, [3, 4]], [5]]);
        let node = AstNode::flatten(AstNode::Identity);
        assert_eq!(eval(&node, data).unwrap(), jvalue!([1, 2, [3, 4], 5]));
        assert_eq!(eval(&node, json!({"a": 1})).unwrap(), JValue::Null);
    }

    #[test]
    fn test_multi_select() {
        let data = json!({"a": 1, "b": 2});
        let list = AstNode::MultiSelectList(vec![AstNode::field("b"), AstNode::field("a")]);
        assert_eq!(eval(&list, data.clone()).unwrap(), jvalue!([2, 1]));

        let hash = AstNode::MultiSelectHash(vec![
            AstNode::key_val("x", AstNode::field("a")),
            AstNode::key_val("y", AstNode::field("missing")),
        ]);
        assert_eq!(eval(&hash, data).unwrap(), jvalue!({"x": 1, "y": null}));
        assert_eq!(eval(&hash, json!(null)).unwrap(), JValue::Null);
        assert_eq!(eval(&list, json!(null)).unwrap(), JValue::Null);
    }

    #[test]
    fn test_logical_operators() {
        let or = |l: serde_json::Value| {
            eval(&AstNode::or(AstNode::literal(l), AstNode::literal(json!("rhs"))), json!(null)).unwrap()
        };
        for falsy in [json!(false), json!(null), json!(""), json!([]), json!({})] {
            assert_eq!(or(falsy), jvalue!("rhs"));
        }
        assert_eq!(or(json!(0)), jvalue!(0));

        let and = AstNode::and(AstNode::literal(json!([])), AstNode::literal(json!("rhs")));
        assert_eq!(eval(&and, json!(null)).unwrap(), jvalue!([]));
        let and = AstNode::and(AstNode::literal(json!(1)), AstNode::literal(json!("rhs")));
        assert_eq!(eval(&and, json!(null)).unwrap(), jvalue!("rhs"));

        assert_eq!(eval(&AstNode::not(AstNode::literal(json!({}))), json!(null)).unwrap(), jvalue!(true));
        assert_eq!(eval(&AstNode::not(AstNode::literal(json!(0))), json!(null)).unwrap(), jvalue!(false));
    }

    #[test]
    fn test_pipe_keeps_root() {
        let data = json!({"a": {"b": 1}, "top": "root"});
        let node = AstNode::Pipe(vec![
            AstNode::field("a"),
            AstNode::MultiSelectList(vec![AstNode::field("b"), AstNode::subexpr(AstNode::RootNode, AstNode::field("top"))]),
        ]);
        assert_eq!(eval(&node, data).unwrap(), jvalue!([1, "root"]));
    }

    #[test]
    fn test_expression_ref_is_opaque() {
        let node = AstNode::expref(AstNode::field("a"));
        let result = eval(&node, json!({"a": 1})).unwrap();
        assert!(result.is_expression_ref());
        assert_eq!(result.coerce_f64(), None);
    }

    #[test]
    fn test_recursion_limit() {
        let mut node = AstNode::Identity;
        for _ in 0..20 {
            node = AstNode::not(node);
        }
        let shallow = Evaluator::builder().registry(FunctionRegistry::new()).max_depth(10).build();
        let err = shallow.evaluate(&node, &JValue::Null).unwrap_err();
        assert!(matches!(err, EvaluatorError::RecursionLimit(10)));

        // frames unwind the counter on failure
        assert_eq!(shallow.evaluate(&AstNode::Identity, &JValue::Null).unwrap(), JValue::Null);
        assert!(evaluator().evaluate(&node, &JValue::Null).is_ok());
    }

    #[test]
    fn test_long_field_chain_within_default_depth() {
        // deep recursion needs more stack than the default test thread has
        let handle = std::thread::Builder::new()
            .stack_size(64 << 20)
            .spawn(|| {
                let fields = vec!["k"; 400];
                let mut data = json!("leaf");
                for _ in 0..fields.len() {
                    data = json!({ "k": data });
                }
                eval(&path(&fields), data).map(|v| v.to_string())
            })
            .unwrap();
        assert_eq!(handle.join().unwrap().unwrap(), "\"leaf\"");
    }

    #[derive(Debug)]
    struct Team {
        members: Vec<JValue>,
    }

    impl HostRecord for Team {
        fn type_name(&self) -> &str {
            "Team"
        }

        fn fields(&self) -> Vec<RecordField> {
            vec![RecordField::tagged("TeamName", "team_name", JValue::string("core"))]
        }

        fn elements(&self) -> Option<Vec<JValue>> {
            Some(self.members.clone())
        }
    }

    #[test]
    fn test_host_records() {
        let team = JValue::record(Team {
            members: vec![jvalue!({"name": "a"}), jvalue!({"name": "b"})],
        });
        let data = JValue::object(IndexMap::from([
            ("team".to_string(), team),
            ("label".to_string(), jvalue!("outer")),
        ]));
        let evaluator = evaluator();

        let names = AstNode::projection(AstNode::field("team"), AstNode::field("name"));
        assert_eq!(evaluator.evaluate(&names, &data).unwrap(), jvalue!(["a", "b"]));

        let tag = AstNode::subexpr(AstNode::field("team"), AstNode::field("team_name"));
        assert_eq!(evaluator.evaluate(&tag, &data).unwrap(), jvalue!("core"));

        let last = AstNode::index_expr(AstNode::field("team"), AstNode::Index(-1));
        assert_eq!(evaluator.evaluate(&last, &data).unwrap(), jvalue!({"name": "b"}));

        // the root stays the outer document inside the projection
        let root = AstNode::projection(
            AstNode::field("team"),
            AstNode::subexpr(AstNode::RootNode, AstNode::field("label")),
        );
        assert_eq!(evaluator.evaluate(&root, &data).unwrap(), jvalue!(["outer", "outer"]));
    }
}

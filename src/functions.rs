// Built-in function implementations
//
// Handlers receive arguments already validated against their signature, as
// typed `Arg` slots. A slot that does not have the declared shape is reported
// as a type error rather than trusted.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::dispatcher::FunctionSpec;
use crate::evaluator::{Evaluator, EvaluatorError};
use crate::signature::{Arg, ArgSpec, TypeClass as T};
use crate::value::{ExprRef, JValue, Number};

fn signature_violation(name: &str) -> EvaluatorError {
    EvaluatorError::TypeError(format!("{}: arguments do not match the signature", name))
}

fn number(name: &str, n: &Number) -> Result<f64, EvaluatorError> {
    n.to_f64()
        .ok_or_else(|| EvaluatorError::InvalidNumber(format!("{}: cannot convert {} to a number", name, n)))
}

/// Built-in string functions
pub mod string {
    use super::*;

    pub fn starts_with(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        match args.as_slice() {
            [Arg::String(subject), Arg::String(prefix)] => Ok(JValue::Bool(subject.starts_with(&**prefix))),
            _ => Err(signature_violation("starts_with")),
        }
    }

    pub fn ends_with(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        match args.as_slice() {
            [Arg::String(subject), Arg::String(suffix)] => Ok(JValue::Bool(subject.ends_with(&**suffix))),
            _ => Err(signature_violation("ends_with")),
        }
    }

    pub fn join(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        match args.as_slice() {
            [Arg::String(separator), Arg::StringArray(items)] => {
                let parts: Vec<&str> = items.iter().map(|s| &**s).collect();
                Ok(JValue::from(parts.join(&**separator)))
            }
            _ => Err(signature_violation("join")),
        }
    }

    /// `to_string`: strings pass through, everything else becomes JSON text.
    pub fn to_string(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        match args.as_slice() {
            [Arg::Any(value)] => Ok(JValue::from(canonical_text(value)?)),
            _ => Err(signature_violation("to_string")),
        }
    }

    pub(crate) fn canonical_text(value: &JValue) -> Result<String, EvaluatorError> {
        match value {
            JValue::String(s) => Ok(s.to_string()),
            other => Ok(other.to_json_string()?),
        }
    }
}

/// Built-in numeric functions
pub mod numeric {
    use super::*;

    fn unary(name: &str, args: Vec<Arg>, op: fn(f64) -> f64) -> Result<JValue, EvaluatorError> {
        match args.as_slice() {
            [Arg::Number(n)] => Ok(JValue::from(op(number(name, n)?))),
            _ => Err(signature_violation(name)),
        }
    }

    pub fn abs(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        unary("abs", args, f64::abs)
    }

    pub fn ceil(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        unary("ceil", args, f64::ceil)
    }

    pub fn floor(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        unary("floor", args, f64::floor)
    }

    fn total(name: &str, items: &[Number]) -> Result<f64, EvaluatorError> {
        items
            .iter()
            .try_fold(0.0, |acc, n| -> Result<f64, EvaluatorError> { Ok(acc + number(name, n)?) })
    }

    pub fn sum(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        match args.as_slice() {
            [Arg::NumberArray(items)] => Ok(JValue::from(total("sum", items)?)),
            _ => Err(signature_violation("sum")),
        }
    }

    /// Mean of the array; an empty array divides by zero and gives NaN.
    pub fn avg(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        match args.as_slice() {
            [Arg::NumberArray(items)] => Ok(JValue::from(total("avg", items)? / items.len() as f64)),
            _ => Err(signature_violation("avg")),
        }
    }

    pub fn max(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        extremum("max", args, Ordering::Greater)
    }

    pub fn min(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        extremum("min", args, Ordering::Less)
    }

    /// Linear scan keeping the first element that beats the best so far strictly.
    fn extremum(name: &str, args: Vec<Arg>, wanted: Ordering) -> Result<JValue, EvaluatorError> {
        match args.as_slice() {
            [Arg::NumberArray(items)] => {
                let mut best: Option<(f64, &Number)> = None;
                for n in items {
                    let current = number(name, n)?;
                    let better = match best {
                        None => true,
                        Some((value, _)) => current.partial_cmp(&value) == Some(wanted),
                    };
                    if better {
                        best = Some((current, n));
                    }
                }
                Ok(best.map(|(_, n)| JValue::Number(n.clone())).unwrap_or(JValue::Null))
            }
            [Arg::StringArray(items)] => {
                let mut best: Option<&Rc<str>> = None;
                for s in items {
                    if best.map_or(true, |b| s.cmp(b) == wanted) {
                        best = Some(s);
                    }
                }
                Ok(best.map(|s| JValue::String(Rc::clone(s))).unwrap_or(JValue::Null))
            }
            _ => Err(signature_violation(name)),
        }
    }

    /// `to_number`: null when the value does not parse or is not number-like.
    pub fn to_number(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        match args.as_slice() {
            [Arg::Any(value)] => match value {
                JValue::Number(Number::Float(_)) => Ok(value.clone()),
                JValue::Number(n) => Ok(n.to_f64().map(JValue::from).unwrap_or(JValue::Null)),
                JValue::String(s) => Ok(s
                    .trim()
                    .parse::<f64>()
                    .map(JValue::from)
                    .unwrap_or(JValue::Null)),
                JValue::Array(_) | JValue::Object(_) | JValue::Bool(_) | JValue::Null => Ok(JValue::Null),
                other => Err(EvaluatorError::TypeError(format!(
                    "to_number: unknown type {}",
                    other.kind_name()
                ))),
            },
            _ => Err(signature_violation("to_number")),
        }
    }
}

/// Built-in array functions
pub mod array {
    use rand::Rng;

    use super::*;
    use crate::signature::SignatureError;
    use crate::utils;

    pub fn length(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        match args.as_slice() {
            [Arg::String(s)] => Ok(JValue::from(s.chars().count())),
            [Arg::Array(items)] => Ok(JValue::from(items.len())),
            [Arg::Object(map)] => Ok(JValue::from(map.len())),
            _ => Err(EvaluatorError::TypeError("could not compute length()".to_string())),
        }
    }

    pub fn contains(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        match args.as_slice() {
            [Arg::String(subject), Arg::Any(search)] => Ok(JValue::Bool(match search {
                JValue::String(needle) => subject.contains(&**needle),
                _ => false,
            })),
            [Arg::Array(items), Arg::Any(search)] => {
                Ok(JValue::Bool(items.iter().any(|item| item.deep_eq(search))))
            }
            _ => Err(signature_violation("contains")),
        }
    }

    /// True when any element of the second argument is contained in the first.
    pub fn contains_any(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        let (subject, candidates) = match args.as_slice() {
            [subject, Arg::Any(candidates)] => (subject, candidates),
            _ => return Err(signature_violation("contains_any")),
        };
        let candidates = candidates.to_sequence().ok_or_else(|| {
            EvaluatorError::TypeError(format!(
                "contains_any: expected an array of candidates, got {}",
                candidates.kind_name()
            ))
        })?;
        let found = match subject {
            Arg::Array(items) => items
                .iter()
                .any(|item| candidates.iter().any(|candidate| item.deep_eq(candidate))),
            Arg::String(subject) => candidates.iter().any(|candidate| match candidate {
                JValue::String(needle) => subject.contains(&**needle),
                _ => false,
            }),
            _ => return Err(signature_violation("contains_any")),
        };
        Ok(JValue::Bool(found))
    }

    /// Later arrays are checked here: only the first slot is type-checked.
    pub fn zip(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        let mut sequences = Vec::with_capacity(args.len());
        for arg in args {
            match arg.into_value().to_sequence() {
                Some(items) => sequences.push(items),
                None => return Ok(JValue::array(Vec::new())),
            }
        }
        let shortest = sequences.iter().map(|s| s.len()).min().unwrap_or(0);
        let rows = (0..shortest)
            .map(|i| JValue::array(sequences.iter().map(|s| s[i].clone()).collect()))
            .collect();
        Ok(JValue::array(rows))
    }

    pub fn sort(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        match args.as_slice() {
            [Arg::StringArray(items)] => {
                let mut sorted = items.clone();
                sorted.sort();
                Ok(JValue::array(sorted.into_iter().map(JValue::String).collect()))
            }
            [Arg::NumberArray(items)] => {
                let mut keyed = items
                    .iter()
                    .map(|n| -> Result<(f64, &Number), EvaluatorError> { Ok((number("sort", n)?, n)) })
                    .collect::<Result<Vec<_>, _>>()?;
                keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
                Ok(JValue::array(
                    keyed.into_iter().map(|(_, n)| JValue::Number(n.clone())).collect(),
                ))
            }
            _ => Err(signature_violation("sort")),
        }
    }

    pub fn dedup(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        let keyed: Vec<(SortKey, JValue)> = match args.into_iter().next() {
            Some(Arg::StringArray(items)) => items
                .into_iter()
                .map(|s| (SortKey::String(Rc::clone(&s)), JValue::String(s)))
                .collect(),
            Some(Arg::NumberArray(items)) => items
                .into_iter()
                .map(|n| -> Result<(SortKey, JValue), EvaluatorError> {
                    Ok((SortKey::Number(number("dedup", &n)?), JValue::Number(n)))
                })
                .collect::<Result<_, _>>()?,
            _ => return Err(signature_violation("dedup")),
        };
        let mut seen = HashSet::new();
        Ok(JValue::array(
            keyed
                .into_iter()
                .filter(|(key, _)| seen.insert(key.dedup_key()))
                .map(|(_, value)| value)
                .collect(),
        ))
    }

    pub fn reverse(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        match args.as_slice() {
            [Arg::Array(items)] => Ok(JValue::array(items.iter().rev().cloned().collect())),
            [Arg::String(s)] => Ok(JValue::from(s.chars().rev().collect::<String>())),
            _ => Err(signature_violation("reverse")),
        }
    }

    pub fn to_array(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        match args.as_slice() {
            [Arg::Any(value)] => Ok(utils::to_array(value)),
            _ => Err(signature_violation("to_array")),
        }
    }

    pub fn not_null(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        Ok(args
            .into_iter()
            .map(Arg::into_value)
            .find(|value| !value.is_null())
            .unwrap_or(JValue::Null))
    }

    /// Unbiased Fisher–Yates over a copy, driven by the evaluator's generator.
    pub fn shuffle(evaluator: &Evaluator, _root: &JValue, args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        let mut items = match args.as_slice() {
            [Arg::Array(items)] => items.to_vec(),
            _ => return Err(signature_violation("shuffle")),
        };
        let mut rng = evaluator.rng();
        for i in (1..items.len()).rev() {
            let j = rng.gen_range(0..=i);
            items.swap(i, j);
        }
        Ok(JValue::array(items))
    }

    /// `slice(array, start, stop[, step])`, forward only.
    ///
    /// A start outside the array gives an empty result; the walk stops at
    /// `stop` or at the end of the array, whichever comes first.
    pub fn slice(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        if !(3..=4).contains(&args.len()) {
            return Err(SignatureError::ArityMismatch {
                name: "slice".to_string(),
                expected: if args.len() < 3 { 3 } else { 4 },
                actual: args.len(),
                variadic: false,
            }
            .into());
        }
        let mut args = args.into_iter();
        let subject = args.next().map(Arg::into_value).unwrap_or(JValue::Null);
        let Some(items) = subject.to_sequence() else {
            return Err(EvaluatorError::TypeError(format!(
                "slice: expected an array, got {}",
                subject.kind_name()
            )));
        };
        let start = integer(args.next())?;
        let stop = integer(args.next())?;
        let step = match args.next() {
            Some(arg) => integer(Some(arg))?,
            None => 1,
        };
        if step <= 0 {
            return Err(EvaluatorError::InvalidSlice(format!(
                "slice: step must be positive, got {}",
                step
            )));
        }

        let len = items.len() as i64;
        if start < 0 || start >= len {
            return Ok(JValue::array(Vec::new()));
        }
        let mut result = Vec::new();
        let mut i = start;
        while i < stop && i < len {
            result.push(items[i as usize].clone());
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
        Ok(JValue::array(result))
    }

    fn integer(arg: Option<Arg>) -> Result<i64, EvaluatorError> {
        let value = arg.map(Arg::into_value).unwrap_or(JValue::Null);
        value
            .coerce_f64()
            .filter(|f| f.is_finite())
            .map(|f| f as i64)
            .ok_or_else(|| EvaluatorError::InvalidNumber(format!("slice: {} is not an integer", value)))
    }
}

/// Built-in object functions
pub mod object {
    use indexmap::IndexMap;

    use super::*;

    pub fn keys(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        match args.as_slice() {
            [Arg::Object(map)] => Ok(JValue::array(map.keys().map(|k| JValue::from(k.as_str())).collect())),
            _ => Err(signature_violation("keys")),
        }
    }

    pub fn values(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        match args.as_slice() {
            [Arg::Object(map)] => Ok(JValue::array(map.values().cloned().collect())),
            _ => Err(signature_violation("values")),
        }
    }

    pub fn items(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        match args.as_slice() {
            [Arg::Object(map)] => Ok(JValue::array(
                map.iter()
                    .map(|(k, v)| JValue::array(vec![JValue::from(k.as_str()), v.clone()]))
                    .collect(),
            )),
            _ => Err(signature_violation("items")),
        }
    }

    pub fn get(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        match args.as_slice() {
            [Arg::Object(map), Arg::String(key)] => map
                .get(&**key)
                .cloned()
                .ok_or_else(|| EvaluatorError::KeyNotFound(key.to_string())),
            _ => Err(signature_violation("get")),
        }
    }

    /// Right-most argument wins on key collisions.
    pub fn merge(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        let mut merged = IndexMap::new();
        for arg in args {
            let map = match arg.into_value() {
                JValue::Object(map) => map,
                other => {
                    return Err(EvaluatorError::TypeError(format!(
                        "merge: expected an object, got {}",
                        other.kind_name()
                    )))
                }
            };
            for (k, v) in map.iter() {
                merged.insert(k.clone(), v.clone());
            }
        }
        Ok(JValue::object(merged))
    }

    /// Build an object from `[key, value...]` entries.
    ///
    /// A key seen once holds its single value (or the list of values when the
    /// entry carries several); a repeated key turns the stored value into a
    /// list and appends.
    pub fn from_items(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        let entries = match args.as_slice() {
            [Arg::Array(entries)] => Rc::clone(entries),
            _ => return Err(signature_violation("from_items")),
        };
        let mut result: IndexMap<String, JValue> = IndexMap::new();
        for entry in entries.iter() {
            let entry = entry.to_sequence().ok_or_else(|| {
                EvaluatorError::TypeError(format!(
                    "from_items: expected [key, value] entries, got {}",
                    entry.kind_name()
                ))
            })?;
            let Some((key, values)) = entry.split_first() else {
                continue;
            };
            let key = string::canonical_text(key)?;
            let values: Vec<JValue> = if values.is_empty() {
                vec![JValue::Null]
            } else {
                values.to_vec()
            };
            let merged = match result.get(&key) {
                None if values.len() > 1 => JValue::array(values),
                None => values.into_iter().next().unwrap_or(JValue::Null),
                Some(existing) => {
                    let mut list = match existing {
                        JValue::Array(items) => items.to_vec(),
                        other => vec![other.clone()],
                    };
                    list.extend(values);
                    JValue::array(list)
                }
            };
            result.insert(key, merged);
        }
        Ok(JValue::object(result))
    }

    /// `type`: JSON kind name of the argument.
    pub fn type_of(args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        match args.as_slice() {
            [Arg::Any(value)] => match value {
                JValue::ExpressionRef(_) | JValue::Record(_) => {
                    Err(EvaluatorError::TypeError("unknown type".to_string()))
                }
                other => Ok(JValue::from(other.kind_name())),
            },
            _ => Err(signature_violation("type")),
        }
    }
}

/// Higher-order functions: evaluate an expression reference per element.
pub mod higher_order {
    use super::*;

    fn expression<'a>(name: &str, args: &'a [Arg]) -> Result<(&'a Rc<Vec<JValue>>, &'a ExprRef), EvaluatorError> {
        match args {
            [Arg::Array(items), Arg::ExpressionRef(expr)] => Ok((items, expr)),
            _ => Err(signature_violation(name)),
        }
    }

    /// `map(&expr, array)`: nulls are kept.
    pub fn map(evaluator: &Evaluator, root: &JValue, args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        let (expr, items) = match args.as_slice() {
            [Arg::ExpressionRef(expr), Arg::Array(items)] => (expr, items),
            _ => return Err(signature_violation("map")),
        };
        let mapped = items
            .iter()
            .map(|item| evaluator.execute(expr.node(), item, root))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(JValue::array(mapped))
    }

    pub fn max_by(evaluator: &Evaluator, root: &JValue, args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        extremum_by("max_by", evaluator, root, &args, Ordering::Greater)
    }

    pub fn min_by(evaluator: &Evaluator, root: &JValue, args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        extremum_by("min_by", evaluator, root, &args, Ordering::Less)
    }

    fn extremum_by(
        name: &str,
        evaluator: &Evaluator,
        root: &JValue,
        args: &[Arg],
        wanted: Ordering,
    ) -> Result<JValue, EvaluatorError> {
        let (items, expr) = expression(name, args)?;
        match items.len() {
            0 => return Ok(JValue::Null),
            1 => return Ok(items[0].clone()),
            _ => {}
        }
        let keys = keys_by(name, evaluator, root, items, expr)?;
        let mut best = 0;
        for (i, key) in keys.iter().enumerate().skip(1) {
            if key.compare(&keys[best]) == wanted {
                best = i;
            }
        }
        Ok(items[best].clone())
    }

    /// Stable sort by the derived key.
    pub fn sort_by(evaluator: &Evaluator, root: &JValue, args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        let (items, expr) = expression("sort_by", &args)?;
        if items.len() < 2 {
            return Ok(JValue::Array(Rc::clone(items)));
        }
        let keys = keys_by("sort_by", evaluator, root, items, expr)?;
        let mut order: Vec<usize> = (0..items.len()).collect();
        order.sort_by(|&a, &b| keys[a].compare(&keys[b]));
        Ok(JValue::array(order.into_iter().map(|i| items[i].clone()).collect()))
    }

    /// Keeps the first element of every run of equal derived keys, in order.
    pub fn dedup_by(evaluator: &Evaluator, root: &JValue, args: Vec<Arg>) -> Result<JValue, EvaluatorError> {
        let (items, expr) = expression("dedup_by", &args)?;
        if items.len() < 2 {
            return Ok(JValue::Array(Rc::clone(items)));
        }
        let keys = keys_by("dedup_by", evaluator, root, items, expr)?;
        let mut seen = HashSet::new();
        Ok(JValue::array(
            items
                .iter()
                .zip(keys.iter())
                .filter(|(_, key)| seen.insert(key.dedup_key()))
                .map(|(item, _)| item.clone())
                .collect(),
        ))
    }

    /// Derive one key per element. The first key fixes the kind (number or
    /// string) every later key must share.
    fn keys_by(
        name: &str,
        evaluator: &Evaluator,
        root: &JValue,
        items: &[JValue],
        expr: &ExprRef,
    ) -> Result<Vec<SortKey>, EvaluatorError> {
        let mut keys: Vec<SortKey> = Vec::with_capacity(items.len());
        for item in items {
            let key = match evaluator.execute(expr.node(), item, root)? {
                JValue::Number(n) => SortKey::Number(number(name, &n)?),
                JValue::String(s) => SortKey::String(s),
                other => {
                    return Err(EvaluatorError::TypeError(format!(
                        "{}: invalid type {}, must be number or string",
                        name,
                        other.kind_name()
                    )))
                }
            };
            if let Some(first) = keys.first() {
                if !first.same_kind(&key) {
                    return Err(EvaluatorError::TypeError(format!(
                        "{}: invalid type, must be {}",
                        name,
                        first.kind_name()
                    )));
                }
            }
            keys.push(key);
        }
        Ok(keys)
    }
}

/// Comparison key of the ordering and dedup functions.
#[derive(Debug, Clone)]
enum SortKey {
    Number(f64),
    String(Rc<str>),
}

#[derive(Debug, PartialEq, Eq, Hash)]
enum DedupKey {
    Number(u64),
    String(Rc<str>),
}

impl SortKey {
    fn same_kind(&self, other: &SortKey) -> bool {
        matches!(
            (self, other),
            (SortKey::Number(_), SortKey::Number(_)) | (SortKey::String(_), SortKey::String(_))
        )
    }

    fn kind_name(&self) -> &'static str {
        match self {
            SortKey::Number(_) => "number",
            SortKey::String(_) => "string",
        }
    }

    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (SortKey::String(a), SortKey::String(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }

    fn dedup_key(&self) -> DedupKey {
        match self {
            // -0.0 and 0.0 are the same key
            SortKey::Number(n) if *n == 0.0 => DedupKey::Number(0.0f64.to_bits()),
            SortKey::Number(n) => DedupKey::Number(n.to_bits()),
            SortKey::String(s) => DedupKey::String(Rc::clone(s)),
        }
    }
}

/// Name → spec table of every built-in.
pub(crate) fn builtin_table() -> HashMap<&'static str, FunctionSpec> {
    fn one(types: &[T]) -> Vec<ArgSpec> {
        vec![ArgSpec::new(types)]
    }
    fn two(a: &[T], b: &[T]) -> Vec<ArgSpec> {
        vec![ArgSpec::new(a), ArgSpec::new(b)]
    }
    fn array_expr() -> Vec<ArgSpec> {
        two(&[T::Array], &[T::ExpressionRef])
    }

    let specs = vec![
        FunctionSpec::new("length", one(&[T::String, T::Array, T::Object]), array::length),
        FunctionSpec::new("starts_with", two(&[T::String], &[T::String]), string::starts_with),
        FunctionSpec::new("ends_with", two(&[T::String], &[T::String]), string::ends_with),
        FunctionSpec::new("abs", one(&[T::Number]), numeric::abs),
        FunctionSpec::new("ceil", one(&[T::Number]), numeric::ceil),
        FunctionSpec::new("floor", one(&[T::Number]), numeric::floor),
        FunctionSpec::new("avg", one(&[T::ArrayOfNumber]), numeric::avg),
        FunctionSpec::new("sum", one(&[T::ArrayOfNumber]), numeric::sum),
        FunctionSpec::new("max", one(&[T::ArrayOfNumber, T::ArrayOfString]), numeric::max),
        FunctionSpec::new("min", one(&[T::ArrayOfNumber, T::ArrayOfString]), numeric::min),
        FunctionSpec::with_context("max_by", array_expr(), higher_order::max_by),
        FunctionSpec::with_context("min_by", array_expr(), higher_order::min_by),
        FunctionSpec::with_context("sort_by", array_expr(), higher_order::sort_by),
        FunctionSpec::with_context("dedup_by", array_expr(), higher_order::dedup_by),
        FunctionSpec::with_context("map", two(&[T::ExpressionRef], &[T::Array]), higher_order::map),
        FunctionSpec::new("sort", one(&[T::ArrayOfString, T::ArrayOfNumber]), array::sort),
        FunctionSpec::new("dedup", one(&[T::ArrayOfString, T::ArrayOfNumber]), array::dedup),
        FunctionSpec::new("contains", two(&[T::Array, T::String], &[T::Any]), array::contains),
        FunctionSpec::new("contains_any", two(&[T::Array, T::String], &[T::Any]), array::contains_any),
        FunctionSpec::new("merge", vec![ArgSpec::variadic(&[T::Object])], object::merge),
        FunctionSpec::new("zip", vec![ArgSpec::variadic(&[T::Array])], array::zip),
        FunctionSpec::new("keys", one(&[T::Object]), object::keys),
        FunctionSpec::new("values", one(&[T::Object]), object::values),
        FunctionSpec::new("items", one(&[T::Object]), object::items),
        FunctionSpec::new("get", two(&[T::Object], &[T::String]), object::get),
        FunctionSpec::with_context("shuffle", one(&[T::Array]), array::shuffle),
        FunctionSpec::new(
            "slice",
            vec![ArgSpec::new(&[T::Array]), ArgSpec::variadic(&[T::Number])],
            array::slice,
        ),
        FunctionSpec::new("join", two(&[T::String], &[T::ArrayOfString]), string::join),
        FunctionSpec::new("reverse", one(&[T::Array, T::String]), array::reverse),
        FunctionSpec::new("to_array", one(&[T::Any]), array::to_array),
        FunctionSpec::new("from_items", one(&[T::Array]), object::from_items),
        FunctionSpec::new("to_string", one(&[T::Any]), string::to_string),
        FunctionSpec::new("to_number", one(&[T::Any]), numeric::to_number),
        FunctionSpec::new("not_null", vec![ArgSpec::variadic(&[T::Any])], array::not_null),
        FunctionSpec::new("type", one(&[T::Any]), object::type_of),
    ];
    specs.into_iter().map(|spec| (spec.name, spec)).collect()
}

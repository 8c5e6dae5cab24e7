// JValue: Rc-wrapped dynamic value shared by the evaluator and the function library

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::ast::AstNode;
use crate::record::HostRecord;

/// Largest integer magnitude an f64 holds exactly (2^53).
const MAX_EXACT_INTEGER: u64 = 1 << 53;

/// A JSON number, either a native float or a decimal token kept verbatim.
///
/// Decimal tokens come from exact-precision parsing (integers too large for an
/// f64) or from hosts that hand over numbers as text. Arithmetic coerces them
/// through [`Number::to_f64`].
#[derive(Clone, Debug)]
pub enum Number {
    Float(f64),
    Decimal(Rc<str>),
}

impl Number {
    /// Numeric value, or `None` when a decimal token does not parse.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Number::Float(f) => Some(*f),
            Number::Decimal(token) => token.trim().parse::<f64>().ok(),
        }
    }

    pub fn is_integer(&self) -> bool {
        match self {
            Number::Float(f) => f.is_finite() && f.fract() == 0.0,
            Number::Decimal(token) => {
                let t = token.trim();
                t.parse::<i128>().is_ok() || self.to_f64().is_some_and(|f| f.fract() == 0.0)
            }
        }
    }

    /// Exact integer value, when the number is integral and fits an `i128`.
    fn to_i128(&self) -> Option<i128> {
        match self {
            Number::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e38 => Some(*f as i128),
            Number::Float(_) => None,
            Number::Decimal(token) => token.trim().parse::<i128>().ok(),
        }
    }

    fn numeric_eq(&self, other: &Number) -> bool {
        if let (Number::Decimal(a), Number::Decimal(b)) = (self, other) {
            if a.trim() == b.trim() {
                return true;
            }
        }
        // integers beyond 2^53 would collapse once rounded to f64
        if let (Some(a), Some(b)) = (self.to_i128(), other.to_i128()) {
            return a == b;
        }
        match (self.to_f64(), other.to_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Float(n) => format_number(*n, f),
            Number::Decimal(token) => write!(f, "{}", token),
        }
    }
}

/// Handle to an unevaluated AST subtree, produced by `&expr`.
///
/// Only the evaluator can consume it; it has no scalar or container view.
#[derive(Clone, Debug)]
pub struct ExprRef(Rc<AstNode>);

impl ExprRef {
    pub fn new(node: AstNode) -> Self {
        ExprRef(Rc::new(node))
    }

    pub fn node(&self) -> &AstNode {
        &self.0
    }
}

/// A JSON-like value with O(1) clone semantics via Rc-wrapping.
///
/// Besides the JSON kinds it carries expression references (arguments to
/// higher-order functions) and opaque host records inspected through a
/// [`FieldResolver`](crate::record::FieldResolver).
#[derive(Clone)]
pub enum JValue {
    Null,
    Bool(bool),
    Number(Number),
    String(Rc<str>),
    Array(Rc<Vec<JValue>>),
    Object(Rc<IndexMap<String, JValue>>),
    ExpressionRef(ExprRef),
    Record(Rc<dyn HostRecord>),
}

// ── Type checks ──────────────────────────────────────────────────────────────

impl JValue {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, JValue::Null)
    }

    #[inline]
    pub fn is_bool(&self) -> bool {
        matches!(self, JValue::Bool(_))
    }

    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self, JValue::Number(_))
    }

    /// True for numbers with no fractional part, whatever their representation.
    #[inline]
    pub fn is_integer(&self) -> bool {
        matches!(self, JValue::Number(n) if n.is_integer())
    }

    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, JValue::String(_))
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self, JValue::Array(_))
    }

    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, JValue::Object(_))
    }

    #[inline]
    pub fn is_expression_ref(&self) -> bool {
        matches!(self, JValue::ExpressionRef(_))
    }

    #[inline]
    pub fn is_record(&self) -> bool {
        matches!(self, JValue::Record(_))
    }

    /// Kind name used in diagnostics and by the `type()` function.
    pub fn kind_name(&self) -> &'static str {
        match self {
            JValue::Null => "null",
            JValue::Bool(_) => "boolean",
            JValue::Number(_) => "number",
            JValue::String(_) => "string",
            JValue::Array(_) => "array",
            JValue::Object(_) => "object",
            JValue::ExpressionRef(_) => "expref",
            JValue::Record(_) => "record",
        }
    }
}

// ── Extraction ───────────────────────────────────────────────────────────────

impl JValue {
    #[inline]
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            JValue::Number(n) => Some(n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().and_then(Number::to_f64)
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            JValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            JValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array(&self) -> Option<&Vec<JValue>> {
        match self {
            JValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object(&self) -> Option<&IndexMap<String, JValue>> {
        match self {
            JValue::Object(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    pub fn as_expression_ref(&self) -> Option<&ExprRef> {
        match self {
            JValue::ExpressionRef(expr) => Some(expr),
            _ => None,
        }
    }

    /// Index into an object by key.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&JValue> {
        match self {
            JValue::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Sequence view: native arrays as-is, host records through their element view.
    pub fn to_sequence(&self) -> Option<Rc<Vec<JValue>>> {
        match self {
            JValue::Array(arr) => Some(Rc::clone(arr)),
            JValue::Record(record) => record.elements().map(Rc::new),
            _ => None,
        }
    }
}

// ── Best-effort coercions ────────────────────────────────────────────────────
//
// The `to_*_lossy` family never fails: a value that cannot be coerced yields the
// zero value of the target type. Callers validate kinds before relying on them.

impl JValue {
    /// Numeric coercion used by ordering comparators and arithmetic functions.
    pub fn coerce_f64(&self) -> Option<f64> {
        match self {
            JValue::Number(n) => n.to_f64(),
            JValue::String(s) => s.trim().parse::<f64>().ok(),
            JValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn to_f64_lossy(&self) -> f64 {
        self.coerce_f64().unwrap_or(0.0)
    }

    pub fn to_i64_lossy(&self) -> i64 {
        match self {
            JValue::String(s) => {
                let t = s.trim();
                t.parse::<i64>()
                    .ok()
                    .or_else(|| t.parse::<f64>().ok().map(|f| f as i64))
                    .unwrap_or(0)
            }
            other => other.coerce_f64().map(|f| f as i64).unwrap_or(0),
        }
    }

    pub fn to_bool_lossy(&self) -> bool {
        match self {
            JValue::Bool(b) => *b,
            JValue::Number(n) => n.to_f64().is_some_and(|f| f != 0.0),
            JValue::String(s) => matches!(&**s, "1" | "t" | "T" | "true" | "TRUE" | "True"),
            _ => false,
        }
    }

    pub fn to_string_lossy(&self) -> String {
        match self {
            JValue::String(s) => s.to_string(),
            JValue::Null | JValue::ExpressionRef(_) => String::new(),
            JValue::Bool(b) => b.to_string(),
            JValue::Number(n) => n.to_string(),
            other => other.to_json_string().unwrap_or_default(),
        }
    }
}

// ── Generic container operations ─────────────────────────────────────────────

impl JValue {
    /// Length in Unicode scalar values for strings, element count for containers.
    pub fn length(&self) -> usize {
        match self {
            JValue::String(s) => s.chars().count(),
            JValue::Array(arr) => arr.len(),
            JValue::Object(map) => map.len(),
            JValue::Record(record) => match record.elements() {
                Some(elements) => elements.len(),
                None => record.fields().len(),
            },
            other => {
                tracing::warn!(kind = other.kind_name(), "length not available for value");
                0
            }
        }
    }

    /// Element `i` of an array, or the character at `i` of a string.
    ///
    /// Out-of-range array positions give null, out-of-range string positions
    /// give the empty string.
    pub fn index(&self, i: usize) -> JValue {
        match self {
            JValue::String(s) => s
                .chars()
                .nth(i)
                .map(|c| JValue::from(c.to_string()))
                .unwrap_or_else(|| JValue::string("")),
            other => match other.to_sequence() {
                Some(seq) => seq.get(i).cloned().unwrap_or(JValue::Null),
                None => {
                    tracing::warn!(kind = other.kind_name(), "index not available for value");
                    JValue::Null
                }
            },
        }
    }

    /// Half-open `[i, j)` range of an array or of a string's scalar values.
    ///
    /// Bounds are clamped to the length.
    pub fn slice(&self, i: usize, j: usize) -> JValue {
        let clamp = |len: usize| {
            let end = j.min(len);
            (i.min(end), end)
        };
        match self {
            JValue::String(s) => {
                let chars: Vec<char> = s.chars().collect();
                let (start, end) = clamp(chars.len());
                JValue::from(chars[start..end].iter().collect::<String>())
            }
            other => match other.to_sequence() {
                Some(seq) => {
                    let (start, end) = clamp(seq.len());
                    JValue::array(seq[start..end].to_vec())
                }
                None => {
                    tracing::warn!(kind = other.kind_name(), "slice not available for value");
                    JValue::array(Vec::new())
                }
            },
        }
    }

    /// Polymorphic membership test.
    ///
    /// Records test field existence by name, objects test key existence, strings
    /// test for a substring and arrays test element membership by deep equality.
    pub fn contains(&self, other: &JValue) -> bool {
        match self {
            JValue::Record(record) => {
                let name = other.to_string_lossy();
                record.fields().iter().any(|field| field.name == name)
            }
            JValue::Object(map) => match other {
                JValue::String(key) => map.contains_key(&**key),
                JValue::Number(n) if n.is_integer() => map.contains_key(&n.to_string()),
                _ => {
                    tracing::warn!(kind = other.kind_name(), "unsupported object lookup key");
                    false
                }
            },
            JValue::String(s) => s.contains(other.to_string_lossy().as_str()),
            JValue::Array(arr) => arr.iter().any(|item| item.deep_eq(other)),
            _ => {
                tracing::warn!(kind = self.kind_name(), "contains not available for value");
                false
            }
        }
    }

    /// Structural equality.
    ///
    /// Same kind, arrays element-wise in order, objects with identical key sets and
    /// deep-equal values. Numbers compare by value regardless of representation.
    pub fn deep_eq(&self, other: &JValue) -> bool {
        match (self, other) {
            (JValue::Null, JValue::Null) => true,
            (JValue::Bool(a), JValue::Bool(b)) => a == b,
            (JValue::Number(a), JValue::Number(b)) => a.numeric_eq(b),
            (JValue::String(a), JValue::String(b)) => a == b,
            (JValue::Array(a), JValue::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.deep_eq(y))
            }
            (JValue::Object(a), JValue::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|other| v.deep_eq(other)))
            }
            (JValue::ExpressionRef(a), JValue::ExpressionRef(b)) => Rc::ptr_eq(&a.0, &b.0),
            (JValue::Record(a), JValue::Record(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// JMESPath falsiness: null, false, "", [] and {}.
    ///
    /// Numbers (zero included) are never false-like. Empty host sequences are.
    pub fn is_false_like(&self) -> bool {
        match self {
            JValue::Null => true,
            JValue::Bool(b) => !b,
            JValue::String(s) => s.is_empty(),
            JValue::Array(arr) => arr.is_empty(),
            JValue::Object(map) => map.is_empty(),
            JValue::Record(record) => record.elements().is_some_and(|e| e.is_empty()),
            JValue::Number(_) | JValue::ExpressionRef(_) => false,
        }
    }
}

// ── Constructors ─────────────────────────────────────────────────────────────

impl JValue {
    #[inline]
    pub fn from_f64(n: f64) -> Self {
        JValue::Number(Number::Float(n))
    }

    /// A number kept as its decimal token.
    #[inline]
    pub fn decimal(token: impl Into<Rc<str>>) -> Self {
        JValue::Number(Number::Decimal(token.into()))
    }

    #[inline]
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        JValue::String(s.into())
    }

    #[inline]
    pub fn array(v: Vec<JValue>) -> Self {
        JValue::Array(Rc::new(v))
    }

    #[inline]
    pub fn object(m: IndexMap<String, JValue>) -> Self {
        JValue::Object(Rc::new(m))
    }

    #[inline]
    pub fn expression_ref(node: AstNode) -> Self {
        JValue::ExpressionRef(ExprRef::new(node))
    }

    #[inline]
    pub fn record(record: impl HostRecord + 'static) -> Self {
        JValue::Record(Rc::new(record))
    }
}

// ── From impls ───────────────────────────────────────────────────────────────

impl From<bool> for JValue {
    #[inline]
    fn from(b: bool) -> Self {
        JValue::Bool(b)
    }
}

impl From<i64> for JValue {
    fn from(n: i64) -> Self {
        if n.unsigned_abs() > MAX_EXACT_INTEGER {
            JValue::decimal(n.to_string())
        } else {
            JValue::from_f64(n as f64)
        }
    }
}

impl From<i32> for JValue {
    #[inline]
    fn from(n: i32) -> Self {
        JValue::from_f64(n as f64)
    }
}

impl From<u64> for JValue {
    fn from(n: u64) -> Self {
        if n > MAX_EXACT_INTEGER {
            JValue::decimal(n.to_string())
        } else {
            JValue::from_f64(n as f64)
        }
    }
}

impl From<usize> for JValue {
    #[inline]
    fn from(n: usize) -> Self {
        JValue::from(n as u64)
    }
}

impl From<f64> for JValue {
    #[inline]
    fn from(n: f64) -> Self {
        JValue::from_f64(n)
    }
}

impl From<Number> for JValue {
    #[inline]
    fn from(n: Number) -> Self {
        JValue::Number(n)
    }
}

impl From<&str> for JValue {
    #[inline]
    fn from(s: &str) -> Self {
        JValue::String(s.into())
    }
}

impl From<String> for JValue {
    #[inline]
    fn from(s: String) -> Self {
        JValue::String(s.into())
    }
}

impl From<Rc<str>> for JValue {
    #[inline]
    fn from(s: Rc<str>) -> Self {
        JValue::String(s)
    }
}

impl From<Vec<JValue>> for JValue {
    #[inline]
    fn from(v: Vec<JValue>) -> Self {
        JValue::Array(Rc::new(v))
    }
}

impl From<IndexMap<String, JValue>> for JValue {
    #[inline]
    fn from(m: IndexMap<String, JValue>) -> Self {
        JValue::Object(Rc::new(m))
    }
}

// ── Equality / Debug ─────────────────────────────────────────────────────────

impl PartialEq for JValue {
    fn eq(&self, other: &Self) -> bool {
        self.deep_eq(other)
    }
}

impl fmt::Debug for JValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JValue::ExpressionRef(expr) => f.debug_tuple("ExpressionRef").field(expr.node()).finish(),
            JValue::Record(record) => write!(f, "Record({})", record.type_name()),
            other => write!(f, "{}", other),
        }
    }
}

// ── Display ──────────────────────────────────────────────────────────────────

impl fmt::Display for JValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JValue::Null => write!(f, "null"),
            JValue::Bool(b) => write!(f, "{}", b),
            JValue::Number(n) => write!(f, "{}", n),
            JValue::String(s) => write!(f, "\"{}\"", escape_json_string(s)),
            JValue::Array(arr) => {
                write!(f, "[")?;
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            JValue::Object(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "\"{}\":{}", escape_json_string(k), v)?;
                }
                write!(f, "}}")
            }
            JValue::ExpressionRef(_) => write!(f, "\"<expref>\""),
            JValue::Record(record) => write!(f, "\"<record:{}>\"", record.type_name()),
        }
    }
}

fn escape_json_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c < '\x20' => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}

fn format_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if !n.is_finite() {
        // NaN and +/-Infinity have no JSON form
        write!(f, "null")
    } else if n.fract() == 0.0 && n.abs() < MAX_EXACT_INTEGER as f64 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{}", n)
    }
}

// ── Serialization ────────────────────────────────────────────────────────────

/// 2^63 and 2^64: integral floats strictly below convert without saturating.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
const U64_BOUND: f64 = 18_446_744_073_709_551_616.0;

fn serialize_f64<S: Serializer>(n: f64, serializer: S) -> Result<S::Ok, S::Error> {
    if n.is_nan() || n.is_infinite() {
        serializer.serialize_none()
    } else if n.fract() == 0.0 && n.abs() < I64_BOUND {
        serializer.serialize_i64(n as i64)
    } else if n.fract() == 0.0 && n > 0.0 && n < U64_BOUND {
        serializer.serialize_u64(n as u64)
    } else {
        serializer.serialize_f64(n)
    }
}

impl Serialize for Number {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Number::Float(n) => serialize_f64(*n, serializer),
            Number::Decimal(token) => {
                let t = token.trim();
                if let Ok(i) = t.parse::<i64>() {
                    serializer.serialize_i64(i)
                } else if let Ok(u) = t.parse::<u64>() {
                    serializer.serialize_u64(u)
                } else {
                    match t.parse::<f64>() {
                        Ok(f) => serialize_f64(f, serializer),
                        Err(_) => Err(serde::ser::Error::custom(format!(
                            "invalid decimal number: {}",
                            t
                        ))),
                    }
                }
            }
        }
    }
}

impl Serialize for JValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            JValue::Null => serializer.serialize_none(),
            JValue::Bool(b) => serializer.serialize_bool(*b),
            JValue::Number(n) => n.serialize(serializer),
            JValue::String(s) => serializer.serialize_str(s),
            JValue::Array(arr) => {
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for v in arr.iter() {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
            JValue::Object(map) => {
                let mut m = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    m.serialize_entry(k, v)?;
                }
                m.end()
            }
            JValue::ExpressionRef(_) => serializer.serialize_none(),
            JValue::Record(record) => match record.elements() {
                Some(elements) => {
                    let mut seq = serializer.serialize_seq(Some(elements.len()))?;
                    for v in elements.iter() {
                        seq.serialize_element(v)?;
                    }
                    seq.end()
                }
                None => {
                    let fields = record.fields();
                    let mut m = serializer.serialize_map(Some(fields.len()))?;
                    for field in fields.iter() {
                        m.serialize_entry(field.serialized_name(), &field.value)?;
                    }
                    m.end()
                }
            },
        }
    }
}

// ── Deserialization (single-pass JSON→JValue) ────────────────────────────────

impl<'de> serde::Deserialize<'de> for JValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(JValueVisitor)
    }
}

struct JValueVisitor;

impl<'de> Visitor<'de> for JValueVisitor {
    type Value = JValue;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "any valid JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<JValue, E> {
        Ok(JValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<JValue, E> {
        Ok(JValue::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<JValue, E> {
        Ok(JValue::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<JValue, E> {
        Ok(JValue::from_f64(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<JValue, E> {
        Ok(JValue::string(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<JValue, E> {
        Ok(JValue::String(v.into()))
    }

    fn visit_none<E: de::Error>(self) -> Result<JValue, E> {
        Ok(JValue::Null)
    }

    fn visit_unit<E: de::Error>(self) -> Result<JValue, E> {
        Ok(JValue::Null)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<JValue, A::Error> {
        let mut vec = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(elem) = seq.next_element()? {
            vec.push(elem);
        }
        Ok(JValue::array(vec))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<JValue, A::Error> {
        let mut m = IndexMap::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((k, v)) = map.next_entry()? {
            m.insert(k, v);
        }
        Ok(JValue::object(m))
    }
}

// ── JSON string I/O ──────────────────────────────────────────────────────────

impl JValue {
    /// Canonical compact JSON text.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_string_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json_str(s: &str) -> Result<JValue, serde_json::Error> {
        serde_json::from_str(s)
    }
}

// ── Conversion from/to serde_json::Value ─────────────────────────────────────

impl From<serde_json::Value> for JValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => JValue::Null,
            serde_json::Value::Bool(b) => JValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    JValue::from(i)
                } else if let Some(u) = n.as_u64() {
                    JValue::from(u)
                } else {
                    match n.as_f64() {
                        Some(f) => JValue::from_f64(f),
                        None => JValue::decimal(n.to_string()),
                    }
                }
            }
            serde_json::Value::String(s) => JValue::String(s.into()),
            serde_json::Value::Array(arr) => {
                JValue::Array(Rc::new(arr.into_iter().map(JValue::from).collect()))
            }
            serde_json::Value::Object(map) => {
                let m: IndexMap<String, JValue> =
                    map.into_iter().map(|(k, v)| (k, JValue::from(v))).collect();
                JValue::Object(Rc::new(m))
            }
        }
    }
}

impl From<&serde_json::Value> for JValue {
    fn from(v: &serde_json::Value) -> Self {
        JValue::from(v.clone())
    }
}

impl From<&JValue> for serde_json::Value {
    fn from(v: &JValue) -> Self {
        serde_json::to_value(v).unwrap_or(serde_json::Value::Null)
    }
}

// ── jvalue! macro ────────────────────────────────────────────────────────────

/// Macro for constructing JValue literals, similar to serde_json::json!
///
/// Usage:
///   jvalue!(null)           → JValue::Null
///   jvalue!(true)           → JValue::Bool(true)
///   jvalue!(42.0)           → JValue::Number(Float(42.0))
///   jvalue!("hello")        → JValue::String(Rc::from("hello"))
///   jvalue!([1, 2, 3])      → JValue::Array(Rc::new(vec![...]))
///   jvalue!({"k": v, ...})  → JValue::Object(Rc::new(IndexMap from pairs))
///   jvalue!(expr)           → JValue::from(expr)
#[macro_export]
macro_rules! jvalue {
    (null) => {
        $crate::value::JValue::Null
    };

    (true) => {
        $crate::value::JValue::Bool(true)
    };

    (false) => {
        $crate::value::JValue::Bool(false)
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::value::JValue::Array(std::rc::Rc::new(vec![ $( $crate::jvalue!($elem) ),* ]))
    };

    ({ $($key:tt : $val:tt),* $(,)? }) => {
        {
            #[allow(unused_mut)]
            let mut map = indexmap::IndexMap::new();
            $(
                map.insert(($key).to_string(), $crate::jvalue!($val));
            )*
            $crate::value::JValue::Object(std::rc::Rc::new(map))
        }
    };

    ($other:expr) => {
        $crate::value::JValue::from($other)
    };
}

// ── Tests ────────────────────────────────────────────────────────────────────

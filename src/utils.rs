// Sequence helpers shared by the evaluator and the function library

use crate::evaluator::EvaluatorError;
use crate::value::JValue;

/// Bounds of a `[start:stop:step]` slice; `None` means unspecified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SliceBounds {
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub step: Option<i64>,
}

/// Slice `items` with bidirectional bounds.
///
/// Negative bounds count from the end, a negative step walks backwards and
/// unspecified bounds default to the natural extent in the walking direction.
/// A zero step is rejected.
pub fn slice_sequence(items: &[JValue], bounds: SliceBounds) -> Result<Vec<JValue>, EvaluatorError> {
    let step = bounds.step.unwrap_or(1);
    if step == 0 {
        return Err(EvaluatorError::InvalidSlice("slice step cannot be 0".to_string()));
    }
    let len = items.len() as i64;
    let start = match bounds.start {
        Some(n) => cap_slice(len, n, step),
        None if step < 0 => len - 1,
        None => 0,
    };
    let stop = match bounds.stop {
        Some(n) => cap_slice(len, n, step),
        None if step < 0 => -1,
        None => len,
    };

    let mut result = Vec::new();
    let mut i = start;
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        result.push(items[i as usize].clone());
        match i.checked_add(step) {
            Some(next) => i = next,
            None => break,
        }
    }
    Ok(result)
}

fn cap_slice(len: i64, actual: i64, step: i64) -> i64 {
    if actual < 0 {
        let shifted = actual + len;
        if shifted >= 0 {
            shifted
        } else if step < 0 {
            -1
        } else {
            0
        }
    } else if actual >= len {
        if step < 0 {
            len - 1
        } else {
            len
        }
    } else {
        actual
    }
}

/// Splice one level of nested sequences (arrays or host sequences); other
/// elements pass through.
pub fn flatten_once(items: &[JValue]) -> Vec<JValue> {
    let mut result = Vec::with_capacity(items.len());
    for item in items {
        match item.to_sequence() {
            Some(inner) => result.extend(inner.iter().cloned()),
            None => result.push(item.clone()),
        }
    }
    result
}

/// Wrap a non-array value into a single-element array.
pub fn to_array(value: &JValue) -> JValue {
    match value {
        JValue::Array(_) => value.clone(),
        other => JValue::array(vec![other.clone()]),
    }
}

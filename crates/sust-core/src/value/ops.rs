//! Value operations shared by several opcodes

use std::cmp::Ordering;
use std::ops::RangeInclusive;

use crate::error::{ErrorKind, Result};

use super::value::Value;

/// Numeric ordering across int, float and char
pub fn compare(a: &Value, b: &Value) -> Result<Ordering> {
    fn number(value: &Value) -> Result<f64> {
        match value {
            Value::Integer(i) => Ok(*i as f64),
            Value::Float(f) => Ok(*f),
            Value::Char(c) => Ok(f64::from(*c)),
            _ => Err(ErrorKind::mismatch("int, float or char", value.value_type())),
        }
    }

    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => Ok(x.cmp(y)),
        (Value::Char(x), Value::Char(y)) => Ok(x.cmp(y)),
        _ => {
            let (x, y) = (number(a)?, number(b)?);
            // NaN compares as neither more nor less
            Ok(x.partial_cmp(&y).unwrap_or(Ordering::Equal))
        }
    }
}

/// Checked position into a sequence of `len`
pub fn position(index: i64, len: usize) -> Result<usize> {
    usize::try_from(index)
        .ok()
        .filter(|i| *i < len)
        .ok_or(ErrorKind::IndexOutOfRange { index, len })
}

/// Inclusive `[start, end]` slice bounds into a sequence of `len`
pub fn inclusive_range(start: i64, end: i64, len: usize) -> Result<RangeInclusive<usize>> {
    let invalid = ErrorKind::InvalidRange { start, end, len };
    if start > end {
        return Err(invalid);
    }
    let lo = position(start, len).map_err(|_| invalid.clone())?;
    let hi = position(end, len).map_err(|_| invalid)?;
    Ok(lo..=hi)
}

pub fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}

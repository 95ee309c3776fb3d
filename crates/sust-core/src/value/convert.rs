//! Conversion Table
//!
//! One function per `TO_*` opcode. A source/target pairing missing from a
//! table fails with a conversion error rather than guessing.

use crate::error::{ErrorKind, Result};

use super::types::ValueType;
use super::value::Value;

fn no_path(source: &Value, to: ValueType) -> ErrorKind {
    ErrorKind::conversion(source.value_type(), to)
}

fn parse_text<T: std::str::FromStr>(bytes: &[u8], to: ValueType) -> Result<T> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|text| text.trim().parse().ok())
        .ok_or_else(|| {
            ErrorKind::conversion(format!("`{}`", String::from_utf8_lossy(bytes)), to)
        })
}

pub fn to_string(source: &Value) -> Value {
    Value::String(source.render())
}

pub fn to_chars(source: &Value) -> Result<Value> {
    match source {
        Value::String(s) => Ok(Value::char_list(s)),
        _ => Err(no_path(source, ValueType::list(ValueType::Char))),
    }
}

pub fn to_integer(source: &Value) -> Result<Value> {
    let n = match source {
        Value::String(s) => parse_text(s, ValueType::Integer)?,
        Value::Char(c) => i64::from(*c),
        Value::Integer(i) => *i,
        Value::Float(f) if f.is_finite() => *f as i64,
        Value::Bool(b) => i64::from(*b),
        _ => return Err(no_path(source, ValueType::Integer)),
    };
    Ok(Value::Integer(n))
}

pub fn to_float(source: &Value) -> Result<Value> {
    let f = match source {
        Value::String(s) => parse_text(s, ValueType::Float)?,
        Value::Integer(i) => *i as f64,
        Value::Float(f) => *f,
        Value::Char(c) => f64::from(*c),
        _ => return Err(no_path(source, ValueType::Float)),
    };
    Ok(Value::Float(f))
}

pub fn to_char(source: &Value) -> Result<Value> {
    let c = match source {
        Value::String(s) => *s.first().ok_or_else(|| no_path(source, ValueType::Char))?,
        Value::Char(c) => *c,
        Value::Integer(i) => u8::try_from(*i).map_err(|_| {
            ErrorKind::conversion(format!("int {}", i), ValueType::Char)
        })?,
        _ => return Err(no_path(source, ValueType::Char)),
    };
    Ok(Value::Char(c))
}

pub fn to_bool(source: &Value) -> Result<Value> {
    let b = match source {
        Value::String(s) => match s.as_slice() {
            b"true" | b"1" => true,
            b"false" | b"0" => false,
            _ => return Err(ErrorKind::conversion(
                format!("`{}`", String::from_utf8_lossy(s)),
                ValueType::Bool,
            )),
        },
        Value::Bool(b) => *b,
        Value::Integer(i) => *i != 0,
        Value::Float(f) => *f != 0.0,
        Value::Char(c) => *c != 0,
        Value::List(_, items) => !items.is_empty(),
        Value::Map(_, _, entries) => !entries.is_empty(),
        Value::Optional(_, inner) => inner.is_some(),
        Value::InStream(_) | Value::OutStream(_) => true,
    };
    Ok(Value::Bool(b))
}

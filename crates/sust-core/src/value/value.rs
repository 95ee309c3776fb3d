//! Runtime Value Representation
//!
//! The closed set of values a Sust binding can hold. Every value knows its
//! declared type; containers carry their element types so that empty
//! containers stay typed.

use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

use crate::error::{ErrorKind, Result};
use crate::stream::{InStream, OutStream};

use super::types::ValueType;

/// Runtime value
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Float(f64),
    /// Single byte, 0..=255
    Char(u8),
    /// Ordered char sequence
    String(Vec<u8>),
    List(ValueType, Vec<Value>),
    /// Insertion-ordered entries with declared key and value types
    Map(ValueType, ValueType, IndexMap<Value, Value>),
    Optional(ValueType, Option<Box<Value>>),
    InStream(InStream),
    OutStream(OutStream),
}

impl Value {
    pub fn string(text: impl Into<String>) -> Self {
        Value::String(text.into().into_bytes())
    }

    pub fn list(item: ValueType, items: Vec<Value>) -> Self {
        Value::List(item, items)
    }

    pub fn char_list(bytes: &[u8]) -> Self {
        Value::List(ValueType::Char, bytes.iter().map(|b| Value::Char(*b)).collect())
    }

    pub fn none(inner: ValueType) -> Self {
        Value::Optional(inner, None)
    }

    pub fn some(value: Value) -> Self {
        Value::Optional(value.value_type(), Some(Box::new(value)))
    }

    /// Declared type of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Bool(_) => ValueType::Bool,
            Value::Integer(_) => ValueType::Integer,
            Value::Float(_) => ValueType::Float,
            Value::Char(_) => ValueType::Char,
            Value::String(_) => ValueType::String,
            Value::List(item, _) => ValueType::list(item.clone()),
            Value::Map(key, value, _) => ValueType::map(key.clone(), value.clone()),
            Value::Optional(inner, _) => ValueType::optional(inner.clone()),
            Value::InStream(_) => ValueType::InStream,
            Value::OutStream(_) => ValueType::OutStream,
        }
    }

    /// Initial value for a fresh binding. Streams and unit have none.
    pub fn default_for(ty: &ValueType) -> Option<Value> {
        Some(match ty {
            ValueType::Bool => Value::Bool(false),
            ValueType::Integer => Value::Integer(0),
            ValueType::Float => Value::Float(0.0),
            ValueType::Char => Value::Char(0),
            ValueType::String => Value::String(Vec::new()),
            ValueType::List(item) => Value::List((**item).clone(), Vec::new()),
            ValueType::Map(key, value) => {
                Value::Map((**key).clone(), (**value).clone(), IndexMap::new())
            }
            ValueType::Optional(inner) => Value::Optional((**inner).clone(), None),
            ValueType::InStream | ValueType::OutStream | ValueType::Null => return None,
        })
    }

    /// Parse a literal token of type `ty`
    pub fn parse_literal(ty: &ValueType, text: &str) -> Result<Value> {
        let fail = || ErrorKind::conversion(format!("literal `{}`", text), ty);

        match ty {
            ValueType::Bool => match text {
                "true" | "1" => Ok(Value::Bool(true)),
                "false" | "0" => Ok(Value::Bool(false)),
                _ => Err(fail()),
            },
            ValueType::Integer => text.parse().map(Value::Integer).map_err(|_| fail()),
            ValueType::Float => text.parse().map(Value::Float).map_err(|_| fail()),
            ValueType::Char => text.parse().map(Value::Char).map_err(|_| fail()),
            ValueType::String => Ok(Value::string(text)),
            ValueType::Optional(inner) => {
                if text == "none" {
                    Ok(Value::none((**inner).clone()))
                } else if let Some(body) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
                    let value = Value::parse_literal(inner, body)?;
                    Ok(Value::Optional((**inner).clone(), Some(Box::new(value))))
                } else {
                    Err(fail())
                }
            }
            _ => Err(fail()),
        }
    }

    /// Canonical byte representation, as written by `WRITE`
    pub fn render(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut Vec<u8>) {
        match self {
            Value::Bool(b) => out.extend_from_slice(if *b { b"true" } else { b"false" }),
            Value::Integer(i) => out.extend_from_slice(i.to_string().as_bytes()),
            Value::Float(f) => out.extend_from_slice(f.to_string().as_bytes()),
            Value::Char(c) => out.push(*c),
            Value::String(s) => out.extend_from_slice(s),
            Value::List(ValueType::Char, items) => {
                out.extend(items.iter().filter_map(|item| item.as_char().ok()));
            }
            Value::List(_, items) => {
                out.push(b'[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.extend_from_slice(b", ");
                    }
                    item.render_into(out);
                }
                out.push(b']');
            }
            Value::Map(_, _, entries) => {
                out.push(b'{');
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.extend_from_slice(b", ");
                    }
                    key.render_into(out);
                    out.extend_from_slice(b": ");
                    value.render_into(out);
                }
                out.push(b'}');
            }
            Value::Optional(_, Some(inner)) => {
                out.push(b'(');
                inner.render_into(out);
                out.push(b')');
            }
            Value::Optional(_, None) => out.extend_from_slice(b"none"),
            Value::InStream(_) => out.extend_from_slice(b"IN_STREAM"),
            Value::OutStream(_) => out.extend_from_slice(b"OUT_STREAM"),
        }
    }

    fn mismatch(&self, expected: &str) -> ErrorKind {
        ErrorKind::mismatch(expected, self.value_type())
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            _ => Err(self.mismatch("bool")),
        }
    }

    pub fn as_int(&self) -> Result<i64> {
        match self {
            Value::Integer(i) => Ok(*i),
            _ => Err(self.mismatch("int")),
        }
    }

    pub fn as_float(&self) -> Result<f64> {
        match self {
            Value::Float(f) => Ok(*f),
            _ => Err(self.mismatch("float")),
        }
    }

    pub fn as_char(&self) -> Result<u8> {
        match self {
            Value::Char(c) => Ok(*c),
            _ => Err(self.mismatch("char")),
        }
    }

    pub fn as_bytes(&self) -> Result<&[u8]> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(self.mismatch("string")),
        }
    }

    pub fn as_list(&self) -> Result<&[Value]> {
        match self {
            Value::List(_, items) => Ok(items),
            _ => Err(self.mismatch("list")),
        }
    }

    pub fn as_map(&self) -> Result<&IndexMap<Value, Value>> {
        match self {
            Value::Map(_, _, entries) => Ok(entries),
            _ => Err(self.mismatch("map")),
        }
    }

    pub fn as_optional(&self) -> Result<Option<&Value>> {
        match self {
            Value::Optional(_, inner) => Ok(inner.as_deref()),
            _ => Err(self.mismatch("optional")),
        }
    }

    pub fn as_in_stream(&self) -> Result<&InStream> {
        match self {
            Value::InStream(s) => Ok(s),
            _ => Err(self.mismatch("in_stream")),
        }
    }

    pub fn as_out_stream(&self) -> Result<&OutStream> {
        match self {
            Value::OutStream(s) => Ok(s),
            _ => Err(self.mismatch("out_stream")),
        }
    }

    /// Bytes of a string, char or `list[char]`
    pub fn text_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Value::String(s) => Ok(s.clone()),
            Value::Char(c) => Ok(vec![*c]),
            Value::List(ValueType::Char, items) => items.iter().map(Value::as_char).collect(),
            _ => Err(self.mismatch("string, char or list[char]")),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.render()))
    }
}

// Floats compare by bit pattern so values can key maps.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(ta, a), Value::List(tb, b)) => ta == tb && a == b,
            (Value::Map(ka, va, a), Value::Map(kb, vb, b)) => ka == kb && va == vb && a == b,
            (Value::Optional(ta, a), Value::Optional(tb, b)) => ta == tb && a == b,
            (Value::InStream(a), Value::InStream(b)) => a == b,
            (Value::OutStream(a), Value::OutStream(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Bool(b) => b.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Char(c) => c.hash(state),
            Value::String(s) => s.hash(state),
            Value::List(_, items) => items.hash(state),
            // map equality ignores order, so only the size is hashed
            Value::Map(_, _, entries) => entries.len().hash(state),
            Value::Optional(_, inner) => inner.hash(state),
            Value::InStream(s) => s.hash(state),
            Value::OutStream(s) => s.hash(state),
        }
    }
}

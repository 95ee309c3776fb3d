//! Value Types
//!
//! Declared types and their textual names (`int`, `list[char]`,
//! `map[string,optional[int]]`, ...).

use std::fmt;
use std::str::FromStr;

use crate::error::ErrorKind;

/// Declared type of a binding, parameter or function result
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Unit; only valid as a function result type
    Null,
    Bool,
    Integer,
    Float,
    Char,
    String,
    List(Box<ValueType>),
    Map(Box<ValueType>, Box<ValueType>),
    Optional(Box<ValueType>),
    InStream,
    OutStream,
}

impl ValueType {
    pub fn list(item: ValueType) -> Self {
        ValueType::List(Box::new(item))
    }

    pub fn map(key: ValueType, value: ValueType) -> Self {
        ValueType::Map(Box::new(key), Box::new(value))
    }

    pub fn optional(inner: ValueType) -> Self {
        ValueType::Optional(Box::new(inner))
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, ValueType::InStream | ValueType::OutStream)
    }

    /// Whether this is `list[char]`
    pub fn is_char_list(&self) -> bool {
        matches!(self, ValueType::List(item) if **item == ValueType::Char)
    }
}

impl FromStr for ValueType {
    type Err = ErrorKind;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let unknown = || ErrorKind::UnknownType(name.to_string());

        if let Some(open) = name.find('[') {
            let inner = name[open + 1..].strip_suffix(']').ok_or_else(unknown)?;
            return match &name[..open] {
                "list" => Ok(ValueType::list(inner.parse()?)),
                "optional" => Ok(ValueType::optional(inner.parse()?)),
                "map" => {
                    let (key, value) = split_top_level(inner).ok_or_else(unknown)?;
                    Ok(ValueType::map(key.parse()?, value.parse()?))
                }
                _ => Err(unknown()),
            };
        }

        match name {
            "bool" | "b" => Ok(ValueType::Bool),
            "string" | "str" | "s" => Ok(ValueType::String),
            "integer" | "int" | "i" => Ok(ValueType::Integer),
            "float" | "f" => Ok(ValueType::Float),
            "char" | "c" => Ok(ValueType::Char),
            "in_stream" | "in" => Ok(ValueType::InStream),
            "out_stream" | "out" => Ok(ValueType::OutStream),
            "null" => Ok(ValueType::Null),
            _ => Err(unknown()),
        }
    }
}

/// Split `K,V` on the first comma outside brackets
fn split_top_level(text: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (i, ch) in text.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => return Some((&text[..i], &text[i + 1..])),
            _ => {}
        }
    }
    None
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Null => f.write_str("null"),
            ValueType::Bool => f.write_str("bool"),
            ValueType::Integer => f.write_str("int"),
            ValueType::Float => f.write_str("float"),
            ValueType::Char => f.write_str("char"),
            ValueType::String => f.write_str("string"),
            ValueType::List(item) => write!(f, "list[{}]", item),
            ValueType::Map(key, value) => write!(f, "map[{},{}]", key, value),
            ValueType::Optional(inner) => write!(f, "optional[{}]", inner),
            ValueType::InStream => f.write_str("in_stream"),
            ValueType::OutStream => f.write_str("out_stream"),
        }
    }
}

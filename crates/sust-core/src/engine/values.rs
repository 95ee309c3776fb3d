//! Value opcodes
//!
//! Conversions, accessors, arithmetic, comparisons, predicates and
//! optionals. Every operand token names a variable; results are written
//! with result-write semantics.

use std::cmp::Ordering;

use rand::Rng;

use crate::command::{Command, OpCode};
use crate::error::{ErrorKind, Result};
use crate::store::{check_type, Scope};
use crate::value::convert;
use crate::value::ops::{compare, contains_bytes, inclusive_range, position};
use crate::value::Value;

fn operand(command: &Command, scope: &Scope<'_>, index: usize) -> Result<Value> {
    scope.get(command.arg(index)?)
}

fn count(n: usize) -> Value {
    Value::Integer(i64::try_from(n).unwrap_or(i64::MAX))
}

/// `TO_* source result`
pub(super) fn convert(command: &Command, scope: &mut Scope<'_>) -> Result<()> {
    let source = operand(command, scope, 0)?;
    let value = match command.opcode {
        OpCode::ToString => convert::to_string(&source),
        OpCode::ToChars => convert::to_chars(&source)?,
        OpCode::ToChar => convert::to_char(&source)?,
        OpCode::ToInteger => convert::to_integer(&source)?,
        OpCode::ToFloat => convert::to_float(&source)?,
        _ => convert::to_bool(&source)?,
    };
    scope.assign(command.arg(1)?, value)
}

/// `GET_SYMBOL string index result`
pub(super) fn get_symbol(command: &Command, scope: &mut Scope<'_>) -> Result<()> {
    let text = operand(command, scope, 0)?;
    let bytes = text.as_bytes()?;
    let index = operand(command, scope, 1)?.as_int()?;
    let symbol = bytes[position(index, bytes.len())?];
    scope.assign(command.arg(2)?, Value::Char(symbol))
}

/// `GET_ITEM list index result`
pub(super) fn get_item(command: &Command, scope: &mut Scope<'_>) -> Result<()> {
    let list = operand(command, scope, 0)?;
    let items = list.as_list()?;
    let index = operand(command, scope, 1)?.as_int()?;
    let item = items[position(index, items.len())?].clone();
    scope.assign(command.arg(2)?, item)
}

/// `GET_VALUE map key result`
pub(super) fn get_value(command: &Command, scope: &mut Scope<'_>) -> Result<()> {
    let map = operand(command, scope, 0)?;
    let key = operand(command, scope, 1)?;
    let Value::Map(key_ty, _, entries) = &map else {
        return Err(ErrorKind::mismatch("map", map.value_type()));
    };
    check_type(key_ty, &key)?;
    let value = entries
        .get(&key)
        .cloned()
        .ok_or_else(|| ErrorKind::KeyNotFound(key.to_string()))?;
    scope.assign(command.arg(2)?, value)
}

/// `SUB_STR var start end`, `SUB_LIST var start end`: keep the inclusive
/// slice in place
pub(super) fn slice(command: &Command, scope: &mut Scope<'_>) -> Result<()> {
    let start = operand(command, scope, 1)?.as_int()?;
    let end = operand(command, scope, 2)?.as_int()?;
    let opcode = command.opcode;

    scope.update(command.arg(0)?, |value| match (opcode, value) {
        (OpCode::SubStr, Value::String(text)) => {
            let range = inclusive_range(start, end, text.len())?;
            *text = text[range].to_vec();
            Ok(())
        }
        (OpCode::SubList, Value::List(_, items)) => {
            let range = inclusive_range(start, end, items.len())?;
            *items = items[range].to_vec();
            Ok(())
        }
        (OpCode::SubStr, other) => Err(ErrorKind::mismatch("string", other.value_type())),
        (_, other) => Err(ErrorKind::mismatch("list", other.value_type())),
    })
}

/// `LIST_SIZE`, `MAP_SIZE`, `STRING_SIZE`
pub(super) fn size(command: &Command, scope: &mut Scope<'_>) -> Result<()> {
    let source = operand(command, scope, 0)?;
    let len = match command.opcode {
        OpCode::ListSize => source.as_list()?.len(),
        OpCode::MapSize => source.as_map()?.len(),
        _ => source.as_bytes()?.len(),
    };
    scope.assign(command.arg(1)?, count(len))
}

pub(super) fn add_int(command: &Command, scope: &mut Scope<'_>) -> Result<()> {
    let other = operand(command, scope, 1)?.as_int()?;
    scope.update(command.arg(0)?, |value| {
        let sum = value
            .as_int()?
            .checked_add(other)
            .ok_or(ErrorKind::IntegerOverflow)?;
        *value = Value::Integer(sum);
        Ok(())
    })
}

pub(super) fn add_float(command: &Command, scope: &mut Scope<'_>) -> Result<()> {
    let other = operand(command, scope, 1)?.as_float()?;
    scope.update(command.arg(0)?, |value| {
        *value = Value::Float(value.as_float()? + other);
        Ok(())
    })
}

/// Append a string, char or `list[char]` to a string
pub(super) fn add_str(command: &Command, scope: &mut Scope<'_>) -> Result<()> {
    let other = operand(command, scope, 1)?.text_bytes()?;
    scope.update(command.arg(0)?, |value| match value {
        Value::String(text) => {
            text.extend_from_slice(&other);
            Ok(())
        }
        other => Err(ErrorKind::mismatch("string", other.value_type())),
    })
}

/// `RANDOM min max result`, both bounds inclusive
pub(super) fn random(command: &Command, scope: &mut Scope<'_>) -> Result<()> {
    let min = operand(command, scope, 0)?.as_int()?;
    let max = operand(command, scope, 1)?.as_int()?;
    if min > max {
        return Err(ErrorKind::InvalidRange {
            start: min,
            end: max,
            len: 0,
        });
    }
    let n = rand::thread_rng().gen_range(min..=max);
    scope.assign(command.arg(2)?, Value::Integer(n))
}

/// `EQUALS`, `MORE`, `LESS`, `AND`, `OR`: `a b result`
pub(super) fn binary(command: &Command, scope: &mut Scope<'_>) -> Result<()> {
    let a = operand(command, scope, 0)?;
    let b = operand(command, scope, 1)?;
    let result = match command.opcode {
        OpCode::Equals => a == b,
        OpCode::More => compare(&a, &b)? == Ordering::Greater,
        OpCode::Less => compare(&a, &b)? == Ordering::Less,
        OpCode::And => a.as_bool()? && b.as_bool()?,
        _ => a.as_bool()? || b.as_bool()?,
    };
    scope.assign(command.arg(2)?, Value::Bool(result))
}

pub(super) fn not(command: &Command, scope: &mut Scope<'_>) -> Result<()> {
    let value = operand(command, scope, 0)?.as_bool()?;
    scope.assign(command.arg(1)?, Value::Bool(!value))
}

/// `HAS_STR string sub result`
pub(super) fn has_str(command: &Command, scope: &mut Scope<'_>) -> Result<()> {
    let haystack = operand(command, scope, 0)?.text_bytes()?;
    let needle = operand(command, scope, 1)?.text_bytes()?;
    scope.assign(
        command.arg(2)?,
        Value::Bool(contains_bytes(&haystack, &needle)),
    )
}

/// `HAS_ITEM list item result`
pub(super) fn has_item(command: &Command, scope: &mut Scope<'_>) -> Result<()> {
    let list = operand(command, scope, 0)?;
    let item = operand(command, scope, 1)?;
    let found = list.as_list()?.contains(&item);
    scope.assign(command.arg(2)?, Value::Bool(found))
}

/// `HAS_ENTRY map key value result`
pub(super) fn has_entry(command: &Command, scope: &mut Scope<'_>) -> Result<()> {
    let map = operand(command, scope, 0)?;
    let key = operand(command, scope, 1)?;
    let value = operand(command, scope, 2)?;
    let found = map.as_map()?.get(&key) == Some(&value);
    scope.assign(command.arg(3)?, Value::Bool(found))
}

/// `HAS_KEY map key result`, `HAS_VALUE map value result`
pub(super) fn has_member(command: &Command, scope: &mut Scope<'_>) -> Result<()> {
    let map = operand(command, scope, 0)?;
    let probe = operand(command, scope, 1)?;
    let entries = map.as_map()?;
    let found = match command.opcode {
        OpCode::HasKey => entries.contains_key(&probe),
        _ => entries.values().any(|v| *v == probe),
    };
    scope.assign(command.arg(2)?, Value::Bool(found))
}

pub(super) fn has_optional(command: &Command, scope: &mut Scope<'_>) -> Result<()> {
    let present = operand(command, scope, 0)?.as_optional()?.is_some();
    scope.assign(command.arg(1)?, Value::Bool(present))
}

/// `UNPACK_OPTIONAL opt result`: copy the value out, leaving `opt` as is
pub(super) fn unpack_optional(command: &Command, scope: &mut Scope<'_>) -> Result<()> {
    let optional = operand(command, scope, 0)?;
    let inner = optional
        .as_optional()?
        .cloned()
        .ok_or(ErrorKind::EmptyOptional)?;
    scope.assign(command.arg(1)?, inner)
}

/// `PACK_OPTIONAL var result`
pub(super) fn pack_optional(command: &Command, scope: &mut Scope<'_>) -> Result<()> {
    let value = operand(command, scope, 0)?;
    scope.assign(command.arg(1)?, Value::some(value))
}

/// `NONE_OPTIONAL var`
pub(super) fn none_optional(command: &Command, scope: &mut Scope<'_>) -> Result<()> {
    scope.update(command.arg(0)?, |value| match value {
        Value::Optional(_, inner) => {
            *inner = None;
            Ok(())
        }
        other => Err(ErrorKind::mismatch("optional", other.value_type())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Globals;
    use crate::value::ValueType;

    fn cmd(opcode: OpCode, args: &[&str]) -> Command {
        Command::new(opcode, 1, args.iter().map(|a| a.to_string()).collect())
    }

    fn with_scope(f: impl FnOnce(&mut Scope<'_>)) {
        let globals = Globals::new();
        let mut scope = Scope::new(&globals, None);
        f(&mut scope);
    }

    #[test]
    fn substring_is_inclusive() {
        with_scope(|scope| {
            scope.assign("s", Value::string("abcdef")).unwrap();
            scope.assign("a", Value::Integer(1)).unwrap();
            scope.assign("b", Value::Integer(3)).unwrap();
            slice(&cmd(OpCode::SubStr, &["s", "a", "b"]), scope).unwrap();
            assert_eq!(scope.get("s"), Ok(Value::string("bcd")));

            assert!(matches!(
                slice(&cmd(OpCode::SubStr, &["s", "b", "a"]), scope),
                Err(ErrorKind::InvalidRange { .. })
            ));
            assert_eq!(scope.get("s"), Ok(Value::string("bcd")));
        });
    }

    #[test]
    fn add_int_detects_overflow() {
        with_scope(|scope| {
            scope.assign("x", Value::Integer(i64::MAX)).unwrap();
            scope.assign("one", Value::Integer(1)).unwrap();
            assert_eq!(
                add_int(&cmd(OpCode::AddInt, &["x", "one"]), scope),
                Err(ErrorKind::IntegerOverflow)
            );
            assert_eq!(scope.get("x"), Ok(Value::Integer(i64::MAX)));
        });
    }

    #[test]
    fn add_str_accepts_text_sources() {
        with_scope(|scope| {
            scope.assign("s", Value::string("a")).unwrap();
            scope.assign("c", Value::Char(b'b')).unwrap();
            scope.assign("l", Value::char_list(b"cd")).unwrap();
            add_str(&cmd(OpCode::AddStr, &["s", "c"]), scope).unwrap();
            add_str(&cmd(OpCode::AddStr, &["s", "l"]), scope).unwrap();
            assert_eq!(scope.get("s"), Ok(Value::string("abcd")));
        });
    }

    #[test]
    fn random_stays_in_bounds() {
        with_scope(|scope| {
            scope.assign("lo", Value::Integer(3)).unwrap();
            scope.assign("hi", Value::Integer(5)).unwrap();
            for _ in 0..50 {
                random(&cmd(OpCode::Random, &["lo", "hi", "r"]), scope).unwrap();
                let r = scope.get("r").unwrap().as_int().unwrap();
                assert!((3..=5).contains(&r));
            }
            assert!(random(&cmd(OpCode::Random, &["hi", "lo", "r"]), scope).is_err());
        });
    }

    #[test]
    fn map_lookups() {
        with_scope(|scope| {
            scope
                .declare(
                    "m",
                    ValueType::map(ValueType::String, ValueType::Integer),
                    Value::default_for(&ValueType::map(ValueType::String, ValueType::Integer)),
                )
                .unwrap();
            scope.set("m.one", Value::Integer(1)).unwrap();
            scope.assign("k", Value::string("one")).unwrap();
            scope.assign("v", Value::Integer(1)).unwrap();

            get_value(&cmd(OpCode::GetValue, &["m", "k", "out"]), scope).unwrap();
            assert_eq!(scope.get("out"), Ok(Value::Integer(1)));

            has_entry(&cmd(OpCode::HasEntry, &["m", "k", "v", "e"]), scope).unwrap();
            assert_eq!(scope.get("e"), Ok(Value::Bool(true)));

            has_member(&cmd(OpCode::HasValue, &["m", "k", "hv"]), scope).unwrap();
            assert_eq!(scope.get("hv"), Ok(Value::Bool(false)));

            assert!(matches!(
                get_value(&cmd(OpCode::GetValue, &["m", "v", "out"]), scope),
                Err(ErrorKind::TypeMismatch { .. })
            ));
        });
    }

    #[test]
    fn optional_lifecycle() {
        with_scope(|scope| {
            scope.assign("v", Value::Integer(7)).unwrap();
            pack_optional(&cmd(OpCode::PackOptional, &["v", "o"]), scope).unwrap();
            unpack_optional(&cmd(OpCode::UnpackOptional, &["o", "w"]), scope).unwrap();
            assert_eq!(scope.get("w"), Ok(Value::Integer(7)));

            none_optional(&cmd(OpCode::NoneOptional, &["o"]), scope).unwrap();
            assert_eq!(
                unpack_optional(&cmd(OpCode::UnpackOptional, &["o", "w"]), scope),
                Err(ErrorKind::EmptyOptional)
            );
        });
    }

    #[test]
    fn comparisons() {
        with_scope(|scope| {
            scope.assign("a", Value::Integer(2)).unwrap();
            scope.assign("b", Value::Float(2.5)).unwrap();
            binary(&cmd(OpCode::Less, &["a", "b", "r"]), scope).unwrap();
            assert_eq!(scope.get("r"), Ok(Value::Bool(true)));
            binary(&cmd(OpCode::Equals, &["a", "a", "r"]), scope).unwrap();
            assert_eq!(scope.get("r"), Ok(Value::Bool(true)));
            assert!(binary(&cmd(OpCode::And, &["a", "b", "r"]), scope).is_err());
        });
    }
}

//! Binding tables
//!
//! A name-to-binding table plus the composite path logic (`list.0`,
//! `map.key`) shared by the global scope and function frames.

use indexmap::IndexMap;

use crate::error::{ErrorKind, Result};
use crate::value::ops::position;
use crate::value::{Value, ValueType};

/// A declared name: its type and, unless it is an unset stream, its value
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub ty: ValueType,
    pub value: Option<Value>,
}

impl Binding {
    pub fn new(ty: ValueType, value: Option<Value>) -> Result<Self> {
        if let Some(value) = &value {
            check_type(&ty, value)?;
        }
        Ok(Binding { ty, value })
    }

    /// Binding typed by its value
    pub fn of(value: Value) -> Self {
        Binding {
            ty: value.value_type(),
            value: Some(value),
        }
    }
}

/// `root.seg.seg` split into parts
#[derive(Debug, Clone, Copy)]
pub(crate) struct Path<'p> {
    pub text: &'p str,
    pub root: &'p str,
    segments: &'p str,
}

impl<'p> Path<'p> {
    pub fn parse(text: &'p str) -> Self {
        match text.split_once('.') {
            Some((root, segments)) => Path {
                text,
                root,
                segments,
            },
            None => Path {
                text,
                root: text,
                segments: "",
            },
        }
    }

    pub fn is_plain(&self) -> bool {
        self.segments.is_empty()
    }

    fn segments(&self) -> Vec<&'p str> {
        if self.is_plain() {
            Vec::new()
        } else {
            self.segments.split('.').collect()
        }
    }
}

pub(crate) fn check_type(expected: &ValueType, value: &Value) -> Result<()> {
    let found = value.value_type();
    if &found == expected {
        Ok(())
    } else {
        Err(ErrorKind::mismatch(expected, found))
    }
}

fn list_index(segment: &str, len: usize) -> Result<usize> {
    let index = segment
        .parse::<i64>()
        .map_err(|_| ErrorKind::conversion(format!("index `{}`", segment), ValueType::Integer))?;
    position(index, len)
}

fn not_composite(value: &Value) -> ErrorKind {
    ErrorKind::mismatch("list or map", value.value_type())
}

fn child<'v>(value: &'v Value, segment: &str) -> Result<&'v Value> {
    match value {
        Value::List(_, items) => Ok(&items[list_index(segment, items.len())?]),
        Value::Map(key_ty, _, entries) => {
            let key = Value::parse_literal(key_ty, segment)?;
            entries
                .get(&key)
                .ok_or_else(|| ErrorKind::KeyNotFound(segment.to_string()))
        }
        other => Err(not_composite(other)),
    }
}

fn child_mut<'v>(value: &'v mut Value, segment: &str) -> Result<&'v mut Value> {
    match value {
        Value::List(_, items) => {
            let index = list_index(segment, items.len())?;
            Ok(&mut items[index])
        }
        Value::Map(key_ty, _, entries) => {
            let key = Value::parse_literal(key_ty, segment)?;
            entries
                .get_mut(&key)
                .ok_or_else(|| ErrorKind::KeyNotFound(segment.to_string()))
        }
        other => Err(not_composite(other)),
    }
}

/// Store `value` under `segment` of a container
fn put_child(container: &mut Value, segment: &str, value: Value) -> Result<()> {
    match container {
        Value::List(item_ty, items) => {
            check_type(item_ty, &value)?;
            let index = list_index(segment, items.len())?;
            items[index] = value;
            Ok(())
        }
        Value::Map(key_ty, value_ty, entries) => {
            check_type(value_ty, &value)?;
            let key = Value::parse_literal(key_ty, segment)?;
            entries.insert(key, value);
            Ok(())
        }
        other => Err(not_composite(other)),
    }
}

fn remove_child(container: &mut Value, segment: &str) -> Result<Value> {
    match container {
        Value::List(_, items) => {
            let index = list_index(segment, items.len())?;
            Ok(items.remove(index))
        }
        Value::Map(key_ty, _, entries) => {
            let key = Value::parse_literal(key_ty, segment)?;
            entries
                .shift_remove(&key)
                .ok_or_else(|| ErrorKind::KeyNotFound(segment.to_string()))
        }
        other => Err(not_composite(other)),
    }
}

/// Insertion-ordered binding table
#[derive(Debug, Default, Clone)]
pub struct Bindings {
    table: IndexMap<String, Binding>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.table.get(name)
    }

    /// Create or replace a binding
    pub fn declare(&mut self, name: &str, binding: Binding) {
        self.table.insert(name.to_string(), binding);
    }

    /// Remove a whole binding; `None` when it was not there
    pub fn unbind(&mut self, name: &str) -> Option<Binding> {
        self.table.shift_remove(name)
    }

    fn root(&self, path: &Path<'_>) -> Result<&Value> {
        let binding = self
            .table
            .get(path.root)
            .ok_or_else(|| ErrorKind::UnknownVariable(path.root.to_string()))?;
        binding
            .value
            .as_ref()
            .ok_or_else(|| ErrorKind::StreamUnavailable(format!("`{}` is not set", path.root)))
    }

    fn root_mut(&mut self, path: &Path<'_>) -> Result<&mut Value> {
        let binding = self
            .table
            .get_mut(path.root)
            .ok_or_else(|| ErrorKind::UnknownVariable(path.root.to_string()))?;
        binding
            .value
            .as_mut()
            .ok_or_else(|| ErrorKind::StreamUnavailable(format!("`{}` is not set", path.root)))
    }

    /// Copy of the value at `path`
    pub(crate) fn read(&self, path: &Path<'_>) -> Result<Value> {
        let mut current = self.root(path)?;
        for segment in path.segments() {
            current = child(current, segment)?;
        }
        Ok(current.clone())
    }

    /// Type a write to `path` must have
    pub(crate) fn declared_type(&self, path: &Path<'_>) -> Result<ValueType> {
        let mut ty = self
            .table
            .get(path.root)
            .map(|b| b.ty.clone())
            .ok_or_else(|| ErrorKind::UnknownVariable(path.root.to_string()))?;
        for _ in path.segments() {
            ty = match ty {
                ValueType::List(item) => *item,
                ValueType::Map(_, value) => *value,
                other => return Err(ErrorKind::mismatch("list or map", other)),
            };
        }
        Ok(ty)
    }

    /// Overwrite the value at an existing `path`
    pub(crate) fn write(&mut self, path: &Path<'_>, value: Value) -> Result<()> {
        let segments = path.segments();
        let Some((last, parents)) = segments.split_last() else {
            let binding = self
                .table
                .get_mut(path.root)
                .ok_or_else(|| ErrorKind::UnknownVariable(path.root.to_string()))?;
            check_type(&binding.ty, &value)?;
            binding.value = Some(value);
            return Ok(());
        };

        let mut current = self.root_mut(path)?;
        for segment in parents {
            current = child_mut(current, segment)?;
        }
        put_child(current, last, value)
    }

    /// Remove the binding or container element at `path`
    pub(crate) fn remove(&mut self, path: &Path<'_>) -> Result<Option<Value>> {
        let segments = path.segments();
        let Some((last, parents)) = segments.split_last() else {
            return self
                .unbind(path.root)
                .map(|binding| binding.value)
                .ok_or_else(|| ErrorKind::UnknownVariable(path.root.to_string()));
        };

        let mut current = self.root_mut(path)?;
        for segment in parents {
            current = child_mut(current, segment)?;
        }
        remove_child(current, last).map(Some)
    }

    /// Read-modify-write of the value at `path`. The change is applied to a
    /// copy and only stored when `f` succeeds and the type is unchanged.
    pub(crate) fn modify<F>(&mut self, path: &Path<'_>, f: F) -> Result<()>
    where
        F: FnOnce(&mut Value) -> Result<()>,
    {
        let mut current = self.root_mut(path)?;
        for segment in path.segments() {
            current = child_mut(current, segment)?;
        }
        let mut updated = current.clone();
        f(&mut updated)?;
        check_type(&current.value_type(), &updated)?;
        *current = updated;
        Ok(())
    }
}

//! Variable Store
//!
//! One global scope shared by every execution context, plus at most one
//! isolated frame per running function call. Lookups check the frame first,
//! then globals.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{ErrorKind, Result};
use crate::value::{Value, ValueType};

use super::bindings::{Binding, Bindings, Path};

/// Global scope, shared across contexts
#[derive(Debug, Default)]
pub struct Globals {
    bindings: Mutex<Bindings>,
}

impl Globals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclusive access to the global table
    pub fn lock(&self) -> MutexGuard<'_, Bindings> {
        // a context that panicked cannot leave a binding half-written
        self.bindings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn declare(&self, name: &str, binding: Binding) {
        self.lock().declare(name, binding);
    }

    pub fn get(&self, path: &str) -> Result<Value> {
        self.lock().read(&Path::parse(path))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains(name)
    }
}

/// Locals of one function invocation
#[derive(Debug)]
pub struct Frame {
    function: String,
    bindings: Bindings,
}

impl Frame {
    pub fn new(function: impl Into<String>) -> Self {
        Frame {
            function: function.into(),
            bindings: Bindings::new(),
        }
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut Bindings {
        &mut self.bindings
    }
}

/// View of the store from one running command
#[derive(Debug)]
pub struct Scope<'a> {
    globals: &'a Globals,
    frame: Option<&'a mut Frame>,
}

impl<'a> Scope<'a> {
    pub fn new(globals: &'a Globals, frame: Option<&'a mut Frame>) -> Self {
        Scope { globals, frame }
    }

    /// Frame holding `root`, if the name is local
    fn local(&self, root: &str) -> Option<&Bindings> {
        self.frame
            .as_deref()
            .map(Frame::bindings)
            .filter(|b| b.contains(root))
    }

    fn local_mut(&mut self, root: &str) -> Option<&mut Bindings> {
        self.frame
            .as_deref_mut()
            .map(Frame::bindings_mut)
            .filter(|b| b.contains(root))
    }

    /// Copy of the value at `path`
    pub fn get(&self, path: &str) -> Result<Value> {
        let path = Path::parse(path);
        match self.local(path.root) {
            Some(bindings) => bindings.read(&path),
            None => self.globals.lock().read(&path),
        }
        .map_err(|err| unknown_path(err, &path))
    }

    /// Whether `path` names something bound (an unset stream counts)
    pub fn contains(&self, path: &str) -> bool {
        match self.get(path) {
            Ok(_) | Err(ErrorKind::StreamUnavailable(_)) => true,
            Err(_) => false,
        }
    }

    /// Declared type of the binding or container slot at `path`
    pub fn declared_type(&self, path: &str) -> Result<ValueType> {
        let path = Path::parse(path);
        match self.local(path.root) {
            Some(bindings) => bindings.declared_type(&path),
            None => self.globals.lock().declared_type(&path),
        }
    }

    /// Bind `name` in the active scope, replacing a binding there
    pub fn declare(&mut self, name: &str, ty: ValueType, value: Option<Value>) -> Result<()> {
        let binding = Binding::new(ty, value)?;
        match self.frame.as_deref_mut() {
            Some(frame) => frame.bindings_mut().declare(name, binding),
            None => self.globals.declare(name, binding),
        }
        Ok(())
    }

    /// Overwrite an existing binding or container slot
    pub fn set(&mut self, path: &str, value: Value) -> Result<()> {
        let path = Path::parse(path);
        if let Some(bindings) = self.local_mut(path.root) {
            return bindings.write(&path, value);
        }
        self.globals.lock().write(&path, value)
    }

    /// Result write: replace an existing binding after a type check, or
    /// declare a new one in the active scope typed by `value`
    pub fn assign(&mut self, path: &str, value: Value) -> Result<()> {
        let path = Path::parse(path);
        if let Some(bindings) = self.local_mut(path.root) {
            return bindings.write(&path, value);
        }

        let mut globals = self.globals.lock();
        if globals.contains(path.root) {
            return globals.write(&path, value);
        }
        if !path.is_plain() {
            return Err(ErrorKind::UnknownVariable(path.root.to_string()));
        }
        match self.frame.as_deref_mut() {
            Some(frame) => frame.bindings_mut().declare(path.root, Binding::of(value)),
            None => globals.declare(path.root, Binding::of(value)),
        }
        Ok(())
    }

    /// In-place read-modify-write under one lock acquisition
    pub fn update<F>(&mut self, path: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut Value) -> Result<()>,
    {
        let path = Path::parse(path);
        if let Some(bindings) = self.local_mut(path.root) {
            return bindings.modify(&path, f);
        }
        self.globals.lock().modify(&path, f)
    }

    /// Remove a binding, or an element of a container
    pub fn remove(&mut self, path: &str) -> Result<()> {
        let path = Path::parse(path);
        if let Some(bindings) = self.local_mut(path.root) {
            return bindings.remove(&path).map(drop);
        }
        self.globals.lock().remove(&path).map(drop)
    }

    /// Drop `name` from the active scope if it is still there
    pub fn release(&mut self, name: &str) {
        match self.frame.as_deref_mut() {
            Some(frame) => {
                frame.bindings_mut().unbind(name);
            }
            None => {
                self.globals.lock().unbind(name);
            }
        }
    }

    /// Transfer the value at `src` to `dst`, leaving `src` unbound.
    /// The value is written before the source is removed, so a failed
    /// write leaves the source intact. A global source stays locked from
    /// the read through the removal.
    pub fn move_var(&mut self, src: &str, dst: &str) -> Result<()> {
        let from = Path::parse(src);
        let to = Path::parse(dst);
        if from.text == to.text {
            self.get(src)?;
            return Ok(());
        }

        let src_local = self.local(from.root).is_some();
        let dst_local = self.local(to.root).is_some()
            || (self.frame.is_some() && !self.globals.contains(to.root));

        if !src_local {
            let mut globals = self.globals.lock();
            let value = globals.read(&from).map_err(|err| unknown_path(err, &from))?;
            {
                let target: &mut Bindings = match (dst_local, self.frame.as_deref_mut()) {
                    (true, Some(frame)) => frame.bindings_mut(),
                    _ => &mut *globals,
                };
                if target.contains(to.root) {
                    target.write(&to, value)?;
                } else if to.is_plain() {
                    target.declare(to.root, Binding::of(value));
                } else {
                    return Err(ErrorKind::UnknownVariable(to.root.to_string()));
                }
            }
            return globals.remove(&from).map(drop);
        }

        let value = self.get(src)?;
        self.assign(dst, value)?;
        self.remove(src)
    }

    /// Copy the value at `src` to `dst`
    pub fn copy_var(&mut self, src: &str, dst: &str) -> Result<()> {
        let value = self.get(src)?;
        self.assign(dst, value)
    }
}

fn unknown_path(err: ErrorKind, path: &Path<'_>) -> ErrorKind {
    match err {
        ErrorKind::UnknownVariable(_) => ErrorKind::UnknownVariable(path.text.to_string()),
        other => other,
    }
}

//! Call Stack
//!
//! Names of the functions currently running in one execution context.
//! Scopes never nest; the stack only bounds how deep calls may chain.

use crate::error::{ErrorKind, Result};

#[derive(Debug)]
pub struct CallStack {
    names: Vec<String>,
    max_depth: usize,
}

impl CallStack {
    /// Create new stack with maximum depth
    pub fn new(max_depth: usize) -> Self {
        CallStack {
            names: Vec::new(),
            max_depth,
        }
    }

    /// Enter a function
    pub fn push(&mut self, name: &str) -> Result<()> {
        if self.names.len() >= self.max_depth {
            return Err(ErrorKind::CallDepthExceeded(self.max_depth));
        }
        self.names.push(name.to_string());
        Ok(())
    }

    /// Leave the innermost function
    pub fn pop(&mut self) -> Option<String> {
        self.names.pop()
    }

    pub fn depth(&self) -> usize {
        self.names.len()
    }
}

//! Function Definitions
//!
//! A named, typed command sequence captured at load time. Definitions are
//! immutable once registered.

use std::sync::Arc;

use crate::command::Command;
use crate::error::{ErrorKind, Result};
use crate::store::check_type;
use crate::value::{Value, ValueType};

/// A declared parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: ValueType,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: ValueType) -> Self {
        Param {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    /// `ValueType::Null` for functions without a result
    pub result: ValueType,
    pub params: Vec<Param>,
    pub body: Arc<[Command]>,
    /// Line of the `FUNC` header
    pub line: usize,
}

impl FunctionDef {
    pub fn new(
        name: impl Into<String>,
        result: ValueType,
        params: Vec<Param>,
        body: Vec<Command>,
        line: usize,
    ) -> Self {
        FunctionDef {
            name: name.into(),
            result,
            params,
            body: body.into(),
            line,
        }
    }

    pub fn returns_value(&self) -> bool {
        self.result != ValueType::Null
    }

    /// Validate call arguments against the parameter list
    pub fn check_args(&self, args: &[Value]) -> Result<()> {
        if args.len() != self.params.len() {
            return Err(ErrorKind::arguments(
                &self.name,
                format!("expected {} arguments, got {}", self.params.len(), args.len()),
            ));
        }
        for (param, arg) in self.params.iter().zip(args) {
            check_type(&param.ty, arg).map_err(|_| {
                ErrorKind::arguments(
                    &self.name,
                    format!(
                        "parameter `{}` expects {}, got {}",
                        param.name,
                        param.ty,
                        arg.value_type()
                    ),
                )
            })?;
        }
        Ok(())
    }
}

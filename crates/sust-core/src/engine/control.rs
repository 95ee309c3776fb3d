//! Control flow opcodes
//!
//! There is no jump. Every control-flow command names a function and the
//! engine invokes it, once, per element, or until it answers `false`.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{error, info};

use crate::capability::Capability;
use crate::command::Command;
use crate::error::{ErrorKind, Result};
use crate::function::FunctionDef;
use crate::store::Scope;
use crate::value::{Value, ValueType};

use super::engine::Shared;
use super::executor::{Executor, Outcome};

/// Token that discards a `USE_FUNC` result
const DISCARD: &str = "null";

impl Executor {
    fn resolve(&self, name: &str) -> Result<Arc<FunctionDef>> {
        self.shared.functions.get(name)
    }

    /// `IF cond func`
    pub(super) fn run_if(&mut self, command: &Command, scope: &mut Scope<'_>) -> Outcome<()> {
        let name = command.arg(1)?;
        self.resolve(name)?;
        if scope.get(command.arg(0)?)?.as_bool()? {
            self.invoke(name, Vec::new())?;
        }
        Ok(())
    }

    /// `FOR func start end`, both bounds inclusive
    pub(super) fn run_for(&mut self, command: &Command, scope: &mut Scope<'_>) -> Outcome<()> {
        let name = command.arg(0)?;
        self.resolve(name)?;
        let start = scope.get(command.arg(1)?)?.as_int()?;
        let end = scope.get(command.arg(2)?)?.as_int()?;
        for i in start..=end {
            self.invoke(name, vec![Value::Integer(i)])?;
        }
        Ok(())
    }

    /// `FOR_LIST func list`, over a snapshot taken before the first call
    pub(super) fn run_for_list(&mut self, command: &Command, scope: &mut Scope<'_>) -> Outcome<()> {
        let name = command.arg(0)?;
        self.resolve(name)?;
        let items = scope.get(command.arg(1)?)?.as_list()?.to_vec();
        for item in items {
            self.invoke(name, vec![item])?;
        }
        Ok(())
    }

    /// `FOR_MAP func map`, entries in insertion order
    pub(super) fn run_for_map(&mut self, command: &Command, scope: &mut Scope<'_>) -> Outcome<()> {
        let name = command.arg(0)?;
        self.resolve(name)?;
        let map = scope.get(command.arg(1)?)?;
        let entries: Vec<(Value, Value)> = map
            .as_map()?
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (key, value) in entries {
            self.invoke(name, vec![key, value])?;
        }
        Ok(())
    }

    /// `FOR_STRING func string`
    pub(super) fn run_for_string(&mut self, command: &Command, scope: &mut Scope<'_>) -> Outcome<()> {
        let name = command.arg(0)?;
        self.resolve(name)?;
        let text = scope.get(command.arg(1)?)?;
        for symbol in text.as_bytes()? {
            self.invoke(name, vec![Value::Char(*symbol)])?;
        }
        Ok(())
    }

    /// `WHILE func`: call until the bool result is false
    pub(super) fn run_while(&mut self, command: &Command) -> Outcome<()> {
        let name = command.arg(0)?;
        let def = self.resolve(name)?;
        if def.result != ValueType::Bool {
            return Err(ErrorKind::mismatch(ValueType::Bool, &def.result).into());
        }
        while self
            .invoke(name, Vec::new())?
            .map_or(Ok(false), |value| value.as_bool())?
        {}
        Ok(())
    }

    /// `USE_FUNC func result [args...]`
    pub(super) fn use_func(&mut self, command: &Command, scope: &mut Scope<'_>) -> Outcome<()> {
        let name = command.arg(0)?;
        let target = command.arg(1)?;
        self.resolve(name)?;

        let args = command
            .args_from(2)
            .iter()
            .map(|arg| scope.get(arg))
            .collect::<Result<Vec<_>>>()?;

        if let Some(value) = self.invoke(name, args)? {
            if target != DISCARD {
                scope.assign(target, value)?;
            }
        }
        Ok(())
    }

    /// `SLEEP ms`
    pub(super) fn sleep(&mut self, command: &Command, scope: &mut Scope<'_>) -> Outcome<()> {
        let pause = match scope.get(command.arg(0)?)? {
            Value::Integer(ms) => Duration::from_millis(u64::try_from(ms).unwrap_or(0)),
            Value::Float(ms) if ms.is_finite() && ms > 0.0 => Duration::from_secs_f64(ms / 1000.0),
            Value::Float(_) => Duration::ZERO,
            other => return Err(ErrorKind::mismatch("int or float", other.value_type()).into()),
        };
        thread::sleep(pause);
        Ok(())
    }

    /// `NEW_THREAD func`
    pub(super) fn new_thread(&mut self, command: &Command) -> Outcome<()> {
        self.shared.capabilities.check(Capability::Threads)?;
        let name = command.arg(0)?;
        self.resolve(name)?.check_args(&[])?;
        spawn_context(&self.shared, command, name, Vec::new())?;
        info!(function = name, "thread spawned");
        Ok(())
    }
}

/// Run `function(args)` in a fresh execution context on its own thread.
/// A failure ends that context only.
pub(super) fn spawn_context(
    shared: &Arc<Shared>,
    command: &Command,
    function: &str,
    args: Vec<Value>,
) -> Result<()> {
    let context = Arc::clone(shared);
    let origin = command.clone();
    let function = function.to_string();

    let handle = thread::Builder::new()
        .name(format!("sust-{}", function))
        .spawn(move || {
            let mut executor = Executor::new(context);
            if let Err(fault) = executor.invoke(&function, args) {
                let err = fault.locate(&origin);
                error!(function = %function, error = %err, "execution context failed");
            }
        })?;

    shared.track(handle);
    Ok(())
}

//! Command Dispatcher
//!
//! One [`Executor`] drives one execution context: the main program, a
//! spawned thread or a listener connection. Contexts share the global
//! store and the function registry through [`Shared`].

use std::sync::Arc;

use tracing::{debug, trace};

use crate::command::{Command, OpCode};
use crate::error::{ErrorKind, ScriptError, ScriptResult};
use crate::store::{check_type, Binding, Frame, Scope};
use crate::value::Value;

use super::call_stack::CallStack;
use super::engine::Shared;
use super::{values, vars};

/// What the block runner does after a command
#[derive(Debug)]
pub(crate) enum Flow {
    Next,
    /// End the running function, or the context at top level
    Return,
    /// A `TEMP_VAR` binding to drop after the following command
    TempDeclared(String),
}

/// Error on its way out of a command
#[derive(Debug)]
pub(crate) enum Fault {
    /// Not yet tied to a command
    Raw(ErrorKind),
    /// Raised by a nested command and already located
    Located(ScriptError),
}

impl Fault {
    pub(crate) fn locate(self, command: &Command) -> ScriptError {
        match self {
            Fault::Raw(kind) => ScriptError::at(command, kind),
            Fault::Located(err) => err,
        }
    }
}

impl From<ErrorKind> for Fault {
    fn from(kind: ErrorKind) -> Self {
        Fault::Raw(kind)
    }
}

impl From<ScriptError> for Fault {
    fn from(err: ScriptError) -> Self {
        Fault::Located(err)
    }
}

pub(crate) type Outcome<T> = std::result::Result<T, Fault>;

pub(crate) struct Executor {
    pub(super) shared: Arc<Shared>,
    calls: CallStack,
}

impl Executor {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        let calls = CallStack::new(shared.config.max_call_depth);
        Executor { shared, calls }
    }

    /// Run `commands` in order, honoring `TEMP_VAR` lifetimes, until the
    /// end of the block or a `RETURN`
    pub(crate) fn run_block(
        &mut self,
        commands: &[Command],
        frame: &mut Option<Frame>,
    ) -> ScriptResult<()> {
        let shared = Arc::clone(&self.shared);
        let mut temps: Vec<(String, usize)> = Vec::new();

        for (index, command) in commands.iter().enumerate() {
            trace!(line = command.line, opcode = %command.opcode, "exec");
            let flow = self
                .exec(command, frame)
                .map_err(|fault| fault.locate(command))?;

            let redeclared = match &flow {
                Flow::TempDeclared(name) => Some(name.as_str()),
                _ => None,
            };
            temps.retain(|(name, declared)| {
                // a fresh TEMP_VAR of the same name restarts its lifetime
                if redeclared == Some(name.as_str()) {
                    false
                } else if *declared < index {
                    Scope::new(&shared.globals, frame.as_mut()).release(name);
                    false
                } else {
                    true
                }
            });

            match flow {
                Flow::Next => {}
                Flow::TempDeclared(name) => temps.push((name, index)),
                Flow::Return => break,
            }
        }

        Ok(())
    }

    /// Call a function with already evaluated arguments
    pub(crate) fn invoke(&mut self, name: &str, args: Vec<Value>) -> Outcome<Option<Value>> {
        let def = self.shared.functions.get(name)?;
        def.check_args(&args)?;
        self.calls.push(name)?;
        debug!(function = name, depth = self.calls.depth(), "invoke");

        let mut frame = Frame::new(name);
        for (param, arg) in def.params.iter().zip(args) {
            frame.bindings_mut().declare(&param.name, Binding::of(arg));
        }
        if def.returns_value() {
            let result = Binding::new(def.result.clone(), Value::default_for(&def.result))?;
            frame.bindings_mut().declare("result", result);
        }

        let mut slot = Some(frame);
        let outcome = self.run_block(&def.body, &mut slot);
        self.calls.pop();
        outcome.map_err(|err| err.in_function(name))?;

        if !def.returns_value() {
            return Ok(None);
        }
        let result = slot
            .as_ref()
            .and_then(|frame| frame.bindings().binding("result"))
            .ok_or_else(|| ErrorKind::UnknownVariable("result".to_string()))?;
        let value = result.value.clone().ok_or_else(|| {
            ErrorKind::StreamUnavailable(format!("result of `{}` was never set", name))
        })?;
        check_type(&def.result, &value)?;
        Ok(Some(value))
    }

    fn exec(&mut self, command: &Command, frame: &mut Option<Frame>) -> Outcome<Flow> {
        use OpCode::*;

        let shared = Arc::clone(&self.shared);
        let scope = &mut Scope::new(&shared.globals, frame.as_mut());

        match command.opcode {
            InitVar => vars::init_var(command, scope)?,
            SetVar => vars::set_var(command, scope)?,
            TempVar => return Ok(Flow::TempDeclared(vars::temp_var(command, scope)?)),
            MoveVar => vars::move_var(command, scope)?,
            CopyVar => vars::copy_var(command, scope)?,
            DropVar => vars::drop_var(command, scope)?,
            HasVar => vars::has_var(command, scope)?,

            ToString | ToChars | ToChar | ToInteger | ToFloat | ToBool => {
                values::convert(command, scope)?
            }
            GetSymbol => values::get_symbol(command, scope)?,
            GetItem => values::get_item(command, scope)?,
            GetValue => values::get_value(command, scope)?,
            SubStr | SubList => values::slice(command, scope)?,
            ListSize | MapSize | StringSize => values::size(command, scope)?,

            AddInt => values::add_int(command, scope)?,
            AddFloat => values::add_float(command, scope)?,
            AddStr => values::add_str(command, scope)?,
            Random => values::random(command, scope)?,

            Equals | More | Less | And | Or => values::binary(command, scope)?,
            Not => values::not(command, scope)?,

            HasStr => values::has_str(command, scope)?,
            HasItem => values::has_item(command, scope)?,
            HasEntry => values::has_entry(command, scope)?,
            HasKey | HasValue => values::has_member(command, scope)?,
            HasOptional => values::has_optional(command, scope)?,

            UnpackOptional => values::unpack_optional(command, scope)?,
            PackOptional => values::pack_optional(command, scope)?,
            NoneOptional => values::none_optional(command, scope)?,

            Write => self.write(command, scope)?,
            Read => self.read(command, scope)?,
            ReadAll => self.read_all(command, scope)?,
            OpenFileIn => self.open_file_in(command, scope)?,
            OpenFileOut => self.open_file_out(command, scope)?,
            OpenTcpConnection => self.open_tcp_connection(command, scope)?,
            OpenTcpListener => self.open_tcp_listener(command, scope)?,

            If => self.run_if(command, scope)?,
            For => self.run_for(command, scope)?,
            ForList => self.run_for_list(command, scope)?,
            ForMap => self.run_for_map(command, scope)?,
            ForString => self.run_for_string(command, scope)?,
            While => self.run_while(command)?,
            UseFunc => self.use_func(command, scope)?,
            Return => return Ok(Flow::Return),

            Sleep => self.sleep(command, scope)?,
            NewThread => self.new_thread(command)?,

            Func => {
                let name = command.arg(1)?.to_string();
                return Err(ErrorKind::NestedFunction(name).into());
            }
            FuncEnd => return Err(ErrorKind::UnexpectedFunctionEnd.into()),
        }

        Ok(Flow::Next)
    }
}

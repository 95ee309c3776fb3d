//! Script Loader
//!
//! Turns program text into a [`Program`]: the top-level command list plus
//! the function table. This layer performs structural validation only.

use tracing::debug;

use crate::command::{Command, OpCode};
use crate::error::{ErrorKind, ScriptError, ScriptResult};
use crate::function::{FunctionDef, FunctionRegistry, Param};
use crate::value::ValueType;

use super::tokenize;

/// Loaded program
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub commands: Vec<Command>,
    pub functions: FunctionRegistry,
}

/// A `FUNC` header waiting for its `FUNC_END`
struct OpenFunction {
    header: Command,
    result: ValueType,
    name: String,
    params: Vec<Param>,
    body: Vec<Command>,
}

impl OpenFunction {
    fn begin(header: Command) -> ScriptResult<Self> {
        let at = |kind| ScriptError::at(&header, kind);

        let result = header.arg(0).and_then(str::parse).map_err(at)?;
        let name = header.arg(1).map_err(at)?.to_string();

        let rest = header.args_from(2);
        if rest.len() % 2 != 0 {
            return Err(at(ErrorKind::MissingArgument {
                expected: "name/type parameter pairs".to_string(),
                found: rest.len(),
            }));
        }
        let params = rest
            .chunks(2)
            .map(|pair| -> Result<Param, ErrorKind> {
                Ok(Param::new(pair[0].clone(), pair[1].parse()?))
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(at)?;

        Ok(OpenFunction {
            header,
            result,
            name,
            params,
            body: Vec::new(),
        })
    }

    fn finish(self) -> FunctionDef {
        FunctionDef::new(self.name, self.result, self.params, self.body, self.header.line)
    }
}

/// Program text loader
pub struct ScriptLoader;

impl ScriptLoader {
    /// Load a program from source text
    pub fn load(source: &str) -> ScriptResult<Program> {
        let mut program = Program::default();
        let mut open: Option<OpenFunction> = None;

        for command in tokenize(source)? {
            match command.opcode {
                OpCode::Func => {
                    if open.is_some() {
                        let name = command.arg(1).unwrap_or_default().to_string();
                        return Err(ScriptError::at(&command, ErrorKind::NestedFunction(name)));
                    }
                    open = Some(OpenFunction::begin(command)?);
                }
                OpCode::FuncEnd => {
                    let function = open
                        .take()
                        .ok_or_else(|| ScriptError::at(&command, ErrorKind::UnexpectedFunctionEnd))?;
                    let line = function.header.line;
                    let def = function.finish();
                    debug!(name = %def.name, line, "function defined");
                    program
                        .functions
                        .register(def)
                        .map_err(|kind| ScriptError::new(line, OpCode::Func.name(), kind))?;
                }
                _ => match open.as_mut() {
                    Some(function) => function.body.push(command),
                    None => program.commands.push(command),
                },
            }
        }

        if let Some(function) = open {
            return Err(ScriptError::at(
                &function.header,
                ErrorKind::UnterminatedFunction(function.name),
            ));
        }

        Ok(program)
    }
}

//! Variable opcodes: declaration, ownership transfer and removal

use crate::command::Command;
use crate::error::{ErrorKind, Result};
use crate::store::Scope;
use crate::value::{Value, ValueType};

fn variable_type(token: &str) -> Result<ValueType> {
    match token.parse::<ValueType>()? {
        ValueType::Null => Err(ErrorKind::UnknownType(token.to_string())),
        ty => Ok(ty),
    }
}

/// `INIT_VAR type name`
pub(super) fn init_var(command: &Command, scope: &mut Scope<'_>) -> Result<()> {
    let ty = variable_type(command.arg(0)?)?;
    let value = Value::default_for(&ty);
    scope.declare(command.arg(1)?, ty, value)
}

/// `SET_VAR name literal...`
pub(super) fn set_var(command: &Command, scope: &mut Scope<'_>) -> Result<()> {
    let name = command.arg(0)?;
    let ty = scope.declared_type(name)?;
    let value = Value::parse_literal(&ty, &command.literal_from(1))?;
    scope.set(name, value)
}

/// `TEMP_VAR type name literal...`; returns the declared name
pub(super) fn temp_var(command: &Command, scope: &mut Scope<'_>) -> Result<String> {
    let ty = variable_type(command.arg(0)?)?;
    let name = command.arg(1)?;
    let value = Value::parse_literal(&ty, &command.literal_from(2))?;
    scope.declare(name, ty, Some(value))?;
    Ok(name.to_string())
}

pub(super) fn move_var(command: &Command, scope: &mut Scope<'_>) -> Result<()> {
    scope.move_var(command.arg(0)?, command.arg(1)?)
}

pub(super) fn copy_var(command: &Command, scope: &mut Scope<'_>) -> Result<()> {
    scope.copy_var(command.arg(0)?, command.arg(1)?)
}

pub(super) fn drop_var(command: &Command, scope: &mut Scope<'_>) -> Result<()> {
    scope.remove(command.arg(0)?)
}

pub(super) fn has_var(command: &Command, scope: &mut Scope<'_>) -> Result<()> {
    let bound = scope.contains(command.arg(0)?);
    scope.assign(command.arg(1)?, Value::Bool(bound))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::OpCode;
    use crate::store::Globals;

    fn cmd(opcode: OpCode, args: &[&str]) -> Command {
        Command::new(opcode, 1, args.iter().map(|a| a.to_string()).collect())
    }

    #[test]
    fn init_then_set() {
        let globals = Globals::new();
        let mut scope = Scope::new(&globals, None);
        init_var(&cmd(OpCode::InitVar, &["int", "x"]), &mut scope).unwrap();
        assert_eq!(scope.get("x"), Ok(Value::Integer(0)));
        set_var(&cmd(OpCode::SetVar, &["x", "10"]), &mut scope).unwrap();
        assert_eq!(scope.get("x"), Ok(Value::Integer(10)));
        assert!(matches!(
            set_var(&cmd(OpCode::SetVar, &["x", "ten"]), &mut scope),
            Err(ErrorKind::Conversion { .. })
        ));
    }

    #[test]
    fn set_literal_keeps_spaces() {
        let globals = Globals::new();
        let mut scope = Scope::new(&globals, None);
        init_var(&cmd(OpCode::InitVar, &["string", "s"]), &mut scope).unwrap();
        set_var(&cmd(OpCode::SetVar, &["s", "Hello,", "World!"]), &mut scope).unwrap();
        assert_eq!(scope.get("s"), Ok(Value::string("Hello, World!")));
    }

    #[test]
    fn null_is_not_a_variable_type() {
        let globals = Globals::new();
        let mut scope = Scope::new(&globals, None);
        assert_eq!(
            init_var(&cmd(OpCode::InitVar, &["null", "x"]), &mut scope),
            Err(ErrorKind::UnknownType("null".into()))
        );
    }

    #[test]
    fn stream_bindings_start_unset() {
        let globals = Globals::new();
        let mut scope = Scope::new(&globals, None);
        init_var(&cmd(OpCode::InitVar, &["out_stream", "o"]), &mut scope).unwrap();
        has_var(&cmd(OpCode::HasVar, &["o", "bound"]), &mut scope).unwrap();
        assert_eq!(scope.get("bound"), Ok(Value::Bool(true)));
        assert!(matches!(
            scope.get("o"),
            Err(ErrorKind::StreamUnavailable(_))
        ));
    }
}

//! Program Text Tokenizer
//!
//! Splits source text into commands. One command per line; `#` starts a
//! comment that runs to the end of the line.

use crate::command::{Command, OpCode};
use crate::error::{ErrorKind, ScriptError, ScriptResult};

fn strip_comment(line: &str) -> &str {
    line.split_once('#').map_or(line, |(code, _)| code)
}

/// Tokenize `source` into commands, checking opcodes and argument counts
pub fn tokenize(source: &str) -> ScriptResult<Vec<Command>> {
    let mut commands = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let mut tokens = strip_comment(raw)
            .split([' ', '\t'])
            .map(str::trim)
            .filter(|t| !t.is_empty());

        let Some(head) = tokens.next() else {
            continue;
        };
        let opcode = OpCode::from_name(head)
            .ok_or_else(|| ScriptError::new(line, head, ErrorKind::UnknownOpcode(head.to_string())))?;

        let args: Vec<String> = tokens.map(str::to_string).collect();
        let arity = opcode.arity();
        if !arity.accepts(args.len()) {
            return Err(ScriptError::new(
                line,
                opcode.name(),
                ErrorKind::MissingArgument {
                    expected: arity.to_string(),
                    found: args.len(),
                },
            ));
        }

        commands.push(Command::new(opcode, line, args));
    }

    Ok(commands)
}

//! Command Representation
//!
//! A single program line after tokenization.
//! This layer contains no execution semantics.

use crate::error::{ErrorKind, Result};

use super::opcode::OpCode;

/// One tokenized command
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub opcode: OpCode,
    pub args: Vec<String>,
    /// 1-based source line
    pub line: usize,
}

impl Command {
    pub fn new(opcode: OpCode, line: usize, args: Vec<String>) -> Self {
        Command { opcode, args, line }
    }

    /// Argument token at `index`
    pub fn arg(&self, index: usize) -> Result<&str> {
        self.args
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| ErrorKind::MissingArgument {
                expected: self.opcode.arity().to_string(),
                found: self.args.len(),
            })
    }

    /// Tokens from `index` on, joined back with single spaces
    pub fn literal_from(&self, index: usize) -> String {
        self.args.get(index..).map(|rest| rest.join(" ")).unwrap_or_default()
    }

    /// Tokens from `index` on
    pub fn args_from(&self, index: usize) -> &[String] {
        self.args.get(index..).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_joins_tail() {
        let cmd = Command::new(
            OpCode::TempVar,
            1,
            vec!["string".into(), "t".into(), "Hello".into(), "World".into()],
        );
        assert_eq!(cmd.literal_from(2), "Hello World");
        assert_eq!(cmd.literal_from(4), "");
        assert!(cmd.arg(4).is_err());
    }
}

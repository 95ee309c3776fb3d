pub mod command;
pub mod opcode;

pub use command::Command;
pub use opcode::{Arity, OpCode};

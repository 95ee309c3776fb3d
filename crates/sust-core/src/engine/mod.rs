//! Execution engine: dispatcher, control flow and stream opcodes

mod call_stack;
mod control;
#[allow(clippy::module_inception)]
mod engine;
mod executor;
mod io;
mod values;
mod vars;

pub use engine::{Engine, EngineBuilder};

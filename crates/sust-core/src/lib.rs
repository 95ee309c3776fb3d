//! Sust Execution Engine - Core Library
//!
//! Public API surface for the Sust core: values, the variable store, the
//! function registry, stream handles, the loader and the engine.

pub mod capability;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod function;
pub mod loader;
pub mod store;
pub mod stream;
pub mod value;

// Re-export commonly used types
pub use capability::{Capability, CapabilityRegistry};
pub use command::{Command, OpCode};
pub use config::EngineConfig;
pub use engine::{Engine, EngineBuilder};
pub use error::{ErrorKind, ScriptError, ScriptResult};
pub use function::{FunctionDef, FunctionRegistry, Param};
pub use loader::{Program, ScriptLoader};
pub use stream::{Connection, Host, InStream, Listener, NullHost, OutStream};
pub use value::{Value, ValueType};

pub mod definition;
pub mod registry;

pub use definition::{FunctionDef, Param};
pub use registry::FunctionRegistry;

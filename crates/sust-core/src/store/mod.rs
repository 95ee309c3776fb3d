//! Variable store: bindings, the global scope and function frames

mod bindings;
mod scope;

pub use bindings::{Binding, Bindings};
pub use scope::{Frame, Globals, Scope};

pub(crate) use bindings::check_type;

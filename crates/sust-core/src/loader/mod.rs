pub mod loader;
pub mod tokenizer;

pub use loader::{Program, ScriptLoader};
pub use tokenizer::tokenize;

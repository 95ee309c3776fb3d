pub mod convert;
pub mod ops;
pub mod types;
pub mod value;

pub use types::ValueType;
pub use value::Value;

pub mod handle;
pub mod host;

pub use handle::{InStream, OutStream};
pub use host::{Connection, Host, Listener, NullHost};

//! Host I/O boundary
//!
//! The engine never opens files or sockets itself. It asks a [`Host`] for
//! stream handles and only ever reads from or writes to them.

use std::io;

use super::handle::{InStream, OutStream};

/// An accepted network connection
#[derive(Debug)]
pub struct Connection {
    pub peer_addr: String,
    pub peer_port: u16,
    pub input: InStream,
    pub output: OutStream,
}

/// A bound listener
pub trait Listener: Send {
    /// Block until the next connection; `Ok(None)` once the listener is closed
    fn accept(&mut self) -> io::Result<Option<Connection>>;
}

/// Host-provided I/O resources
pub trait Host: Send + Sync {
    fn open_file_in(&self, path: &str) -> io::Result<InStream>;

    /// Open `path` for appending, creating it when missing
    fn open_file_out(&self, path: &str) -> io::Result<OutStream>;

    fn connect_tcp(&self, addr: &str, port: u16) -> io::Result<(InStream, OutStream)>;

    fn listen_tcp(&self, addr: &str, port: u16) -> io::Result<Box<dyn Listener>>;
}

/// Host without any resources; every request fails
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

fn unsupported(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, format!("{} not provided by host", what))
}

impl Host for NullHost {
    fn open_file_in(&self, _path: &str) -> io::Result<InStream> {
        Err(unsupported("files"))
    }

    fn open_file_out(&self, _path: &str) -> io::Result<OutStream> {
        Err(unsupported("files"))
    }

    fn connect_tcp(&self, _addr: &str, _port: u16) -> io::Result<(InStream, OutStream)> {
        Err(unsupported("network"))
    }

    fn listen_tcp(&self, _addr: &str, _port: u16) -> io::Result<Box<dyn Listener>> {
        Err(unsupported("network"))
    }
}

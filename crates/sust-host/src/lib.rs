//! Sust host: std filesystem, console and TCP integration
//!
//! Implements [`sust_core::Host`] on top of `std::fs` and `std::net`. The
//! engine only ever sees stream handles; this crate decides what they are.

pub mod policy;

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader};
use std::net::{SocketAddr, TcpListener, TcpStream};

use sust_core::{Connection, Host, InStream, Listener, OutStream};
use tracing::debug;

pub use policy::Policy;

/// Console streams as `(cout, cin)`
pub fn stdio() -> (OutStream, InStream) {
    (
        OutStream::new(io::stdout(), "stdout"),
        InStream::new(io::stdin(), "stdin"),
    )
}

/// Host backed by the local filesystem and network
#[derive(Debug, Default, Clone, Copy)]
pub struct StdHost;

impl StdHost {
    pub fn new() -> Self {
        StdHost
    }

    /// Bind a listener, keeping access to its local address
    pub fn bind(&self, addr: &str, port: u16) -> io::Result<StdListener> {
        let inner = TcpListener::bind((addr, port))?;
        debug!(local = %inner.local_addr()?, "listener bound");
        Ok(StdListener { inner })
    }
}

fn stream_pair(stream: TcpStream, label: &str) -> io::Result<(InStream, OutStream)> {
    let reader = stream.try_clone()?;
    Ok((InStream::new(reader, label), OutStream::new(stream, label)))
}

impl Host for StdHost {
    fn open_file_in(&self, path: &str) -> io::Result<InStream> {
        let file = File::open(path)?;
        Ok(InStream::new(BufReader::new(file), path))
    }

    fn open_file_out(&self, path: &str) -> io::Result<OutStream> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(OutStream::new(file, path))
    }

    fn connect_tcp(&self, addr: &str, port: u16) -> io::Result<(InStream, OutStream)> {
        let stream = TcpStream::connect((addr, port))?;
        let label = format!("tcp {}:{}", addr, port);
        stream_pair(stream, &label)
    }

    fn listen_tcp(&self, addr: &str, port: u16) -> io::Result<Box<dyn Listener>> {
        Ok(Box::new(self.bind(addr, port)?))
    }
}

/// `std::net::TcpListener` as a Sust listener
#[derive(Debug)]
pub struct StdListener {
    inner: TcpListener,
}

impl StdListener {
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }
}

impl Listener for StdListener {
    fn accept(&mut self) -> io::Result<Option<Connection>> {
        let (stream, peer) = self.inner.accept()?;
        let (input, output) = stream_pair(stream, &format!("tcp peer {}", peer))?;
        Ok(Some(Connection {
            peer_addr: peer.ip().to_string(),
            peer_port: peer.port(),
            input,
            output,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_output_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let path = path.to_str().unwrap();

        let host = StdHost::new();
        host.open_file_out(path).unwrap().write_all(b"one ").unwrap();
        host.open_file_out(path).unwrap().write_all(b"two").unwrap();

        let text = host.open_file_in(path).unwrap().read_to_end().unwrap();
        assert_eq!(text, b"one two");
    }

    #[test]
    fn missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent");
        assert!(StdHost::new().open_file_in(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn tcp_connection_round_trip() {
        let host = StdHost::new();
        let mut listener = host.bind("127.0.0.1", 0).unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = std::thread::spawn(move || {
            let conn = listener.accept().unwrap().unwrap();
            let msg = conn.input.read_exact(4).unwrap();
            conn.output.write_all(&msg).unwrap();
            conn.peer_addr
        });

        let (input, output) = host.connect_tcp("127.0.0.1", port).unwrap();
        output.write_all(b"ping").unwrap();
        assert_eq!(input.read_exact(4).unwrap(), b"ping");
        assert_eq!(server.join().unwrap(), "127.0.0.1");
    }

    #[test]
    fn stdio_labels() {
        let (cout, cin) = stdio();
        assert_eq!(cout.label(), "stdout");
        assert_eq!(cin.label(), "stdin");
    }
}

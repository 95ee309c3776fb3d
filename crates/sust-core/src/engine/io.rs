//! Stream opcodes
//!
//! Reads and writes go through stream handles; opening anything goes
//! through the host, after a capability check.

use std::io;

use tracing::{debug, info};

use crate::capability::Capability;
use crate::command::Command;
use crate::error::{ErrorKind, Result};
use crate::store::Scope;
use crate::value::{Value, ValueType};

use super::control::spawn_context;
use super::executor::{Executor, Outcome};

/// Parameter types of an `OPEN_TCP_LISTENER` accept function
const ACCEPT_SIGNATURE: [ValueType; 4] = [
    ValueType::String,
    ValueType::Integer,
    ValueType::InStream,
    ValueType::OutStream,
];

fn unavailable(target: &str, err: io::Error) -> ErrorKind {
    ErrorKind::StreamUnavailable(format!("{}: {}", target, err))
}

fn text(scope: &Scope<'_>, name: &str) -> Result<String> {
    let bytes = scope.get(name)?.text_bytes()?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn port(scope: &Scope<'_>, name: &str) -> Result<u16> {
    let port = scope.get(name)?.as_int()?;
    u16::try_from(port).map_err(|_| ErrorKind::conversion(format!("int {}", port), "port"))
}

/// Store bytes read from a stream into an existing string or `list[char]`
fn store_text(scope: &mut Scope<'_>, target: &str, bytes: Vec<u8>) -> Result<()> {
    let value = match scope.declared_type(target)? {
        ValueType::String => Value::String(bytes),
        ty if ty.is_char_list() => Value::char_list(&bytes),
        ty => return Err(ErrorKind::mismatch("string or list[char]", ty)),
    };
    scope.set(target, value)
}

impl Executor {
    /// `WRITE value out`
    pub(super) fn write(&mut self, command: &Command, scope: &mut Scope<'_>) -> Outcome<()> {
        let value = scope.get(command.arg(0)?)?;
        let out = scope.get(command.arg(1)?)?;
        out.as_out_stream()?.write_all(&value.render())?;
        Ok(())
    }

    /// `READ target size in`
    pub(super) fn read(&mut self, command: &Command, scope: &mut Scope<'_>) -> Outcome<()> {
        let target = command.arg(0)?;
        let requested = scope.get(command.arg(1)?)?.as_int()?;
        let limit = self.shared.config.max_read_size;
        let size = usize::try_from(requested)
            .ok()
            .filter(|size| *size <= limit)
            .ok_or(ErrorKind::InvalidRange {
                start: 0,
                end: requested,
                len: limit,
            })?;

        // fail on a bad target before consuming any input
        scope.declared_type(target)?;
        let stream = scope.get(command.arg(2)?)?;
        let bytes = stream.as_in_stream()?.read_exact(size)?;
        store_text(scope, target, bytes)?;
        Ok(())
    }

    /// `READ_ALL target in`
    pub(super) fn read_all(&mut self, command: &Command, scope: &mut Scope<'_>) -> Outcome<()> {
        let target = command.arg(0)?;
        scope.declared_type(target)?;
        let stream = scope.get(command.arg(1)?)?;
        let bytes = stream.as_in_stream()?.read_to_end()?;
        store_text(scope, target, bytes)?;
        Ok(())
    }

    /// `OPEN_FILE_IN path stream`
    pub(super) fn open_file_in(&mut self, command: &Command, scope: &mut Scope<'_>) -> Outcome<()> {
        self.shared.capabilities.check(Capability::FileRead)?;
        let path = text(scope, command.arg(0)?)?;
        let stream = self
            .shared
            .host
            .open_file_in(&path)
            .map_err(|err| unavailable(&path, err))?;
        debug!(path = %path, "file opened for reading");
        scope.assign(command.arg(1)?, Value::InStream(stream))?;
        Ok(())
    }

    /// `OPEN_FILE_OUT path stream`
    pub(super) fn open_file_out(&mut self, command: &Command, scope: &mut Scope<'_>) -> Outcome<()> {
        self.shared.capabilities.check(Capability::FileWrite)?;
        let path = text(scope, command.arg(0)?)?;
        let stream = self
            .shared
            .host
            .open_file_out(&path)
            .map_err(|err| unavailable(&path, err))?;
        debug!(path = %path, "file opened for writing");
        scope.assign(command.arg(1)?, Value::OutStream(stream))?;
        Ok(())
    }

    /// `OPEN_TCP_CONNECTION addr port in out`
    pub(super) fn open_tcp_connection(
        &mut self,
        command: &Command,
        scope: &mut Scope<'_>,
    ) -> Outcome<()> {
        self.shared.capabilities.check(Capability::Network)?;
        let addr = text(scope, command.arg(0)?)?;
        let port = port(scope, command.arg(1)?)?;
        let (input, output) = self
            .shared
            .host
            .connect_tcp(&addr, port)
            .map_err(|err| unavailable(&format!("{}:{}", addr, port), err))?;
        debug!(addr = %addr, port, "connected");
        scope.assign(command.arg(2)?, Value::InStream(input))?;
        scope.assign(command.arg(3)?, Value::OutStream(output))?;
        Ok(())
    }

    /// `OPEN_TCP_LISTENER addr port accept_func`: serve each connection in
    /// its own context until the listener closes
    pub(super) fn open_tcp_listener(
        &mut self,
        command: &Command,
        scope: &mut Scope<'_>,
    ) -> Outcome<()> {
        self.shared.capabilities.check(Capability::Network)?;
        let addr = text(scope, command.arg(0)?)?;
        let port = port(scope, command.arg(1)?)?;
        let accept = command.arg(2)?;

        let def = self.shared.functions.get(accept)?;
        if !def.params.iter().map(|p| &p.ty).eq(ACCEPT_SIGNATURE.iter()) {
            return Err(ErrorKind::arguments(
                accept,
                "accept function must take (string, int, in_stream, out_stream)",
            )
            .into());
        }

        let endpoint = format!("{}:{}", addr, port);
        let mut listener = self
            .shared
            .host
            .listen_tcp(&addr, port)
            .map_err(|err| unavailable(&endpoint, err))?;
        info!(endpoint = %endpoint, "listening");

        while let Some(conn) = listener.accept().map_err(|err| unavailable(&endpoint, err))? {
            debug!(peer = %conn.peer_addr, port = conn.peer_port, "connection accepted");
            let args = vec![
                Value::string(conn.peer_addr),
                Value::Integer(i64::from(conn.peer_port)),
                Value::InStream(conn.input),
                Value::OutStream(conn.output),
            ];
            spawn_context(&self.shared, command, accept, args)?;
        }

        info!(endpoint = %endpoint, "listener closed");
        Ok(())
    }
}

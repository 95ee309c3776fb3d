mod common;

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use common::{input, load, run_builder, Capture};
use sust_core::{Capability, Connection, Engine, ErrorKind, Host, InStream, Listener, OutStream, Value};

/// Host serving canned connections from memory
#[derive(Clone, Default)]
struct MockHost {
    pending: Arc<Mutex<Vec<Connection>>>,
    dialed: Arc<Mutex<Vec<(String, u16)>>>,
    bound: Arc<Mutex<Vec<(String, u16)>>>,
    remote: Capture,
}

impl MockHost {
    fn queue(&self, peer: &str, port: u16, request: &[u8]) -> Capture {
        let reply = Capture::default();
        self.pending.lock().unwrap().push(Connection {
            peer_addr: peer.to_string(),
            peer_port: port,
            input: input(request),
            output: reply.stream(),
        });
        reply
    }
}

struct MockListener(VecDeque<Connection>);

impl Listener for MockListener {
    fn accept(&mut self) -> io::Result<Option<Connection>> {
        Ok(self.0.pop_front())
    }
}

impl Host for MockHost {
    fn open_file_in(&self, path: &str) -> io::Result<InStream> {
        Err(io::Error::new(io::ErrorKind::NotFound, path.to_string()))
    }

    fn open_file_out(&self, path: &str) -> io::Result<OutStream> {
        Err(io::Error::new(io::ErrorKind::NotFound, path.to_string()))
    }

    fn connect_tcp(&self, addr: &str, port: u16) -> io::Result<(InStream, OutStream)> {
        self.dialed.lock().unwrap().push((addr.to_string(), port));
        Ok((input(b"pong"), self.remote.stream()))
    }

    fn listen_tcp(&self, addr: &str, port: u16) -> io::Result<Box<dyn Listener>> {
        self.bound.lock().unwrap().push((addr.to_string(), port));
        let queued = std::mem::take(&mut *self.pending.lock().unwrap());
        Ok(Box::new(MockListener(queued.into())))
    }
}

#[test]
fn thread_writes_are_visible_after_join() {
    let source = "\
INIT_VAR bool done
FUNC null work
TEMP_VAR bool yes true
COPY_VAR yes done
FUNC_END
NEW_THREAD work
";
    let builder = Engine::builder(load(source)).grant(Capability::Threads);
    let outcome = run_builder(builder, b"");
    outcome.result.expect("run failed");
    assert_eq!(outcome.engine.globals().get("done"), Ok(Value::Bool(true)));
}

#[test]
fn threads_need_capability() {
    let outcome = run_builder(
        Engine::builder(load("FUNC null work\nFUNC_END\nNEW_THREAD work\n")),
        b"",
    );
    let err = outcome.result.unwrap_err();
    assert_eq!(err.line, 3);
    assert_eq!(err.kind, ErrorKind::CapabilityDenied(Capability::Threads));
}

#[test]
fn thread_function_takes_no_arguments() {
    let builder = Engine::builder(load("FUNC null work n int\nFUNC_END\nNEW_THREAD work\n"))
        .grant(Capability::Threads);
    let outcome = run_builder(builder, b"");
    assert!(matches!(
        outcome.result.unwrap_err().kind,
        ErrorKind::ArgumentMismatch { .. }
    ));
}

#[test]
fn failing_thread_leaves_main_running() {
    let source = "\
FUNC null bad
DROP_VAR ghost
FUNC_END
NEW_THREAD bad
TEMP_VAR string a after
WRITE a cout
";
    let builder = Engine::builder(load(source)).grant(Capability::Threads);
    let outcome = run_builder(builder, b"");
    outcome.result.expect("main context failed");
    assert_eq!(outcome.out, "after");
}

#[test]
fn concurrent_updates_are_not_lost() {
    let source = "\
INIT_VAR int total
FUNC null bump i int
TEMP_VAR int one 1
ADD_INT total one
FUNC_END
FUNC null work
INIT_VAR int lo
SET_VAR lo 1
INIT_VAR int hi
SET_VAR hi 100
FOR bump lo hi
FUNC_END
NEW_THREAD work
NEW_THREAD work
NEW_THREAD work
";
    let builder = Engine::builder(load(source)).grant(Capability::Threads);
    let outcome = run_builder(builder, b"");
    outcome.result.expect("run failed");
    assert_eq!(outcome.engine.globals().get("total"), Ok(Value::Integer(300)));
}

const SERVER: &str = "\
FUNC null serve peer string port int in in_stream out out_stream
INIT_VAR string msg
TEMP_VAR int four 4
READ msg four in
WRITE peer out
WRITE msg out
FUNC_END
INIT_VAR string addr
SET_VAR addr 127.0.0.1
INIT_VAR int port
SET_VAR port 9000
OPEN_TCP_LISTENER addr port serve
";

#[test]
fn listener_serves_each_connection() {
    let host = MockHost::default();
    let first = host.queue("10.0.0.1", 4000, b"ping");
    let second = host.queue("10.0.0.2", 4001, b"pong");

    let builder = Engine::builder(load(SERVER))
        .host(host.clone())
        .grant(Capability::Network);
    let outcome = run_builder(builder, b"");
    outcome.result.expect("run failed");

    assert_eq!(
        host.bound.lock().unwrap().as_slice(),
        &[("127.0.0.1".to_string(), 9000)]
    );
    assert_eq!(first.text(), "10.0.0.1ping");
    assert_eq!(second.text(), "10.0.0.2pong");
}

#[test]
fn listener_needs_network() {
    let host = MockHost::default();
    let outcome = run_builder(Engine::builder(load(SERVER)).host(host.clone()), b"");
    let err = outcome.result.unwrap_err();
    assert_eq!(err.line, 12);
    assert_eq!(err.kind, ErrorKind::CapabilityDenied(Capability::Network));
    assert!(host.bound.lock().unwrap().is_empty());
}

#[test]
fn accept_function_signature_is_checked() {
    let source = "\
FUNC null serve peer string
FUNC_END
INIT_VAR string addr
SET_VAR addr 127.0.0.1
INIT_VAR int port
SET_VAR port 9000
OPEN_TCP_LISTENER addr port serve
";
    let host = MockHost::default();
    let builder = Engine::builder(load(source))
        .host(host.clone())
        .grant(Capability::Network);
    let outcome = run_builder(builder, b"");
    assert!(matches!(
        outcome.result.unwrap_err().kind,
        ErrorKind::ArgumentMismatch { .. }
    ));
    assert!(host.bound.lock().unwrap().is_empty());
}

#[test]
fn connection_streams_reach_the_host() {
    let source = "\
INIT_VAR string addr
SET_VAR addr example.org
INIT_VAR int port
SET_VAR port 80
OPEN_TCP_CONNECTION addr port rx tx
TEMP_VAR string hello hi
WRITE hello tx
INIT_VAR string reply
READ_ALL reply rx
";
    let host = MockHost::default();
    let builder = Engine::builder(load(source))
        .host(host.clone())
        .grant(Capability::Network);
    let outcome = run_builder(builder, b"");
    outcome.result.expect("run failed");

    assert_eq!(
        host.dialed.lock().unwrap().as_slice(),
        &[("example.org".to_string(), 80)]
    );
    assert_eq!(host.remote.text(), "hi");
    assert_eq!(outcome.engine.globals().get("reply"), Ok(Value::string("pong")));
}

#[test]
fn port_must_fit_sixteen_bits() {
    let source = "\
INIT_VAR string addr
SET_VAR addr example.org
INIT_VAR int port
SET_VAR port 70000
OPEN_TCP_CONNECTION addr port rx tx
";
    let host = MockHost::default();
    let builder = Engine::builder(load(source))
        .host(host.clone())
        .grant(Capability::Network);
    let outcome = run_builder(builder, b"");
    assert!(matches!(
        outcome.result.unwrap_err().kind,
        ErrorKind::Conversion { .. }
    ));
    assert!(host.dialed.lock().unwrap().is_empty());
}

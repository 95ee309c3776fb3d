#![allow(dead_code)]

use std::io::{self, Cursor, Write};
use std::sync::{Arc, Mutex};

use sust_core::{Engine, EngineBuilder, InStream, OutStream, Program, ScriptLoader, ScriptResult};

/// Shared in-memory sink
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn stream(&self) -> OutStream {
        OutStream::new(self.clone(), "capture")
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn input(bytes: &[u8]) -> InStream {
    InStream::new(Cursor::new(bytes.to_vec()), "input")
}

pub fn load(source: &str) -> Program {
    ScriptLoader::load(source).expect("load failed")
}

/// Build an engine with console streams wired to a capture and `stdin`
pub fn start(builder: EngineBuilder, stdin: &[u8]) -> (Engine, Capture) {
    let engine = builder.build();
    let out = Capture::default();
    engine.set_standard_vars(vec!["script.sus".to_string()], out.stream(), input(stdin));
    (engine, out)
}

pub struct Outcome {
    pub result: ScriptResult<()>,
    pub out: String,
    pub engine: Engine,
}

pub fn run_builder(builder: EngineBuilder, stdin: &[u8]) -> Outcome {
    let (engine, out) = start(builder, stdin);
    let result = engine.run();
    engine.join_threads();
    Outcome {
        result,
        out: out.text(),
        engine,
    }
}

pub fn run(source: &str) -> Outcome {
    run_builder(Engine::builder(load(source)), b"")
}

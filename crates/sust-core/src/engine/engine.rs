//! Sust Engine
//!
//! Owns everything execution contexts share: configuration, the function
//! registry, the global store, the host and the granted capabilities.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use tracing::{error, info};

use crate::capability::{Capability, CapabilityRegistry};
use crate::command::{Command, OpCode};
use crate::config::EngineConfig;
use crate::error::ScriptResult;
use crate::function::FunctionRegistry;
use crate::loader::Program;
use crate::store::{Binding, Globals};
use crate::stream::{Host, InStream, NullHost, OutStream};
use crate::value::{Value, ValueType};

use super::executor::Executor;

/// State shared by every execution context of one engine
pub(crate) struct Shared {
    pub config: EngineConfig,
    pub functions: FunctionRegistry,
    pub globals: Globals,
    pub host: Arc<dyn Host>,
    pub capabilities: CapabilityRegistry,
    threads: Mutex<Vec<JoinHandle<()>>>,
}

impl Shared {
    pub(crate) fn track(&self, handle: JoinHandle<()>) {
        self.threads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
    }

    fn take_threads(&self) -> Vec<JoinHandle<()>> {
        std::mem::take(&mut *self.threads.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Configures an [`Engine`] before it runs
pub struct EngineBuilder {
    program: Program,
    config: EngineConfig,
    host: Arc<dyn Host>,
    capabilities: CapabilityRegistry,
}

impl EngineBuilder {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn host(mut self, host: impl Host + 'static) -> Self {
        self.host = Arc::new(host);
        self
    }

    pub fn capabilities(mut self, capabilities: CapabilityRegistry) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Grant a capability (host-level operation)
    pub fn grant(mut self, cap: Capability) -> Self {
        self.capabilities.grant(cap);
        self
    }

    pub fn build(self) -> Engine {
        let Program { commands, functions } = self.program;
        Engine {
            commands: commands.into(),
            shared: Arc::new(Shared {
                config: self.config,
                functions,
                globals: Globals::new(),
                host: self.host,
                capabilities: self.capabilities,
                threads: Mutex::new(Vec::new()),
            }),
        }
    }
}

/// Sust execution engine
pub struct Engine {
    commands: Arc<[Command]>,
    shared: Arc<Shared>,
}

impl Engine {
    /// Engine with default limits, no host resources and no capabilities
    pub fn new(program: Program) -> Self {
        Self::builder(program).build()
    }

    pub fn builder(program: Program) -> EngineBuilder {
        EngineBuilder {
            program,
            config: EngineConfig::default(),
            host: Arc::new(NullHost),
            capabilities: CapabilityRegistry::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.shared.functions
    }

    pub fn globals(&self) -> &Globals {
        &self.shared.globals
    }

    /// Bind `args`, `cout` and `cin` in the global scope
    pub fn set_standard_vars(&self, args: Vec<String>, cout: OutStream, cin: InStream) {
        let args = Value::list(
            ValueType::String,
            args.into_iter().map(Value::string).collect(),
        );
        let globals = &self.shared.globals;
        globals.declare("args", Binding::of(args));
        globals.declare("cout", Binding::of(Value::OutStream(cout)));
        globals.declare("cin", Binding::of(Value::InStream(cin)));
    }

    /// Run the top-level commands on the calling thread
    pub fn run(&self) -> ScriptResult<()> {
        info!(
            commands = self.commands.len(),
            functions = self.shared.functions.len(),
            "run started"
        );
        let mut executor = Executor::new(Arc::clone(&self.shared));
        let result = executor.run_block(&self.commands, &mut None);
        match &result {
            Ok(()) => info!("run finished"),
            Err(err) => error!(error = %err, "run failed"),
        }
        result
    }

    /// Call a function directly, as `USE_FUNC` would
    pub fn call(&self, name: &str, args: Vec<Value>) -> ScriptResult<Option<Value>> {
        let mut executor = Executor::new(Arc::clone(&self.shared));
        executor.invoke(name, args).map_err(|fault| {
            let origin = Command::new(OpCode::UseFunc, 0, vec![name.to_string()]);
            fault.locate(&origin)
        })
    }

    /// Wait for every spawned context, including ones spawned while waiting
    pub fn join_threads(&self) {
        loop {
            let handles = self.shared.take_threads();
            if handles.is_empty() {
                break;
            }
            for handle in handles {
                if handle.join().is_err() {
                    error!("execution context panicked");
                }
            }
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("commands", &self.commands.len())
            .field("config", &self.shared.config)
            .field("capabilities", &self.shared.capabilities)
            .finish()
    }
}

//! Sust Execution Engine - CLI
//!
//! Runs one script file against the local filesystem, console and network.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use sust_core::{Capability, Engine, EngineConfig, ScriptLoader};
use sust_host::{Policy, StdHost};
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "sust", version, about = "Run a Sust script")]
struct Cli {
    /// Script file to run
    script: PathBuf,

    /// Arguments passed to the script after its own path
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,

    /// Maximum nested function invocations
    #[arg(long, value_name = "N")]
    max_call_depth: Option<usize>,

    /// Largest byte count a single READ may request
    #[arg(long, value_name = "BYTES")]
    max_read_size: Option<usize>,

    /// Grant no file, network or thread capabilities
    #[arg(long)]
    sandbox: bool,

    /// Grant one capability even in a sandbox (repeatable)
    #[arg(long = "allow", value_name = "CAP", value_parser = parse_capability)]
    allow: Vec<Capability>,

    /// File listing capabilities to grant, comma- or newline-separated
    #[arg(long, value_name = "PATH")]
    allow_file: Option<PathBuf>,
}

fn parse_capability(name: &str) -> Result<Capability, String> {
    name.parse()
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn config(cli: &Cli) -> EngineConfig {
    let mut config = EngineConfig::default();
    if let Some(depth) = cli.max_call_depth {
        config = config.with_max_call_depth(depth);
    }
    if let Some(size) = cli.max_read_size {
        config = config.with_max_read_size(size);
    }
    config
}

fn policy(cli: &Cli) -> io::Result<Policy> {
    let base = if cli.sandbox {
        Policy::sandbox()
    } else {
        Policy::permissive()
    };
    let mut granted = cli.allow.clone();
    if let Some(path) = &cli.allow_file {
        granted.extend(Policy::load_allow_list(path)?);
    }
    Ok(granted.into_iter().fold(base, Policy::allow))
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let source = match fs::read_to_string(&cli.script) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("error: cannot read {}: {}", cli.script.display(), e);
            process::exit(1);
        }
    };

    let program = match ScriptLoader::load(&source) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    let policy = match policy(&cli) {
        Ok(policy) => policy,
        Err(e) => {
            eprintln!("error: cannot read allow-list: {}", e);
            process::exit(1);
        }
    };
    let engine = Engine::builder(program)
        .config(config(&cli))
        .host(StdHost::new())
        .capabilities(policy.registry())
        .build();
    for entry in policy.audit_log() {
        debug!(%entry, "capability policy");
    }

    let mut args = vec![cli.script.display().to_string()];
    args.extend(cli.args.iter().cloned());
    let (cout, cin) = sust_host::stdio();
    engine.set_standard_vars(args, cout, cin);

    if let Err(e) = engine.run() {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

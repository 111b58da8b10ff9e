//! The `frisbee` binary: run one environment of a distributed frisbee
//! program.
//!
//! ```text
//! frisbee program.frisbee --config topology.yaml --env alpha
//! ```
//!
//! Loads the module graph rooted at the program file, starts the named
//! environment from the topology, spawns `Main`, injects the initial `run`
//! message and then serves the bus until killed. Exits non-zero on
//! configuration errors, missing modules and parse failures.

// Layer 1: Standard library imports
use std::path::PathBuf;
use std::process::ExitCode;

// Layer 2: Third-party crate imports
use anyhow::{bail, Context};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// Layer 3: Internal module imports
use frisbee_lang::{Loader, ToolParser};
use frisbee_rt::{Environment, Topology};

/// Default name of the front-end parser binary, resolved on PATH.
const DEFAULT_PARSER_TOOL: &str = "frisbee-exe";

#[derive(Debug, Parser)]
#[command(name = "frisbee", about = "Distributed runtime for the frisbee actor language")]
struct Cli {
    /// The program's entry module source file.
    program: PathBuf,

    /// YAML topology mapping environment names to endpoints.
    #[arg(long)]
    config: PathBuf,

    /// Which environment of the topology this process runs.
    #[arg(long)]
    env: String,

    /// Front-end parser binary emitting the s-expression AST.
    #[arg(long, default_value = DEFAULT_PARSER_TOOL)]
    parser: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let topology = Topology::from_path(&cli.config)?;

    let root = cli
        .program
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let Some(main_module) = cli.program.file_stem().and_then(|stem| stem.to_str()) else {
        bail!("program path `{}` has no module name", cli.program.display());
    };

    let loader = Loader::new(ToolParser::new(&cli.parser), root);
    let types = loader
        .load(main_module)
        .with_context(|| format!("loading `{}`", cli.program.display()))?;

    let environment = Environment::start(&cli.env, topology).await?;
    environment.run_program(types, main_module).await?;

    // The program now runs entirely on bus traffic; serve until killed.
    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    info!("shutting down");
    environment.shutdown();
    Ok(())
}

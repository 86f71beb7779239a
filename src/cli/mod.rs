//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions. Running
//! without a subcommand runs the demo.

pub mod backends;
pub mod config;
pub mod demo;
pub mod generate;
pub mod provision;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Random values from Random.org, ANU QRNG and a local quantum simulator
#[derive(Parser)]
#[command(name = "ask-the-universe")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Exercise every backend in turn (default)
    Demo,

    /// Generate random values from one backend
    Generate(generate::GenerateArgs),

    /// List backends and the kinds of values they produce
    Backends,

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Install the quantum simulator's Python dependencies
    Provision(provision::ProvisionArgs),
}

/// Initialize logging to stderr, filtered by `RUST_LOG` (default: warn)
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();
    init_logging();

    match cli.command.unwrap_or(Commands::Demo) {
        Commands::Demo => demo::run().await,
        Commands::Generate(args) => generate::run(args).await,
        Commands::Backends => backends::run(),
        Commands::Config(args) => config::run(args),
        Commands::Provision(args) => provision::run(args).await,
    }
}

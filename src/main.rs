//! ask-the-universe CLI entry point
//!
//! Runs the demo by default, or one of the subcommands.

use ask_the_universe::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

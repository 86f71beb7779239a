//! Provision command handler
//!
//! Installs the Python packages the simulator backend needs.

use crate::config::Config;
use crate::error::Result;
use crate::provider::provision::DependencyInstaller;
use clap::Args;

/// Provision command arguments
#[derive(Args)]
pub struct ProvisionArgs {
    /// Only report whether the dependencies are importable
    #[arg(long)]
    pub check: bool,
}

/// Run the provision command
pub async fn run(args: ProvisionArgs) -> Result<()> {
    let config = Config::load()?;
    let installer = DependencyInstaller::from_config(&config.simulator);
    let packages = installer.packages().join(", ");

    if args.check {
        if installer.is_satisfied().await? {
            println!("Simulator dependencies present: {}", packages);
        } else {
            println!("Simulator dependencies missing: {}", packages);
            println!("Run `ask-the-universe provision` to install them.");
        }
        return Ok(());
    }

    if installer.ensure().await? {
        println!("Installed {}", packages);
    } else {
        println!("Simulator dependencies already present: {}", packages);
    }
    Ok(())
}

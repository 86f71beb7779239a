//! Simulator dependency provisioning
//!
//! Installing Qiskit is an environment side effect, kept apart from the
//! simulator wrapper. Callers run it explicitly (`ask-the-universe provision`).

use crate::config::SimulatorConfig;
use crate::constants::simulator::REQUIRED_PACKAGES;
use crate::error::{Error, Result};
use tokio::process::Command;
use tracing::info;

/// Installs the Python packages the bundled circuit imports
#[derive(Debug, Clone)]
pub struct DependencyInstaller {
    program: String,
    packages: Vec<String>,
}

impl DependencyInstaller {
    /// Installer using `python3` and the default package set
    pub fn new() -> Self {
        Self::from_config(&SimulatorConfig::default())
    }

    /// Installer using the configured simulator interpreter
    pub fn from_config(config: &SimulatorConfig) -> Self {
        Self {
            program: config.program.clone(),
            packages: REQUIRED_PACKAGES.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    /// Python statement importing every package (`qiskit-aer` imports as `qiskit_aer`)
    fn import_statement(&self) -> String {
        let modules: Vec<String> = self.packages.iter().map(|p| p.replace('-', "_")).collect();
        format!("import {}", modules.join(", "))
    }

    /// Whether the interpreter can already import every package
    pub async fn is_satisfied(&self) -> Result<bool> {
        let status = Command::new(&self.program)
            .arg("-c")
            .arg(self.import_statement())
            .output()
            .await
            .map_err(|e| self.launch_error(e))?
            .status;
        Ok(status.success())
    }

    /// Run `pip install` for every package
    pub async fn install(&self) -> Result<()> {
        info!(program = %self.program, packages = ?self.packages, "Installing simulator dependencies");

        let output = Command::new(&self.program)
            .args(["-m", "pip", "install"])
            .args(&self.packages)
            .output()
            .await
            .map_err(|e| self.launch_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Transport {
                status: None,
                message: format!("pip install exited with {}: {}", output.status, stderr.trim()),
            });
        }
        Ok(())
    }

    /// Install only when an import probe fails. Returns whether it installed.
    pub async fn ensure(&self) -> Result<bool> {
        if self.is_satisfied().await? {
            return Ok(false);
        }
        self.install().await?;
        Ok(true)
    }

    fn launch_error(&self, err: std::io::Error) -> Error {
        Error::Transport {
            status: None,
            message: format!("Failed to launch '{}': {}", self.program, err),
        }
    }
}

impl Default for DependencyInstaller {
    fn default() -> Self {
        Self::new()
    }
}

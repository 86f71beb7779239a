//! IBM Quantum simulator backend
//!
//! Bits come from a Hadamard circuit run on a local Qiskit simulator. The
//! simulator is an external process: it is invoked as
//! `<program> <script> <bits> <backend>` and prints a single JSON line
//! `{"bits": "0110...", "backend": "aer_simulator"}`. By default the program
//! is `python3` and the script is the circuit bundled with this crate.
//!
//! Nothing is installed on construction; see `provision::DependencyInstaller`.

use crate::config::SimulatorConfig;
use crate::constants::simulator::{MAX_BITS, MAX_BYTES};
use crate::error::{Error, Result};
use crate::provider::{
    check_range, pack_bits, unsupported, RandomKind, RandomRequest, RandomResult, RandomValues,
    RandomnessProvider,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

pub(crate) const DESCRIPTION: &str = "IBM Quantum circuit on a local Qiskit simulator";

/// Circuit run when no script path is configured
const CIRCUIT_SCRIPT: &str = include_str!("circuit.py");

/// Where the simulator script comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptSource {
    /// Bundled circuit, passed inline with `-c`
    Embedded,
    /// Script file passed as the first argument
    File(PathBuf),
}

/// Wrapper around the external quantum simulator
#[derive(Debug, Clone)]
pub struct IbmQuantumWrapper {
    program: String,
    script: ScriptSource,
    backend: String,
    timeout: Duration,
}

/// Bits produced by one simulator run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantumBits {
    pub bitstring: String,
    /// Integer value of the bitstring (MSB first), for up to 64 bits
    pub integer: Option<u64>,
    /// Simulator backend that ran the circuit
    pub backend: String,
}

#[derive(Debug, Deserialize)]
struct SimulatorOutput {
    bits: String,
    backend: String,
}

impl IbmQuantumWrapper {
    /// Wrapper running the bundled circuit with `python3` on `aer_simulator`
    pub fn new() -> Self {
        Self::from_config(&SimulatorConfig::default())
    }

    pub fn from_config(config: &SimulatorConfig) -> Self {
        let script = if config.script.is_empty() {
            ScriptSource::Embedded
        } else {
            ScriptSource::File(PathBuf::from(&config.script))
        };

        Self {
            program: config.program.clone(),
            script,
            backend: config.backend.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_script(mut self, path: impl Into<PathBuf>) -> Self {
        self.script = ScriptSource::File(path.into());
        self
    }

    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = backend.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Kinds this backend can produce
    pub fn supports_kind(kind: RandomKind) -> bool {
        matches!(kind, RandomKind::Bytes | RandomKind::BitString)
    }

    /// Run the circuit for `bits` random bits
    pub async fn generate_random_bits(&self, bits: usize) -> Result<QuantumBits> {
        check_range("bits", bits, 1, MAX_BITS)?;

        let output = self.run(bits).await?;
        if output.bits.len() != bits || !output.bits.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(Error::MalformedResponse(format!(
                "simulator returned {:?}, expected {} binary digits",
                output.bits, bits
            )));
        }

        let integer = if bits <= 64 {
            u64::from_str_radix(&output.bits, 2).ok()
        } else {
            None
        };

        Ok(QuantumBits {
            bitstring: output.bits,
            integer,
            backend: output.backend,
        })
    }

    /// Get `count` random bytes
    pub async fn get_random_bytes(&self, count: usize) -> Result<Vec<u8>> {
        check_range("count", count, 1, MAX_BYTES)?;
        let bits = self.generate_random_bits(count * 8).await?;
        Ok(pack_bits(&bits.bitstring))
    }

    /// Launch the simulator and parse the last line it prints
    async fn run(&self, bits: usize) -> Result<SimulatorOutput> {
        let mut command = Command::new(&self.program);
        match &self.script {
            ScriptSource::Embedded => command.arg("-c").arg(CIRCUIT_SCRIPT),
            ScriptSource::File(path) => command.arg(path),
        };
        command
            .arg(bits.to_string())
            .arg(&self.backend)
            .kill_on_drop(true);

        debug!(program = %self.program, bits, backend = %self.backend, "Launching simulator");

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| Error::Transport {
                status: None,
                message: format!("Simulator timed out after {:?}", self.timeout),
            })?
            .map_err(|e| Error::Transport {
                status: None,
                message: format!("Failed to launch simulator '{}': {}", self.program, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Transport {
                status: None,
                message: format!("Simulator exited with {}: {}", output.status, stderr.trim()),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .ok_or_else(|| Error::MalformedResponse("Simulator printed nothing".to_string()))?;

        serde_json::from_str(line.trim())
            .map_err(|e| Error::MalformedResponse(format!("Failed to parse simulator output: {}", e)))
    }
}

impl Default for IbmQuantumWrapper {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomnessProvider for IbmQuantumWrapper {
    fn name(&self) -> &'static str {
        "ibm"
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn supports(&self, kind: RandomKind) -> bool {
        Self::supports_kind(kind)
    }

    async fn produce(&self, request: &RandomRequest) -> Result<RandomResult> {
        let values = match *request {
            RandomRequest::Bytes { count } => RandomValues::Bytes(self.get_random_bytes(count).await?),
            RandomRequest::BitString { bits } => {
                RandomValues::BitString(self.generate_random_bits(bits).await?.bitstring)
            }
            _ => return Err(unsupported(self.name(), request.kind())),
        };

        Ok(RandomResult::now(self.name(), values))
    }
}

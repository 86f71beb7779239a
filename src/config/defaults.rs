//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default backend for `generate`
pub const DEFAULT_BACKEND: &str = "anu";

/// Default output format
pub const DEFAULT_FORMAT: &str = "text";

/// Default HTTP timeout in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default interpreter running the simulator script
pub const DEFAULT_SIMULATOR_PROGRAM: &str = "python3";

/// Default Qiskit simulator backend
pub const DEFAULT_SIMULATOR_BACKEND: &str = "aer_simulator";

/// Default simulator timeout in seconds
pub const DEFAULT_SIMULATOR_TIMEOUT_SECS: u64 = 120;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "ask-the-universe";

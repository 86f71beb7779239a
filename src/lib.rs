//! ask-the-universe: uniform clients for external randomness sources
//!
//! Three backends behind one `RandomnessProvider` contract:
//!
//! - Random.org JSON-RPC (atmospheric noise, API key required)
//! - ANU Quantum RNG (vacuum fluctuations, keyless free tier)
//! - IBM Quantum circuit on a local Qiskit simulator (external process)
//!
//! Each call validates its bounds locally, makes one request, and returns the
//! parsed values or a typed error. There is no retry and no caching.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ask_the_universe::provider::anu::AnuClient;
//! use ask_the_universe::provider::{RandomRequest, RandomnessProvider};
//!
//! # async fn demo() -> ask_the_universe::Result<()> {
//! let client = AnuClient::new()?;
//!
//! // A die roll, without modulo bias
//! let roll = client.get_random_int(1, 6).await?;
//! println!("Rolled {}", roll);
//!
//! // The same client through the backend-neutral contract
//! let result = client.produce(&RandomRequest::Bytes { count: 16 }).await?;
//! println!("{:?}", result.values);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod provider;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use provider::{
    Provider, RandomKind, RandomRequest, RandomResult, RandomValues, RandomnessProvider,
};

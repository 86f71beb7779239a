//! Randomness providers
//!
//! This module defines the `RandomnessProvider` contract and the value types
//! that flow through it. Each backend lives in its own file and implements
//! the trait; `Provider` dispatches over all of them by name.
//!
//! ## Flex Point
//! Adding a new backend requires:
//! 1. Create `src/provider/{backend_name}.rs` implementing `RandomnessProvider`
//! 2. Add a variant to `Provider` and an entry to `available_backends()`

pub mod anu;
pub mod ibm;
pub mod provision;
pub mod random_org;

use crate::config::Config;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

/// Kind of value a request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RandomKind {
    Integer,
    Decimal,
    Bytes,
    Uuid,
    BitString,
}

impl RandomKind {
    pub const ALL: [RandomKind; 5] = [
        RandomKind::Integer,
        RandomKind::Decimal,
        RandomKind::Bytes,
        RandomKind::Uuid,
        RandomKind::BitString,
    ];
}

impl fmt::Display for RandomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RandomKind::Integer => "integer",
            RandomKind::Decimal => "decimal",
            RandomKind::Bytes => "bytes",
            RandomKind::Uuid => "uuid",
            RandomKind::BitString => "bitstring",
        };
        f.write_str(name)
    }
}

/// A backend-neutral request for random values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RandomRequest {
    /// `count` integers in `[min, max]` (inclusive)
    Integers { count: usize, min: i64, max: i64 },
    /// `count` decimal fractions in `[0, 1)` with `places` decimal places
    Decimals { count: usize, places: u8 },
    /// `count` random bytes
    Bytes { count: usize },
    /// `count` version 4 UUIDs
    Uuids { count: usize },
    /// A string of `bits` random binary digits
    BitString { bits: usize },
}

impl RandomRequest {
    /// The kind of value this request asks for
    pub fn kind(&self) -> RandomKind {
        match self {
            RandomRequest::Integers { .. } => RandomKind::Integer,
            RandomRequest::Decimals { .. } => RandomKind::Decimal,
            RandomRequest::Bytes { .. } => RandomKind::Bytes,
            RandomRequest::Uuids { .. } => RandomKind::Uuid,
            RandomRequest::BitString { .. } => RandomKind::BitString,
        }
    }
}

/// Values returned by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum RandomValues {
    Integers(Vec<i64>),
    Decimals(Vec<f64>),
    Bytes(Vec<u8>),
    Uuids(Vec<Uuid>),
    BitString(String),
}

impl RandomValues {
    /// Number of values (bytes, UUIDs, bits, ...) held
    pub fn len(&self) -> usize {
        match self {
            RandomValues::Integers(v) => v.len(),
            RandomValues::Decimals(v) => v.len(),
            RandomValues::Bytes(v) => v.len(),
            RandomValues::Uuids(v) => v.len(),
            RandomValues::BitString(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Usage counters reported by quota-managed services (Random.org)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    pub bits_used: u64,
    pub bits_left: i64,
    pub requests_left: i64,
    /// Advisory delay before the next request, in milliseconds. Not enforced.
    pub advisory_delay_ms: u64,
}

/// Result of a single provider call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomResult {
    /// Backend identifier (e.g. "anu")
    pub backend: String,
    pub values: RandomValues,
    /// Remote completion time when the service reports one, local otherwise
    pub completed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota: Option<Quota>,
}

impl RandomResult {
    /// Result stamped with the local completion time and no quota
    pub fn now(backend: impl Into<String>, values: RandomValues) -> Self {
        Self {
            backend: backend.into(),
            values,
            completed_at: Utc::now(),
            quota: None,
        }
    }
}

/// Capability shared by every randomness backend
///
/// Implementations must be thread-safe (Send + Sync) and hold no per-request
/// state: every `produce` call is independent.
pub trait RandomnessProvider: Send + Sync {
    /// Returns the backend name (e.g., "random_org", "anu", "ibm")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of this backend
    fn description(&self) -> &'static str;

    /// Whether this backend can produce values of `kind`
    fn supports(&self, kind: RandomKind) -> bool;

    /// Produce the requested values
    ///
    /// Fails with `Error::Validation` (without any I/O) when the request is
    /// out of the backend's bounds or of an unsupported kind.
    fn produce(
        &self,
        request: &RandomRequest,
    ) -> impl Future<Output = Result<RandomResult>> + Send;
}

/// Validation error for a kind the backend cannot produce
pub(crate) fn unsupported(backend: &str, kind: RandomKind) -> Error {
    Error::Validation(format!("{} backend does not produce {} values", backend, kind))
}

/// Check `value` lies in `[min, max]`
pub(crate) fn check_range<T>(what: &str, value: T, min: T, max: T) -> Result<()>
where
    T: PartialOrd + fmt::Display,
{
    if value < min || value > max {
        return Err(Error::Validation(format!(
            "{} must be between {} and {} (got {})",
            what, min, max, value
        )));
    }
    Ok(())
}

/// Build the shared HTTP client with the configured timeout
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("ask-the-universe/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Pack bits (MSB first) into bytes. `bits.len()` must be a multiple of 8.
pub(crate) fn pack_bits(bits: &str) -> Vec<u8> {
    bits.as_bytes()
        .chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .fold(0u8, |acc, bit| (acc << 1) | u8::from(*bit == b'1'))
        })
        .collect()
}

/// Unpack bytes to a bitstring (MSB first), truncated to `bits` characters
pub(crate) fn unpack_bits(bytes: &[u8], bits: usize) -> String {
    bytes
        .iter()
        .flat_map(|byte| (0..8u32).rev().map(move |i| if (byte >> i) & 1 == 1 { '1' } else { '0' }))
        .take(bits)
        .collect()
}

/// Backend selected by name
#[derive(Debug)]
pub enum Provider {
    RandomOrg(random_org::RandomOrgClient),
    Anu(anu::AnuClient),
    Ibm(ibm::IbmQuantumWrapper),
}

/// Backend names accepted by `Provider::from_config`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendName {
    RandomOrg,
    Anu,
    Ibm,
}

impl FromStr for BackendName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "random_org" | "randomorg" => Ok(BackendName::RandomOrg),
            "anu" => Ok(BackendName::Anu),
            "ibm" => Ok(BackendName::Ibm),
            _ => Err(Error::Config(format!("Unknown backend: {}", s))),
        }
    }
}

impl Provider {
    /// Build the named backend from configuration
    pub fn from_config(name: &str, config: &Config) -> Result<Self> {
        let timeout = config.http_timeout();

        match name.parse::<BackendName>()? {
            BackendName::RandomOrg => {
                let key = config.random_org_api_key().ok_or_else(|| {
                    Error::Config(format!(
                        "Random.org needs an API key (set {} or api_keys.random_org)",
                        crate::constants::api::RANDOM_ORG_KEY_ENV
                    ))
                })?;
                let client = random_org::RandomOrgClient::with_timeout(key, timeout)?
                    .with_endpoint(&config.endpoints.random_org);
                Ok(Provider::RandomOrg(client))
            }
            BackendName::Anu => {
                let mut client = match config.anu_api_key() {
                    Some(key) => anu::AnuClient::with_api_key(key, timeout)?,
                    None => anu::AnuClient::with_timeout(timeout)?,
                };
                if !config.endpoints.anu.is_empty() {
                    client = client.with_endpoint(&config.endpoints.anu);
                }
                Ok(Provider::Anu(client))
            }
            BackendName::Ibm => Ok(Provider::Ibm(ibm::IbmQuantumWrapper::from_config(
                &config.simulator,
            ))),
        }
    }

    fn inner_name(&self) -> &'static str {
        match self {
            Provider::RandomOrg(p) => p.name(),
            Provider::Anu(p) => p.name(),
            Provider::Ibm(p) => p.name(),
        }
    }
}

impl RandomnessProvider for Provider {
    fn name(&self) -> &'static str {
        self.inner_name()
    }

    fn description(&self) -> &'static str {
        match self {
            Provider::RandomOrg(p) => p.description(),
            Provider::Anu(p) => p.description(),
            Provider::Ibm(p) => p.description(),
        }
    }

    fn supports(&self, kind: RandomKind) -> bool {
        match self {
            Provider::RandomOrg(p) => p.supports(kind),
            Provider::Anu(p) => p.supports(kind),
            Provider::Ibm(p) => p.supports(kind),
        }
    }

    async fn produce(&self, request: &RandomRequest) -> Result<RandomResult> {
        match self {
            Provider::RandomOrg(p) => p.produce(request).await,
            Provider::Anu(p) => p.produce(request).await,
            Provider::Ibm(p) => p.produce(request).await,
        }
    }
}

/// Information about a backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendInfo {
    /// Backend name (used in config/CLI)
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Kinds this backend can produce
    pub kinds: Vec<RandomKind>,
}

/// List all available backends with their info
pub fn available_backends() -> Vec<BackendInfo> {
    let info = |name: &str, description: &str, supports: fn(RandomKind) -> bool| BackendInfo {
        name: name.to_string(),
        description: description.to_string(),
        kinds: RandomKind::ALL.into_iter().filter(|k| supports(*k)).collect(),
    };

    vec![
        info(
            "random_org",
            random_org::DESCRIPTION,
            random_org::RandomOrgClient::supports_kind,
        ),
        info("anu", anu::DESCRIPTION, anu::AnuClient::supports_kind),
        info("ibm", ibm::DESCRIPTION, ibm::IbmQuantumWrapper::supports_kind),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_kind() {
        assert_eq!(
            RandomRequest::Integers { count: 5, min: 1, max: 100 }.kind(),
            RandomKind::Integer
        );
        assert_eq!(RandomRequest::Bytes { count: 4 }.kind(), RandomKind::Bytes);
        assert_eq!(RandomRequest::BitString { bits: 8 }.kind(), RandomKind::BitString);
    }

    #[test]
    fn test_check_range() {
        assert!(check_range("count", 1, 1, 1024).is_ok());
        assert!(check_range("count", 1024, 1, 1024).is_ok());

        let err = check_range("count", 0, 1, 1024).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("between 1 and 1024"));
    }

    #[test]
    fn test_pack_and_unpack_bits() {
        assert_eq!(pack_bits("1000000011111111"), vec![0x80, 0xFF]);
        assert_eq!(unpack_bits(&[0xA5], 8), "10100101");
        assert_eq!(unpack_bits(&[0xA5, 0xFF], 10), "1010010111");
    }

    #[test]
    fn test_backend_name_parsing() {
        assert_eq!("anu".parse::<BackendName>().unwrap(), BackendName::Anu);
        assert_eq!("random-org".parse::<BackendName>().unwrap(), BackendName::RandomOrg);
        assert_eq!("IBM".parse::<BackendName>().unwrap(), BackendName::Ibm);
        assert!("pseudo".parse::<BackendName>().is_err());
    }

    #[test]
    fn test_available_backends() {
        let backends = available_backends();
        assert_eq!(backends.len(), 3);

        let ibm = backends.iter().find(|b| b.name == "ibm").unwrap();
        assert!(ibm.kinds.contains(&RandomKind::BitString));
        assert!(!ibm.kinds.contains(&RandomKind::Decimal));

        let random_org = backends.iter().find(|b| b.name == "random_org").unwrap();
        assert_eq!(random_org.kinds.len(), RandomKind::ALL.len());
    }

    #[test]
    fn test_random_org_requires_key() {
        let mut config = Config::default();
        config.api_keys.random_org = String::new();
        std::env::remove_var(crate::constants::api::RANDOM_ORG_KEY_ENV);

        let err = Provider::from_config("random_org", &config).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_provider_from_config() {
        let config = Config::default();
        let provider = Provider::from_config("anu", &config).unwrap();
        assert_eq!(provider.name(), "anu");

        let provider = Provider::from_config("ibm", &config).unwrap();
        assert_eq!(provider.name(), "ibm");
        assert!(provider.supports(RandomKind::Bytes));
    }

    #[test]
    fn test_result_serialization() {
        let result = RandomResult::now("anu", RandomValues::Bytes(vec![1, 2, 3]));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["backend"], "anu");
        assert_eq!(json["values"]["kind"], "bytes");
        assert_eq!(json["values"]["data"], serde_json::json!([1, 2, 3]));
        assert!(json.get("quota").is_none());
    }
}

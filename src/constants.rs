//! Centralized constants for the ask-the-universe crate
//!
//! Endpoints and the documented request bounds of each backend live here so
//! the clients, the config defaults and the CLI agree on them.

/// External API endpoints
pub mod api {
    /// Random.org JSON-RPC endpoint (Basic API, release 4)
    pub const RANDOM_ORG_URL: &str = "https://api.random.org/json-rpc/4/invoke";

    /// ANU QRNG free tier
    pub const ANU_FREE_URL: &str = "https://qrng.anu.edu.au/API/jsonI.php";

    /// ANU QRNG paid tier (requires API key)
    pub const ANU_PAID_URL: &str = "https://api.quantumnumbers.anu.edu.au";

    /// Environment variable holding the Random.org API key
    pub const RANDOM_ORG_KEY_ENV: &str = "RANDOM_ORG_API_KEY";

    /// Environment variable holding the ANU paid-tier API key
    pub const ANU_KEY_ENV: &str = "ANU_API_KEY";
}

/// Random.org Basic API bounds
pub mod random_org {
    pub const MAX_INTEGERS: usize = 10_000;
    pub const INTEGER_LIMIT: i64 = 1_000_000_000;
    pub const ALLOWED_BASES: [u32; 4] = [2, 8, 10, 16];

    pub const MAX_DECIMALS: usize = 10_000;
    pub const MAX_DECIMAL_PLACES: u8 = 20;

    pub const MAX_BLOBS: usize = 100;
    /// Upper bound for a single blob and for the whole request, in bits
    pub const MAX_BLOB_BITS: u32 = 1_048_576;

    pub const MAX_UUIDS: usize = 1000;
}

/// ANU QRNG bounds
pub mod anu {
    /// Maximum values per request
    pub const MAX_LENGTH: usize = 1024;

    /// Rounds of redraws before rejection sampling gives up
    pub const MAX_REJECTION_ROUNDS: usize = 32;
}

/// Local quantum simulator bounds
pub mod simulator {
    pub const MAX_BITS: usize = 8192;
    pub const MAX_BYTES: usize = MAX_BITS / 8;

    /// Python packages the embedded circuit imports
    pub const REQUIRED_PACKAGES: [&str; 2] = ["qiskit", "qiskit-aer"];
}

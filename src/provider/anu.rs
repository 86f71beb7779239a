//! ANU Quantum Random Number Generator backend
//!
//! Uses the Australian National University's QRNG API to get random numbers
//! measured from quantum fluctuations of the vacuum.
//! API documentation: https://qrng.anu.edu.au/contact/api-documentation/
//!
//! Two tiers:
//! - Free: https://qrng.anu.edu.au/API/jsonI.php (keyless, rate limited)
//! - Paid: https://api.quantumnumbers.anu.edu.au (requires API key)
//!
//! If an API key is provided, the paid endpoint is used automatically.

use crate::constants::anu::{MAX_LENGTH, MAX_REJECTION_ROUNDS};
use crate::constants::api::{ANU_FREE_URL, ANU_PAID_URL};
use crate::error::{Error, Result};
use crate::provider::{
    check_range, http_client, unpack_bits, unsupported, RandomKind, RandomRequest, RandomResult,
    RandomValues, RandomnessProvider,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

pub(crate) const DESCRIPTION: &str =
    "Australian National University Quantum Random Number Generator";

/// ANU QRNG client
#[derive(Debug, Clone)]
pub struct AnuClient {
    api_key: Option<String>,
    endpoint: String,
    client: reqwest::Client,
    reduction: RangeReduction,
}

/// Which API tier is being used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnuTier {
    Free,
    Paid,
}

/// How raw uint8/uint16 draws are mapped onto an integer range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeReduction {
    /// Discard draws at or above the largest multiple of the range that fits
    /// the draw space, then reduce. Unbiased.
    #[default]
    Rejection,
    /// Reduce every draw modulo the range. Biased whenever the range does
    /// not divide 256 (or 65536).
    Modulo,
}

/// Value types the API serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DataType {
    Uint8,
    Uint16,
    Hex16,
}

impl DataType {
    fn as_str(self) -> &'static str {
        match self {
            DataType::Uint8 => "uint8",
            DataType::Uint16 => "uint16",
            DataType::Hex16 => "hex16",
        }
    }
}

/// ANU API response
///
/// Example: `{"success": true, "type": "uint8", "length": 5, "data": [172, 216, 180, 138, 46]}`
#[derive(Debug, Deserialize)]
struct AnuResponse<T> {
    success: bool,
    data: Option<Vec<T>>,
    /// Present on error responses: `{"success": false, "message": "..."}`
    message: Option<String>,
}

impl AnuClient {
    /// Create a free-tier client with the default 30 second timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a free-tier client
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Ok(Self {
            api_key: None,
            endpoint: ANU_FREE_URL.to_string(),
            client: http_client(timeout)?,
            reduction: RangeReduction::default(),
        })
    }

    /// Create a client with an API key. An empty key stays on the free tier.
    pub fn with_api_key(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let api_key = api_key.into();
        let mut client = Self::with_timeout(timeout)?;
        if !api_key.is_empty() {
            client.endpoint = ANU_PAID_URL.to_string();
            client.api_key = Some(api_key);
        }
        Ok(client)
    }

    /// Point the client at a different endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Select how `get_random_int` maps draws onto a range
    pub fn with_reduction(mut self, reduction: RangeReduction) -> Self {
        self.reduction = reduction;
        self
    }

    /// Get which API tier is being used
    pub fn tier(&self) -> AnuTier {
        match &self.api_key {
            Some(key) if !key.is_empty() => AnuTier::Paid,
            _ => AnuTier::Free,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Kinds this backend can produce
    pub fn supports_kind(kind: RandomKind) -> bool {
        !matches!(kind, RandomKind::Decimal)
    }

    /// Generate `count` values in 0..=255
    pub async fn generate_uint8(&self, count: usize) -> Result<Vec<u8>> {
        self.fetch(count, DataType::Uint8).await
    }

    /// Generate `count` values in 0..=65535
    pub async fn generate_uint16(&self, count: usize) -> Result<Vec<u16>> {
        self.fetch(count, DataType::Uint16).await
    }

    /// Generate `count` hex16 strings
    pub async fn generate_hex16(&self, count: usize) -> Result<Vec<String>> {
        self.fetch(count, DataType::Hex16).await
    }

    /// Get a single random byte
    pub async fn get_random_byte(&self) -> Result<u8> {
        self.generate_uint8(1)
            .await?
            .first()
            .copied()
            .ok_or_else(|| Error::MalformedResponse("ANU API returned an empty array".to_string()))
    }

    /// Generate a random integer in `[min, max]` (inclusive)
    pub async fn get_random_int(&self, min: i64, max: i64) -> Result<i64> {
        let values = self.random_ints(1, min, max).await?;
        values
            .first()
            .copied()
            .ok_or_else(|| Error::MalformedResponse("ANU API returned an empty array".to_string()))
    }

    /// Generate `count` random integers in `[min, max]` (inclusive)
    ///
    /// Ranges up to 256 values use uint8 draws, larger ones uint16 draws, so
    /// the range may span at most 65536 values.
    pub async fn random_ints(&self, count: usize, min: i64, max: i64) -> Result<Vec<i64>> {
        check_range("count", count, 1, MAX_LENGTH)?;
        if min >= max {
            return Err(Error::Validation("min must be less than max".to_string()));
        }
        let range = max as i128 - min as i128 + 1;
        if range > 65_536 {
            return Err(Error::Validation(format!(
                "range must span at most 65536 values (got {})",
                range
            )));
        }
        let range = range as u32;

        let wide = range > 256;
        let space: u32 = if wide { 65_536 } else { 256 };
        let limit = match self.reduction {
            RangeReduction::Rejection => space - space % range,
            RangeReduction::Modulo => space,
        };

        let mut values = Vec::with_capacity(count);
        for round in 0..MAX_REJECTION_ROUNDS {
            let needed = count - values.len();
            let draws: Vec<u32> = if wide {
                self.generate_uint16(needed).await?.into_iter().map(u32::from).collect()
            } else {
                self.generate_uint8(needed).await?.into_iter().map(u32::from).collect()
            };

            values.extend(
                draws
                    .into_iter()
                    .filter(|draw| *draw < limit)
                    .map(|draw| min + (draw % range) as i64),
            );

            if values.len() >= count {
                values.truncate(count);
                return Ok(values);
            }
            debug!(round, rejected = count - values.len(), "ANU draws rejected");
        }

        warn!(range, "ANU rejection sampling exhausted");
        Err(Error::Exhausted(format!(
            "no unbiased draw for a range of {} after {} rounds",
            range, MAX_REJECTION_ROUNDS
        )))
    }

    /// Fetch `count` values of `data_type` from the API
    async fn fetch<T: DeserializeOwned>(&self, count: usize, data_type: DataType) -> Result<Vec<T>> {
        check_range("count", count, 1, MAX_LENGTH)?;
        debug!(count, data_type = data_type.as_str(), endpoint = %self.endpoint, "ANU request");

        let mut request = self
            .client
            .get(&self.endpoint)
            .query(&[("length", count.to_string()), ("type", data_type.as_str().to_string())]);

        // Paid endpoint uses header auth
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::from_reqwest("ANU API", e))?;

        if !response.status().is_success() {
            return Err(Error::from_status("ANU API", response.status()));
        }

        let anu_response: AnuResponse<T> = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("Failed to parse ANU response: {}", e)))?;

        if !anu_response.success {
            let msg = anu_response
                .message
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(Error::Api {
                code: None,
                message: msg,
            });
        }

        anu_response
            .data
            .ok_or_else(|| Error::MalformedResponse("ANU API returned no data".to_string()))
    }

    async fn produce_uuids(&self, count: usize) -> Result<Vec<Uuid>> {
        check_range("count", count, 1, MAX_LENGTH / 16)?;
        let bytes = self.generate_uint8(count * 16).await?;
        if bytes.len() != count * 16 {
            return Err(Error::MalformedResponse(format!(
                "expected {} bytes, got {}",
                count * 16,
                bytes.len()
            )));
        }

        Ok(bytes
            .chunks_exact(16)
            .map(|chunk| {
                let mut random = [0u8; 16];
                random.copy_from_slice(chunk);
                uuid::Builder::from_random_bytes(random).into_uuid()
            })
            .collect())
    }

    async fn produce_bits(&self, bits: usize) -> Result<String> {
        check_range("bits", bits, 1, MAX_LENGTH * 8)?;
        let bytes = self.generate_uint8(bits.div_ceil(8)).await?;
        let bitstring = unpack_bits(&bytes, bits);
        if bitstring.len() != bits {
            return Err(Error::MalformedResponse(format!(
                "expected {} bits, got {}",
                bits,
                bitstring.len()
            )));
        }
        Ok(bitstring)
    }
}

impl RandomnessProvider for AnuClient {
    fn name(&self) -> &'static str {
        "anu"
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn supports(&self, kind: RandomKind) -> bool {
        Self::supports_kind(kind)
    }

    async fn produce(&self, request: &RandomRequest) -> Result<RandomResult> {
        let values = match *request {
            RandomRequest::Integers { count, min, max } => {
                RandomValues::Integers(self.random_ints(count, min, max).await?)
            }
            RandomRequest::Bytes { count } => RandomValues::Bytes(self.generate_uint8(count).await?),
            RandomRequest::Uuids { count } => RandomValues::Uuids(self.produce_uuids(count).await?),
            RandomRequest::BitString { bits } => {
                RandomValues::BitString(self.produce_bits(bits).await?)
            }
            RandomRequest::Decimals { .. } => return Err(unsupported(self.name(), request.kind())),
        };

        Ok(RandomResult::now(self.name(), values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    const PATH: &str = "/API/jsonI.php";

    fn client_for(server: &mockito::Server) -> AnuClient {
        AnuClient::new()
            .unwrap()
            .with_endpoint(format!("{}{}", server.url(), PATH))
    }

    fn query(length: usize, data_type: &str) -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("length".into(), length.to_string()),
            Matcher::UrlEncoded("type".into(), data_type.into()),
        ])
    }

    fn body(data: serde_json::Value) -> String {
        json!({"success": true, "type": "uint8", "length": 1, "data": data}).to_string()
    }

    async fn mock_uint8(
        server: &mut mockito::Server,
        length: usize,
        data: serde_json::Value,
    ) -> mockito::Mock {
        server
            .mock("GET", PATH)
            .match_query(query(length, "uint8"))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body(data))
            .create_async()
            .await
    }

    #[test]
    fn test_anu_client_creation() {
        let client = AnuClient::new().unwrap();
        assert_eq!(client.name(), "anu");
        assert!(client.api_key.is_none());
        assert_eq!(client.endpoint(), ANU_FREE_URL);
        assert_eq!(client.reduction, RangeReduction::Rejection);
    }

    #[test]
    fn test_anu_tier_free() {
        let client = AnuClient::new().unwrap();
        assert_eq!(client.tier(), AnuTier::Free);

        // Empty API key should also be free tier
        let client_empty = AnuClient::with_api_key("", Duration::from_secs(5)).unwrap();
        assert_eq!(client_empty.tier(), AnuTier::Free);
        assert_eq!(client_empty.endpoint(), ANU_FREE_URL);
    }

    #[test]
    fn test_anu_tier_paid() {
        let client = AnuClient::with_api_key("my-api-key", Duration::from_secs(5)).unwrap();
        assert_eq!(client.tier(), AnuTier::Paid);
        assert_eq!(client.endpoint(), ANU_PAID_URL);
    }

    #[tokio::test]
    async fn test_count_bounds_checked_before_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let client = client_for(&server);

        assert!(matches!(client.generate_uint8(0).await, Err(Error::Validation(_))));
        assert!(matches!(client.generate_uint8(1025).await, Err(Error::Validation(_))));
        assert!(matches!(client.generate_uint16(0).await, Err(Error::Validation(_))));
        assert!(matches!(client.generate_hex16(2000).await, Err(Error::Validation(_))));
        assert!(matches!(client.get_random_int(5, 5).await, Err(Error::Validation(_))));
        assert!(matches!(
            client.get_random_int(0, 70_000).await,
            Err(Error::Validation(_))
        ));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_uint8_bounds_succeed() {
        let mut server = mockito::Server::new_async().await;
        let one = mock_uint8(&mut server, 1, json!([42])).await;
        let full = mock_uint8(&mut server, 1024, json!(vec![7u8; 1024])).await;
        let client = client_for(&server);

        assert_eq!(client.generate_uint8(1).await.unwrap(), vec![42]);
        assert_eq!(client.generate_uint8(1024).await.unwrap().len(), 1024);

        one.assert_async().await;
        full.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_uint16_and_hex16() {
        let mut server = mockito::Server::new_async().await;
        let _uint16 = server
            .mock("GET", PATH)
            .match_query(query(2, "uint16"))
            .with_status(200)
            .with_body(json!({"success": true, "data": [65535, 1]}).to_string())
            .create_async()
            .await;
        let _hex16 = server
            .mock("GET", PATH)
            .match_query(query(2, "hex16"))
            .with_status(200)
            .with_body(json!({"success": true, "data": ["ab12", "00ff"]}).to_string())
            .create_async()
            .await;
        let client = client_for(&server);

        assert_eq!(client.generate_uint16(2).await.unwrap(), vec![65535, 1]);
        assert_eq!(client.generate_hex16(2).await.unwrap(), vec!["ab12", "00ff"]);
    }

    #[tokio::test]
    async fn test_get_random_int_reduces_draw() {
        let mut server = mockito::Server::new_async().await;
        let _mock = mock_uint8(&mut server, 1, json!([57])).await;

        let client = client_for(&server);
        assert_eq!(client.get_random_int(1, 100).await.unwrap(), 58);

        let client = client.with_reduction(RangeReduction::Modulo);
        assert_eq!(client.get_random_int(1, 100).await.unwrap(), 58);
    }

    #[tokio::test]
    async fn test_get_random_byte() {
        let mut server = mockito::Server::new_async().await;
        let _mock = mock_uint8(&mut server, 1, json!([200])).await;
        assert_eq!(client_for(&server).get_random_byte().await.unwrap(), 200);
    }

    #[tokio::test]
    async fn test_modulo_reduction_keeps_biased_draw() {
        let mut server = mockito::Server::new_async().await;
        let _mock = mock_uint8(&mut server, 1, json!([250])).await;

        let client = client_for(&server).with_reduction(RangeReduction::Modulo);
        assert_eq!(client.get_random_int(1, 100).await.unwrap(), 51);
    }

    #[tokio::test]
    async fn test_rejection_redraws_biased_values() {
        let mut server = mockito::Server::new_async().await;
        // 250 lies above 200, the largest multiple of 100 within 256
        let first = mock_uint8(&mut server, 2, json!([250, 57])).await;
        let second = mock_uint8(&mut server, 1, json!([3])).await;

        let values = client_for(&server).random_ints(2, 1, 100).await.unwrap();
        assert_eq!(values, vec![58, 4]);

        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejection_gives_up_after_max_rounds() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", PATH)
            .match_query(query(1, "uint8"))
            .with_status(200)
            .with_body(body(json!([255])))
            .expect(MAX_REJECTION_ROUNDS)
            .create_async()
            .await;

        let err = client_for(&server).get_random_int(1, 100).await.unwrap_err();
        assert!(matches!(err, Error::Exhausted(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_wide_range_uses_uint16() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", PATH)
            .match_query(query(1, "uint16"))
            .with_status(200)
            .with_body(json!({"success": true, "data": [1234]}).to_string())
            .create_async()
            .await;

        let value = client_for(&server).get_random_int(0, 999).await.unwrap();
        assert_eq!(value, 234);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_500_is_transport_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", PATH)
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let err = client_for(&server).generate_uint8(10).await.unwrap_err();
        assert!(matches!(err, Error::Transport { status: Some(500), .. }));
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_success_false_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"success": false, "message": "The QRNG API is limited to 1 requests per minute"}).to_string())
            .create_async()
            .await;

        match client_for(&server).generate_uint8(10).await.unwrap_err() {
            Error::Api { code, message } => {
                assert_eq!(code, None);
                assert!(message.contains("limited"));
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_paid_tier_sends_api_key_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(query(1, "uint8"))
            .match_header("x-api-key", "secret")
            .with_status(200)
            .with_body(body(json!([9])))
            .create_async()
            .await;

        let client = AnuClient::with_api_key("secret", Duration::from_secs(5))
            .unwrap()
            .with_endpoint(format!("{}/", server.url()));
        assert_eq!(client.generate_uint8(1).await.unwrap(), vec![9]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_produce_uuids_and_bits() {
        let mut server = mockito::Server::new_async().await;
        let _uuid = mock_uint8(&mut server, 16, json!(vec![0xFFu8; 16])).await;
        let _bits = mock_uint8(&mut server, 2, json!([0xA5, 0xFF])).await;
        let client = client_for(&server);

        let result = client.produce(&RandomRequest::Uuids { count: 1 }).await.unwrap();
        match result.values {
            RandomValues::Uuids(uuids) => {
                assert_eq!(uuids.len(), 1);
                assert_eq!(uuids[0].get_version_num(), 4);
            }
            other => panic!("expected UUIDs, got {:?}", other),
        }

        let result = client
            .produce(&RandomRequest::BitString { bits: 10 })
            .await
            .unwrap();
        assert_eq!(result.values, RandomValues::BitString("1010010111".to_string()));
        assert_eq!(result.backend, "anu");
        assert!(result.quota.is_none());
    }

    #[tokio::test]
    async fn test_produce_decimals_unsupported() {
        let client = AnuClient::new().unwrap();
        let err = client
            .produce(&RandomRequest::Decimals { count: 1, places: 4 })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    // Integration tests - these actually call the ANU API
    // They are disabled by default as they require network access
    // and may be rate-limited
    #[tokio::test]
    #[ignore = "Requires network access to ANU API"]
    async fn test_anu_fetch_uint8() {
        let client = AnuClient::new().unwrap();
        let bytes = client.generate_uint8(10).await.unwrap();
        assert_eq!(bytes.len(), 10);
    }

    #[tokio::test]
    #[ignore = "Requires network access to ANU API"]
    async fn test_anu_random_int() {
        let client = AnuClient::new().unwrap();
        let value = client.get_random_int(1, 6).await.unwrap();
        assert!((1..=6).contains(&value));
    }
}

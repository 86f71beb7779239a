//! Random.org backend
//!
//! Uses the JSON-RPC Basic API (release 4) to get true random numbers from
//! atmospheric noise. Every call POSTs a single envelope
//! `{"jsonrpc": "2.0", "method", "params", "id"}` whose params carry the API key.
//! API documentation: https://api.random.org/json-rpc/4/basic
//!
//! The usage counters in each result (bits left, requests left, advisory
//! delay) are reported but never enforced here.

use crate::constants::api::RANDOM_ORG_URL;
use crate::constants::random_org::*;
use crate::error::{Error, Result};
use crate::provider::{
    check_range, http_client, Quota, RandomKind, RandomRequest, RandomResult, RandomValues,
    RandomnessProvider,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

pub(crate) const DESCRIPTION: &str = "Random.org true random numbers from atmospheric noise";

/// Random.org JSON-RPC client
#[derive(Debug, Clone)]
pub struct RandomOrgClient {
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

/// Encoding of generated blobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobFormat {
    #[default]
    Base64,
    Hex,
}

/// Every option the Random.org methods recognize, with its default
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOptions {
    /// Draw with replacement (integers, decimal fractions)
    pub replacement: bool,
    /// Radix the integers are returned in: 2, 8, 10 or 16
    pub base: u32,
    /// Blob size in bits, a multiple of 8
    pub size: u32,
    /// Blob encoding
    pub format: BlobFormat,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            replacement: true,
            base: 10,
            size: 8,
            format: BlobFormat::Base64,
        }
    }
}

#[derive(Serialize)]
struct JsonRpcRequest<'a, P> {
    jsonrpc: &'static str,
    method: &'a str,
    params: P,
    id: String,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IntegerParams<'a> {
    api_key: &'a str,
    n: usize,
    min: i64,
    max: i64,
    replacement: bool,
    base: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DecimalParams<'a> {
    api_key: &'a str,
    n: usize,
    decimal_places: u8,
    replacement: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BlobParams<'a> {
    api_key: &'a str,
    n: usize,
    size: u32,
    format: BlobFormat,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UuidParams<'a> {
    api_key: &'a str,
    n: usize,
}

/// The `result` object of a successful call
///
/// Example:
/// `{"random": {"data": [1, 5], "completionTime": "2011-10-10 13:19:12Z"},
///   "bitsUsed": 16, "bitsLeft": 199984, "requestsLeft": 9999, "advisoryDelay": 0}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomOrgResult<T> {
    pub random: RandomData<T>,
    pub bits_used: u64,
    pub bits_left: i64,
    pub requests_left: i64,
    /// Milliseconds to wait before the next request
    pub advisory_delay: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomData<T> {
    pub data: Vec<T>,
    pub completion_time: String,
}

impl<T> RandomOrgResult<T> {
    pub fn quota(&self) -> Quota {
        Quota {
            bits_used: self.bits_used,
            bits_left: self.bits_left,
            requests_left: self.requests_left,
            advisory_delay_ms: self.advisory_delay,
        }
    }

    /// Parsed completion time, e.g. "2011-10-10 13:19:12Z"
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(&self.random.completion_time, "%Y-%m-%d %H:%M:%S%.fZ")
            .ok()
            .map(|t| t.and_utc())
    }

    fn into_result(self, values: impl FnOnce(Vec<T>) -> Result<RandomValues>) -> Result<RandomResult> {
        let quota = self.quota();
        let completed_at = self.completed_at().unwrap_or_else(Utc::now);
        Ok(RandomResult {
            backend: "random_org".to_string(),
            values: values(self.random.data)?,
            completed_at,
            quota: Some(quota),
        })
    }
}

/// An integer as returned by `generateIntegers`
///
/// Decimal-base requests come back as JSON numbers; other bases as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntegerValue {
    Number(i64),
    Encoded(String),
}

impl IntegerValue {
    /// Numeric value, decoding strings in `base`
    pub fn to_i64(&self, base: u32) -> Result<i64> {
        match self {
            IntegerValue::Number(n) => Ok(*n),
            IntegerValue::Encoded(s) => i64::from_str_radix(s, base).map_err(|_| {
                Error::MalformedResponse(format!("'{}' is not a base {} integer", s, base))
            }),
        }
    }
}

impl RandomOrgClient {
    /// Create a client with the default 30 second timeout
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(api_key, Duration::from_secs(30))
    }

    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            endpoint: RANDOM_ORG_URL.to_string(),
            client: http_client(timeout)?,
        })
    }

    /// Point the client at a different JSON-RPC endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Kinds this backend can produce
    pub fn supports_kind(_kind: RandomKind) -> bool {
        true
    }

    /// Generate `count` integers in `[min, max]`
    pub async fn generate_integers(
        &self,
        count: usize,
        min: i64,
        max: i64,
        options: &RequestOptions,
    ) -> Result<RandomOrgResult<IntegerValue>> {
        check_range("count", count, 1, MAX_INTEGERS)?;
        check_range("min", min, -INTEGER_LIMIT, INTEGER_LIMIT)?;
        check_range("max", max, -INTEGER_LIMIT, INTEGER_LIMIT)?;
        if min > max {
            return Err(Error::Validation(format!(
                "min ({}) must not exceed max ({})",
                min, max
            )));
        }
        if !ALLOWED_BASES.contains(&options.base) {
            return Err(Error::Validation(format!(
                "base must be one of {:?} (got {})",
                ALLOWED_BASES, options.base
            )));
        }
        let span = (max - min + 1) as usize;
        if !options.replacement && count > span {
            return Err(Error::Validation(format!(
                "cannot draw {} distinct integers from a range of {}",
                count, span
            )));
        }

        let params = IntegerParams {
            api_key: &self.api_key,
            n: count,
            min,
            max,
            replacement: options.replacement,
            base: options.base,
        };
        self.call("generateIntegers", params).await
    }

    /// Generate `count` decimal fractions in `[0, 1)`
    pub async fn generate_decimal_fractions(
        &self,
        count: usize,
        decimal_places: u8,
        options: &RequestOptions,
    ) -> Result<RandomOrgResult<f64>> {
        check_range("count", count, 1, MAX_DECIMALS)?;
        check_range("decimal places", decimal_places, 1, MAX_DECIMAL_PLACES)?;

        let params = DecimalParams {
            api_key: &self.api_key,
            n: count,
            decimal_places,
            replacement: options.replacement,
        };
        self.call("generateDecimalFractions", params).await
    }

    /// Generate `count` blobs of `options.size` bits, encoded as `options.format`
    pub async fn generate_blobs(
        &self,
        count: usize,
        options: &RequestOptions,
    ) -> Result<RandomOrgResult<String>> {
        check_range("count", count, 1, MAX_BLOBS)?;
        check_range("blob size", options.size, 1, MAX_BLOB_BITS)?;
        if options.size % 8 != 0 {
            return Err(Error::Validation(format!(
                "blob size must be a multiple of 8 bits (got {})",
                options.size
            )));
        }
        if count as u64 * options.size as u64 > MAX_BLOB_BITS as u64 {
            return Err(Error::Validation(format!(
                "total blob size must not exceed {} bits",
                MAX_BLOB_BITS
            )));
        }

        let params = BlobParams {
            api_key: &self.api_key,
            n: count,
            size: options.size,
            format: options.format,
        };
        self.call("generateBlobs", params).await
    }

    /// Generate `count` version 4 UUIDs
    pub async fn generate_uuids(&self, count: usize) -> Result<RandomOrgResult<Uuid>> {
        check_range("count", count, 1, MAX_UUIDS)?;

        let params = UuidParams {
            api_key: &self.api_key,
            n: count,
        };
        self.call("generateUUIDs", params).await
    }

    /// POST one JSON-RPC envelope and extract its `result`
    async fn call<P, T>(&self, method: &str, params: P) -> Result<RandomOrgResult<T>>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: Uuid::new_v4().to_string(),
        };
        debug!(method, id = %request.id, endpoint = %self.endpoint, "Random.org request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::from_reqwest("Random.org", e))?;

        if !response.status().is_success() {
            return Err(Error::from_status("Random.org", response.status()));
        }

        let body: JsonRpcResponse<RandomOrgResult<T>> = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("Failed to parse Random.org response: {}", e)))?;

        if let Some(error) = body.error {
            return Err(Error::Api {
                code: Some(error.code),
                message: error.message,
            });
        }

        let result = body
            .result
            .ok_or_else(|| Error::MalformedResponse("Random.org returned no result".to_string()))?;

        debug!(
            bits_left = result.bits_left,
            requests_left = result.requests_left,
            advisory_delay_ms = result.advisory_delay,
            "Random.org quota"
        );
        Ok(result)
    }

    async fn produce_bytes(&self, count: usize) -> Result<RandomResult> {
        check_range("count", count, 1, (MAX_BLOB_BITS / 8) as usize)?;
        let options = RequestOptions {
            size: (count * 8) as u32,
            ..RequestOptions::default()
        };

        self.generate_blobs(1, &options).await?.into_result(|blobs| {
            let mut bytes = Vec::with_capacity(count);
            for blob in blobs {
                let decoded = base64::decode(&blob).map_err(|e| {
                    Error::MalformedResponse(format!("Invalid base64 blob: {}", e))
                })?;
                bytes.extend(decoded);
            }
            Ok(RandomValues::Bytes(bytes))
        })
    }
}

impl RandomnessProvider for RandomOrgClient {
    fn name(&self) -> &'static str {
        "random_org"
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn supports(&self, kind: RandomKind) -> bool {
        Self::supports_kind(kind)
    }

    async fn produce(&self, request: &RandomRequest) -> Result<RandomResult> {
        let options = RequestOptions::default();

        match *request {
            RandomRequest::Integers { count, min, max } => self
                .generate_integers(count, min, max, &options)
                .await?
                .into_result(|data| {
                    data.iter()
                        .map(|v| v.to_i64(options.base))
                        .collect::<Result<Vec<_>>>()
                        .map(RandomValues::Integers)
                }),
            RandomRequest::Decimals { count, places } => self
                .generate_decimal_fractions(count, places, &options)
                .await?
                .into_result(|data| Ok(RandomValues::Decimals(data))),
            RandomRequest::Bytes { count } => self.produce_bytes(count).await,
            RandomRequest::Uuids { count } => self
                .generate_uuids(count)
                .await?
                .into_result(|data| Ok(RandomValues::Uuids(data))),
            RandomRequest::BitString { bits } => self
                .generate_integers(bits, 0, 1, &options)
                .await?
                .into_result(|data| {
                    data.iter()
                        .map(|v| match v.to_i64(options.base)? {
                            0 => Ok('0'),
                            1 => Ok('1'),
                            other => Err(Error::MalformedResponse(format!(
                                "expected a bit, got {}",
                                other
                            ))),
                        })
                        .collect::<Result<String>>()
                        .map(RandomValues::BitString)
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    const PATH: &str = "/json-rpc/4/invoke";

    fn client_for(server: &mockito::Server) -> RandomOrgClient {
        RandomOrgClient::new("test-key")
            .unwrap()
            .with_endpoint(format!("{}{}", server.url(), PATH))
    }

    fn success_body(data: serde_json::Value) -> String {
        json!({
            "jsonrpc": "2.0",
            "result": {
                "random": {"data": data, "completionTime": "2011-10-10 13:19:12Z"},
                "bitsUsed": 33,
                "bitsLeft": 199967,
                "requestsLeft": 999,
                "advisoryDelay": 1000
            },
            "id": "1"
        })
        .to_string()
    }

    #[test]
    fn test_default_options() {
        let options = RequestOptions::default();
        assert!(options.replacement);
        assert_eq!(options.base, 10);
        assert_eq!(options.size, 8);
        assert_eq!(options.format, BlobFormat::Base64);
    }

    #[test]
    fn test_integer_value_decoding() {
        assert_eq!(IntegerValue::Number(42).to_i64(10).unwrap(), 42);
        assert_eq!(IntegerValue::Encoded("ff".to_string()).to_i64(16).unwrap(), 255);
        assert_eq!(IntegerValue::Encoded("101".to_string()).to_i64(2).unwrap(), 5);
        assert!(IntegerValue::Encoded("zz".to_string()).to_i64(16).is_err());
    }

    #[test]
    fn test_completion_time_parsing() {
        let body: serde_json::Value = serde_json::from_str(&success_body(json!([1]))).unwrap();
        let result: RandomOrgResult<i64> = serde_json::from_value(body["result"].clone()).unwrap();

        let completed = result.completed_at().unwrap();
        assert_eq!(completed.to_rfc3339(), "2011-10-10T13:19:12+00:00");
        assert_eq!(result.quota().advisory_delay_ms, 1000);
    }

    #[tokio::test]
    async fn test_generate_integers_defaults_replacement() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_body(Matcher::PartialJson(json!({
                "jsonrpc": "2.0",
                "method": "generateIntegers",
                "params": {
                    "apiKey": "test-key",
                    "n": 5,
                    "min": 1,
                    "max": 100,
                    "replacement": true,
                    "base": 10
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(success_body(json!([1, 5, 4, 6, 6])))
            .create_async()
            .await;

        let client = client_for(&server);
        let result = client
            .generate_integers(5, 1, 100, &RequestOptions::default())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result.random.data.len(), 5);
        assert_eq!(result.random.data[0], IntegerValue::Number(1));
        assert_eq!(result.bits_left, 199967);
        assert_eq!(result.requests_left, 999);
    }

    #[tokio::test]
    async fn test_rpc_error_surfaces_as_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "error": {
                        "code": 401,
                        "message": "The API key you specified does not exist",
                        "data": null
                    },
                    "id": "1"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let err = client_for(&server).generate_uuids(1).await.unwrap_err();
        match err {
            Error::Api { code, message } => {
                assert_eq!(code, Some(401));
                assert_eq!(message, "The API key you specified does not exist");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_500_is_transport_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(500)
            .create_async()
            .await;

        let err = client_for(&server)
            .generate_decimal_fractions(3, 4, &RequestOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport { status: Some(500), .. }));
    }

    #[tokio::test]
    async fn test_out_of_bounds_never_hits_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let client = client_for(&server);
        let options = RequestOptions::default();

        assert!(matches!(
            client.generate_integers(0, 1, 10, &options).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            client.generate_integers(10_001, 1, 10, &options).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            client.generate_integers(5, 10, 1, &options).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            client
                .generate_integers(5, 1, 10, &RequestOptions { base: 7, ..options })
                .await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            client
                .generate_integers(11, 1, 10, &RequestOptions { replacement: false, ..options })
                .await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            client.generate_decimal_fractions(5, 21, &options).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            client
                .generate_blobs(1, &RequestOptions { size: 12, ..options })
                .await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            client.generate_uuids(1001).await,
            Err(Error::Validation(_))
        ));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_produce_bytes_decodes_blob() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .match_body(Matcher::PartialJson(json!({
                "method": "generateBlobs",
                "params": {"n": 1, "size": 32, "format": "base64"}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(success_body(json!(["AQIDBA=="])))
            .create_async()
            .await;

        let result = client_for(&server)
            .produce(&RandomRequest::Bytes { count: 4 })
            .await
            .unwrap();

        assert_eq!(result.backend, "random_org");
        assert_eq!(result.values, RandomValues::Bytes(vec![1, 2, 3, 4]));
        assert_eq!(result.quota.unwrap().bits_used, 33);
    }

    #[tokio::test]
    async fn test_produce_bitstring_from_integers() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .match_body(Matcher::PartialJson(json!({
                "method": "generateIntegers",
                "params": {"n": 4, "min": 0, "max": 1}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(success_body(json!([1, 0, 1, 1])))
            .create_async()
            .await;

        let result = client_for(&server)
            .produce(&RandomRequest::BitString { bits: 4 })
            .await
            .unwrap();
        assert_eq!(result.values, RandomValues::BitString("1011".to_string()));
    }

    #[tokio::test]
    #[ignore = "Requires network access and RANDOM_ORG_API_KEY"]
    async fn test_live_generate_integers() {
        let key = std::env::var("RANDOM_ORG_API_KEY").unwrap();
        let client = RandomOrgClient::new(key).unwrap();
        let result = client
            .generate_integers(5, 1, 100, &RequestOptions::default())
            .await
            .unwrap();
        assert_eq!(result.random.data.len(), 5);
    }
}

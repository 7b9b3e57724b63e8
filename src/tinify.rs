//! TinyPNG (Tinify) HTTP backend.
//!
//! The client is async (reqwest on tokio) and is driven from the synchronous
//! pipeline through a private current-thread runtime.

use crate::constants::{
    COMPRESSION_COUNT_HEADER, DEFAULT_REQUEST_TIMEOUT_SECS, TINIFY_API_ENDPOINT,
    TINIFY_AUTH_USER, TINIFY_SHRINK_PATH, USER_AGENT,
};
use crate::error::{Result, ServiceError, ServiceErrorCategory, SqueezeError};
use crate::service::CompressionService;
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::sync::Mutex;
use std::time::Duration;
use tokio::runtime::Runtime;

#[derive(Debug, Clone)]
pub struct TinifyOptions {
    pub api_key: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl TinifyOptions {
    pub fn new(api_key: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: TINIFY_API_ENDPOINT.to_string(),
            timeout: timeout.unwrap_or(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
        }
    }

    fn shrink_url(&self) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), TINIFY_SHRINK_PATH)
    }
}

#[derive(Debug, Deserialize)]
struct ShrinkResponse {
    output: ShrinkOutput,
}

#[derive(Debug, Deserialize)]
struct ShrinkOutput {
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub struct TinifyClient {
    options: TinifyOptions,
    client: Client,
    runtime: Runtime,
    compression_count: Mutex<Option<u64>>,
}

impl TinifyClient {
    pub fn new(options: TinifyOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(options.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SqueezeError::HttpClient(e.to_string()))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SqueezeError::HttpClient(format!("Failed to create runtime: {}", e)))?;

        Ok(Self {
            options,
            client,
            runtime,
            compression_count: Mutex::new(None),
        })
    }

    /// Posts an empty shrink request. The service answers "input missing"
    /// for a good key and 401 for a bad one.
    pub async fn validate_async(&self) -> std::result::Result<(), ServiceError> {
        let response = self
            .client
            .post(self.options.shrink_url())
            .basic_auth(TINIFY_AUTH_USER, Some(&self.options.api_key))
            .send()
            .await
            .map_err(transport_error)?;

        self.remember_count(response.headers());
        let status = response.status();

        if status.is_success() || is_valid_key_status(status) {
            return Ok(());
        }
        Err(error_from_response(response).await)
    }

    /// Uploads `bytes` and downloads the compressed result.
    pub async fn shrink_async(&self, bytes: &[u8]) -> std::result::Result<Vec<u8>, ServiceError> {
        let response = self
            .client
            .post(self.options.shrink_url())
            .basic_auth(TINIFY_AUTH_USER, Some(&self.options.api_key))
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(transport_error)?;

        self.remember_count(response.headers());
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body: ShrinkResponse = response.json().await.map_err(|e| {
            ServiceError::new(
                ServiceErrorCategory::Other,
                format!("Unexpected shrink response: {}", e),
            )
        })?;

        let output_url = body.output.url.or(location).ok_or_else(|| {
            ServiceError::new(
                ServiceErrorCategory::Other,
                "Shrink response did not include an output location",
            )
        })?;

        let download = self
            .client
            .get(&output_url)
            .basic_auth(TINIFY_AUTH_USER, Some(&self.options.api_key))
            .send()
            .await
            .map_err(transport_error)?;

        self.remember_count(download.headers());
        if !download.status().is_success() {
            return Err(error_from_response(download).await);
        }

        let compressed = download.bytes().await.map_err(transport_error)?;
        if let Some(expected) = body.output.size {
            if expected != compressed.len() as u64 {
                return Err(ServiceError::new(
                    ServiceErrorCategory::Connection,
                    format!(
                        "Truncated download: expected {} bytes, got {}",
                        expected,
                        compressed.len()
                    ),
                ));
            }
        }

        Ok(compressed.to_vec())
    }

    fn remember_count(&self, headers: &HeaderMap) {
        if let Some(count) = parse_compression_count(headers) {
            if let Ok(mut cached) = self.compression_count.lock() {
                *cached = Some(count);
            }
        }
    }
}

impl CompressionService for TinifyClient {
    fn validate_credential(&self) -> std::result::Result<(), ServiceError> {
        self.runtime.block_on(self.validate_async())
    }

    fn current_usage_count(&self) -> std::result::Result<u64, ServiceError> {
        let cached = self
            .compression_count
            .lock()
            .map_err(|_| ServiceError::new(ServiceErrorCategory::Other, "usage counter poisoned"))?;
        Ok(cached.unwrap_or(0))
    }

    fn compress_file(&self, bytes: &[u8]) -> std::result::Result<Vec<u8>, ServiceError> {
        self.runtime.block_on(self.shrink_async(bytes))
    }
}

/// Statuses that still prove the key is good during validation.
fn is_valid_key_status(status: StatusCode) -> bool {
    status == StatusCode::BAD_REQUEST || status == StatusCode::TOO_MANY_REQUESTS
}

pub fn categorize_status(status: StatusCode) -> ServiceErrorCategory {
    match status.as_u16() {
        401 | 429 => ServiceErrorCategory::Account,
        400..=499 => ServiceErrorCategory::Client,
        500..=599 => ServiceErrorCategory::Server,
        _ => ServiceErrorCategory::Other,
    }
}

fn parse_compression_count(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(COMPRESSION_COUNT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn transport_error(err: reqwest::Error) -> ServiceError {
    let message = if err.is_timeout() {
        format!("Request timed out: {}", err)
    } else {
        format!("Error while connecting: {}", err)
    };
    ServiceError::new(ServiceErrorCategory::Connection, message)
}

async fn error_from_response(response: Response) -> ServiceError {
    let status = response.status();
    let category = categorize_status(status);
    let text = response.text().await.unwrap_or_default();
    ServiceError::new(category, describe_error_body(status, &text))
}

fn describe_error_body(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            error: Some(error),
            message: Some(message),
        }) => format!("{} (HTTP {}/{})", message, status.as_u16(), error),
        Ok(ErrorBody {
            message: Some(message),
            ..
        }) => format!("{} (HTTP {})", message, status.as_u16()),
        _ => format!("Error while parsing response (HTTP {})", status.as_u16()),
    }
}

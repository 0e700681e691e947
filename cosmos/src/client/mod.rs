//! Clients for the chain node's query interfaces.
//!
//! - [`CosmosClient`] talks to the Cosmos REST gateway (the JSON rendering of
//!   the gRPC query services: bank, staking, distribution, mint, slashing).
//! - [`TendermintClient`] talks to the Tendermint / CometBFT RPC for node
//!   status and peer information.
//!
//! Both are created once at startup and cloned into request tasks; the
//! underlying `reqwest::Client` pools connections.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub mod cosmos;
pub mod tendermint;

pub use cosmos::CosmosClient;
pub use tendermint::TendermintClient;

/// Errors returned by any outbound query.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    /// A configured base URL is not usable.
    #[error("invalid endpoint {0:?}")]
    Endpoint(String),
    /// Transport-level failure (connect, TLS, timeout).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The backend answered with a non-success status.
    #[error("{url} returned HTTP status {status}")]
    Status { url: String, status: StatusCode },
    /// The body did not match the expected schema.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// A JSON-RPC backend returned an error object.
    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    /// A numeric field could not be parsed.
    #[error("malformed amount {0:?}")]
    Amount(String),
    /// The response was well-formed but unusable.
    #[error("{0}")]
    Protocol(String),
}

/// Builds the shared HTTP client used by every backend client.
pub(crate) fn http_client() -> Result<reqwest::Client, ClientError> {
    reqwest::Client::builder()
        .user_agent(concat!("cosmos-exporter/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(ClientError::Build)
}

/// Validates a base URL and strips any trailing slash.
pub(crate) fn base_url(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim().trim_end_matches('/');
    match reqwest::Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(trimmed.to_string()),
        _ => Err(ClientError::Endpoint(raw.to_string())),
    }
}

/// Joins `base` and `path` without doubling slashes.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base, path.trim_start_matches('/'))
}

/// Issues a GET and decodes a JSON body.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: String,
    query: &[(&str, String)],
) -> Result<T, ClientError> {
    let resp = http
        .get(&url)
        .query(query)
        .send()
        .await
        .map_err(|source| ClientError::Transport {
            url: url.clone(),
            source,
        })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(ClientError::Status { url, status });
    }

    resp.json::<T>()
        .await
        .map_err(|source| ClientError::Decode { url, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_strips_trailing_slash() {
        assert_eq!(
            base_url("http://localhost:1317/").expect("valid url"),
            "http://localhost:1317"
        );
        assert_eq!(
            endpoint("http://localhost:1317", "/cosmos/bank/v1beta1/supply"),
            "http://localhost:1317/cosmos/bank/v1beta1/supply"
        );
    }

    #[test]
    fn base_url_rejects_non_http_schemes() {
        assert!(base_url("localhost:9090").is_err());
        assert!(base_url("tcp://localhost:26657").is_err());
        assert!(base_url("").is_err());
    }
}

//! Ethereum JSON-RPC client for the bridge side of the gravity endpoint.
//!
//! Only two calls are needed: `eth_getBalance` for native balances and
//! `eth_call` against an ERC-20 `balanceOf(address)` for token balances.
//! One client is built at startup and shared by every request.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::address::EthAddress;
use crate::client::{ClientError, base_url, http_client};

/// Function selector of `balanceOf(address)`.
const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

#[derive(Clone, Debug)]
pub struct EthereumClient {
    http: reqwest::Client,
    url: String,
    next_id: Arc<AtomicU64>,
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl EthereumClient {
    pub fn new(url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: http_client()?,
            url: base_url(url)?,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Native coin balance of `address` at the latest block, in wei.
    pub async fn native_balance(&self, address: &EthAddress) -> Result<BigUint, ClientError> {
        let result = self
            .call("eth_getBalance", json!([address.to_string(), "latest"]))
            .await?;
        parse_quantity(&result)
    }

    /// ERC-20 balance of `holder` in `token`, in the token's base unit.
    pub async fn token_balance(
        &self,
        token: &EthAddress,
        holder: &EthAddress,
    ) -> Result<BigUint, ClientError> {
        let call = json!({
            "to": token.to_string(),
            "data": balance_of_calldata(holder),
        });
        let result = self.call("eth_call", json!([call, "latest"])).await?;
        parse_word(&result)
    }

    async fn call(&self, method: &str, params: Value) -> Result<String, ClientError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let resp = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: self.url.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                url: self.url.clone(),
                status,
            });
        }

        let body: RpcResponse = resp.json().await.map_err(|source| ClientError::Decode {
            url: self.url.clone(),
            source,
        })?;

        if let Some(err) = body.error {
            return Err(ClientError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        body.result
            .ok_or_else(|| ClientError::Protocol(format!("{method} returned no result")))
    }
}

/// ABI-encodes `balanceOf(holder)`.
fn balance_of_calldata(holder: &EthAddress) -> String {
    let mut data = Vec::with_capacity(4 + 32);
    data.extend_from_slice(&BALANCE_OF_SELECTOR);
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(holder.as_bytes());
    format!("0x{}", hex::encode(data))
}

/// Parses a JSON-RPC quantity such as `"0x1bc16d674ec80000"`.
fn parse_quantity(raw: &str) -> Result<BigUint, ClientError> {
    let digits = strip_hex_prefix(raw)?;
    if digits.is_empty() {
        return Err(ClientError::Amount(raw.to_string()));
    }
    BigUint::parse_bytes(digits.as_bytes(), 16).ok_or_else(|| ClientError::Amount(raw.to_string()))
}

/// Parses the 32-byte return word of a `uint256` call.
///
/// An empty result means the target has no code, which is reported as an
/// error rather than a zero balance.
fn parse_word(raw: &str) -> Result<BigUint, ClientError> {
    let digits = strip_hex_prefix(raw)?;
    if digits.is_empty() {
        return Err(ClientError::Protocol(
            "eth_call returned no data; is the token contract deployed?".to_string(),
        ));
    }
    BigUint::parse_bytes(digits.as_bytes(), 16).ok_or_else(|| ClientError::Amount(raw.to_string()))
}

fn strip_hex_prefix(raw: &str) -> Result<&str, ClientError> {
    raw.strip_prefix("0x")
        .ok_or_else(|| ClientError::Amount(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn holder() -> EthAddress {
        "0x52908400098527886e0f7030069857d2e4169ee7"
            .parse()
            .expect("valid address")
    }

    #[test]
    fn balance_of_calldata_is_selector_plus_padded_address() {
        let data = balance_of_calldata(&holder());
        assert_eq!(
            data,
            "0x70a08231\
             00000000000000000000000052908400098527886e0f7030069857d2e4169ee7"
        );
    }

    #[test]
    fn quantities_and_words_decode_as_big_integers() {
        assert_eq!(
            parse_quantity("0xde0b6b3a7640000").expect("1 ether"),
            BigUint::from(1_000_000_000_000_000_000u64)
        );
        assert_eq!(parse_quantity("0x0").expect("zero"), BigUint::default());
        assert!(parse_quantity("0x").is_err());
        assert!(parse_quantity("123").is_err());
        assert!(matches!(parse_word("0x"), Err(ClientError::Protocol(_))));
    }

    #[tokio::test]
    async fn native_balance_posts_get_balance() {
        let server = MockServer::start_async().await;
        let rpc = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/")
                    .body_contains("eth_getBalance")
                    .body_contains("0x52908400098527886e0f7030069857d2e4169ee7");
                then.status(200)
                    .json_body(serde_json::json!({ "jsonrpc": "2.0", "id": 1, "result": "0x2a" }));
            })
            .await;

        let client = EthereumClient::new(&server.base_url()).expect("client");
        let balance = client.native_balance(&holder()).await.expect("balance");

        rpc.assert_async().await;
        assert_eq!(balance, BigUint::from(42u32));
    }

    #[tokio::test]
    async fn rpc_error_object_is_surfaced() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/");
                then.status(200).json_body(serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "error": { "code": -32000, "message": "execution reverted" }
                }));
            })
            .await;

        let client = EthereumClient::new(&server.base_url()).expect("client");
        let err = client
            .token_balance(&holder(), &holder())
            .await
            .expect_err("revert should fail");

        assert!(matches!(err, ClientError::Rpc { code: -32000, .. }));
    }
}

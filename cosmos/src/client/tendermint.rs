//! Tendermint / CometBFT RPC client.

use super::{ClientError, endpoint, get_json, http_client};
use crate::types::tendermint::RpcEnvelope;
use crate::types::{NetInfo, NodeStatus};

#[derive(Clone, Debug)]
pub struct TendermintClient {
    http: reqwest::Client,
    base_url: String,
}

impl TendermintClient {
    /// Creates a client for the RPC listener at `base_url`, e.g.
    /// `"http://localhost:26657"`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: http_client()?,
            base_url: super::base_url(base_url)?,
        })
    }

    /// `GET /status`: node identity, sync state and own voting power.
    pub async fn status(&self) -> Result<NodeStatus, ClientError> {
        let resp: RpcEnvelope<NodeStatus> =
            get_json(&self.http, endpoint(&self.base_url, "/status"), &[]).await?;
        Ok(resp.result)
    }

    /// `GET /net_info`: peer connectivity.
    pub async fn net_info(&self) -> Result<NetInfo, ClientError> {
        let resp: RpcEnvelope<NetInfo> =
            get_json(&self.http, endpoint(&self.base_url, "/net_info"), &[]).await?;
        Ok(resp.result)
    }
}

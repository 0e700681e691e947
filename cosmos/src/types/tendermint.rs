//! Tendermint / CometBFT RPC responses (`/status`, `/net_info`).

use chrono::DateTime;
use serde::Deserialize;

use super::parse_dec;
use crate::client::ClientError;

/// JSON-RPC envelope used by the Tendermint HTTP endpoints.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct RpcEnvelope<T> {
    pub result: T,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NodeStatus {
    pub node_info: NodeInfo,
    pub sync_info: SyncInfo,
    pub validator_info: ValidatorInfo,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NodeInfo {
    /// Chain id of the network the node is connected to.
    pub network: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub moniker: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SyncInfo {
    pub latest_block_height: String,
    pub latest_block_time: String,
    #[serde(default)]
    pub catching_up: bool,
}

impl SyncInfo {
    pub fn latest_block_height(&self) -> Result<f64, ClientError> {
        parse_dec(&self.latest_block_height)
    }

    /// Latest block time as fractional unix seconds.
    pub fn latest_block_timestamp(&self) -> Result<f64, ClientError> {
        let time = DateTime::parse_from_rfc3339(&self.latest_block_time)
            .map_err(|_| ClientError::Amount(self.latest_block_time.clone()))?;
        Ok(time.timestamp() as f64 + f64::from(time.timestamp_subsec_nanos()) / 1e9)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ValidatorInfo {
    #[serde(default)]
    pub address: String,
    pub voting_power: String,
}

impl ValidatorInfo {
    pub fn voting_power(&self) -> Result<f64, ClientError> {
        parse_dec(&self.voting_power)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct NetInfo {
    #[serde(default)]
    pub listening: bool,
    pub n_peers: String,
}

impl NetInfo {
    pub fn peers(&self) -> Result<f64, ClientError> {
        parse_dec(&self.n_peers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_and_converts_block_time() {
        let json = r#"{
            "jsonrpc": "2.0",
            "id": -1,
            "result": {
                "node_info": { "network": "cosmoshub-4", "version": "0.37.2", "moniker": "sentry-0" },
                "sync_info": {
                    "latest_block_height": "19000000",
                    "latest_block_time": "2024-01-01T00:00:01.500000000Z",
                    "catching_up": false
                },
                "validator_info": { "address": "ABCD", "voting_power": "0" }
            }
        }"#;

        let status: RpcEnvelope<NodeStatus> = serde_json::from_str(json).expect("status should parse");
        let sync = &status.result.sync_info;
        assert_eq!(status.result.node_info.network, "cosmoshub-4");
        assert_eq!(sync.latest_block_height().expect("height"), 19_000_000.0);
        assert_eq!(sync.latest_block_timestamp().expect("time"), 1_704_067_201.5);
    }
}

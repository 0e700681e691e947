//! `GET /metrics/status`: node sync state and peers from the Tendermint RPC.

use axum::{extract::State, response::Response};

use cosmos::{GaugeVec, MetricsError, Scrape, ScrapeRegistry};

use super::{flag, record, registration_failed, render};
use crate::state::SharedState;

struct StatusMetrics {
    latest_block_height: GaugeVec,
    latest_block_time: GaugeVec,
    catching_up: GaugeVec,
    voting_power: GaugeVec,
    peers: GaugeVec,
}

impl StatusMetrics {
    fn register(registry: &ScrapeRegistry) -> Result<Self, MetricsError> {
        let node = &["chain_id", "moniker"];
        Ok(Self {
            latest_block_height: registry.gauge_vec(
                "cosmos_status_latest_block_height",
                "Height of the latest block known to the node",
                node,
            )?,
            latest_block_time: registry.gauge_vec(
                "cosmos_status_latest_block_time",
                "Time of the latest block, as unix seconds",
                node,
            )?,
            catching_up: registry.gauge_vec(
                "cosmos_status_catching_up",
                "1 if the node is catching up, 0 if not",
                node,
            )?,
            voting_power: registry.gauge_vec(
                "cosmos_status_voting_power",
                "Voting power of the node's validator key",
                node,
            )?,
            peers: registry.gauge_vec(
                "cosmos_status_peers",
                "Number of connected peers",
                &["chain_id"],
            )?,
        })
    }
}

pub async fn status_metrics(State(state): State<SharedState>) -> Response {
    let mut scrape = Scrape::begin("/metrics/status", &state.settings.const_labels);
    let StatusMetrics {
        latest_block_height,
        latest_block_time,
        catching_up,
        voting_power,
        peers,
    } = match StatusMetrics::register(scrape.registry()) {
        Ok(metrics) => metrics,
        Err(err) => return registration_failed(&scrape, err),
    };

    let tendermint = state.backends.tendermint.clone();
    let chain_id = state.chain.chain_id.clone();
    scrape.spawn(
        "node status",
        async move { tendermint.status().await },
        move |status| {
            let labels = [chain_id.as_str(), status.node_info.moniker.as_str()];
            let sync = &status.sync_info;

            record(sync.latest_block_height(), |v| {
                latest_block_height.with_label_values(&labels).set(v)
            });
            record(sync.latest_block_timestamp(), |v| {
                latest_block_time.with_label_values(&labels).set(v)
            });
            catching_up
                .with_label_values(&labels)
                .set(flag(sync.catching_up));
            record(status.validator_info.voting_power(), |v| {
                voting_power.with_label_values(&labels).set(v)
            });
        },
    );

    let tendermint = state.backends.tendermint.clone();
    let chain_id = state.chain.chain_id.clone();
    scrape.spawn(
        "net info",
        async move { tendermint.net_info().await },
        move |info| {
            record(info.peers(), |v| {
                peers.with_label_values(&[chain_id.as_str()]).set(v)
            })
        },
    );

    render(scrape).await
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use crate::routes::testing::*;

    #[tokio::test]
    async fn node_status_is_labelled_with_chain_id() {
        let rpc = MockServer::start_async().await;
        rpc.mock_async(|when, then| {
            when.method(GET).path("/status");
            then.status(200).json_body(json!({
                "jsonrpc": "2.0",
                "id": -1,
                "result": {
                    "node_info": { "network": "cosmoshub-4", "version": "0.37.2", "moniker": "sentry-1" },
                    "sync_info": {
                        "latest_block_height": "19000000",
                        "latest_block_time": "2024-01-01T00:00:10Z",
                        "catching_up": true
                    },
                    "validator_info": { "address": "ABCD", "voting_power": "0" }
                }
            }));
        })
        .await;
        rpc.mock_async(|when, then| {
            when.method(GET).path("/net_info");
            then.status(200).json_body(json!({
                "jsonrpc": "2.0",
                "id": -1,
                "result": { "listening": true, "listeners": [], "n_peers": "42", "peers": [] }
            }));
        })
        .await;

        let state = state(TestBackends {
            tendermint: Some(rpc.base_url()),
            ..TestBackends::default()
        })
        .await;
        let addr = serve(state).await;

        let (_, body) = get(addr, "/metrics/status").await;

        assert!(body.contains(
            r#"cosmos_status_latest_block_height{chain_id="cosmoshub-4",moniker="sentry-1"} 19000000"#
        ));
        assert!(body.contains(
            r#"cosmos_status_latest_block_time{chain_id="cosmoshub-4",moniker="sentry-1"} 1704067210"#
        ));
        assert!(body.contains(
            r#"cosmos_status_catching_up{chain_id="cosmoshub-4",moniker="sentry-1"} 1"#
        ));
        assert!(body.contains(r#"cosmos_status_peers{chain_id="cosmoshub-4"} 42"#));
    }
}

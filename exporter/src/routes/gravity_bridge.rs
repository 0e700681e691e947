//! `GET /metrics/gravity-bridge`: balances on both sides of the bridge.
//!
//! Query parameters:
//!
//! - `cudos_orchestrator_address`: the orchestrator's account on the chain,
//! - `ethereum_orchestrator_address`: its Ethereum counterpart.

use axum::{
    extract::{Query, State},
    response::Response,
};
use serde::Deserialize;
use tracing::{debug, warn};

use cosmos::address::validate_bech32;
use cosmos::{AddressError, EthAddress, GaugeVec, MetricsError, ScalarGauge, Scrape, ScrapeRegistry};

use super::{record, registration_failed, reject, render};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct GravityQuery {
    pub cudos_orchestrator_address: Option<String>,
    pub ethereum_orchestrator_address: Option<String>,
}

struct GravityMetrics {
    cudos_orchestrator_balance: GaugeVec,
    ethereum_orchestrator_balance: GaugeVec,
    ethereum_orchestrator_erc20_balance: GaugeVec,
    ethereum_contract_balance: ScalarGauge,
}

impl GravityMetrics {
    fn register(registry: &ScrapeRegistry) -> Result<Self, MetricsError> {
        let orchestrator = &["cudos_orchestrator_address", "ethereum_orchestrator_address"];
        Ok(Self {
            cudos_orchestrator_balance: registry.gauge_vec(
                "gravity_cudos_orchestrator_balance",
                "Balance of the cudos orchestrator wallet",
                orchestrator,
            )?,
            ethereum_orchestrator_balance: registry.gauge_vec(
                "gravity_ethereum_orchestrator_balance",
                "Balance of the ethereum orchestrator wallet",
                orchestrator,
            )?,
            ethereum_orchestrator_erc20_balance: registry.gauge_vec(
                "gravity_ethereum_orchestrator_erc20_balance",
                "ERC20 balance of the ethereum orchestrator wallet",
                orchestrator,
            )?,
            ethereum_contract_balance: registry.gauge(
                "gravity_ethereum_contract_balance",
                "Balance of the ethereum gravity contract",
            )?,
        })
    }
}

pub async fn gravity_bridge_metrics(
    State(state): State<SharedState>,
    Query(query): Query<GravityQuery>,
) -> Response {
    let mut scrape = Scrape::begin("/metrics/gravity-bridge", &state.settings.const_labels);

    let cudos_address = match query
        .cudos_orchestrator_address
        .ok_or(AddressError::Missing)
        .and_then(|raw| validate_bech32(&raw, &state.prefixes.account))
    {
        Ok(address) => address,
        Err(err) => return reject(&scrape, err),
    };
    let eth_address: EthAddress = match query
        .ethereum_orchestrator_address
        .ok_or(AddressError::Missing)
        .and_then(|raw| raw.parse())
    {
        Ok(address) => address,
        Err(err) => return reject(&scrape, err),
    };

    let GravityMetrics {
        cudos_orchestrator_balance,
        ethereum_orchestrator_balance,
        ethereum_orchestrator_erc20_balance,
        ethereum_contract_balance,
    } = match GravityMetrics::register(scrape.registry()) {
        Ok(metrics) => metrics,
        Err(err) => return registration_failed(&scrape, err),
    };

    let labels = (cudos_address.clone(), eth_address.to_string());
    let denom = state.chain.denomination.clone();

    // Only the base denom counts; without it the series stays absent.
    {
        let cosmos = state.backends.cosmos.clone();
        let (labels, denom) = (labels.clone(), denom.clone());
        scrape.spawn(
            "orchestrator balance",
            async move { cosmos.all_balances(&cudos_address).await },
            move |resp| match resp.balances.iter().find(|coin| coin.denom == denom.base) {
                Some(coin) => record(coin.amount_int().map(|v| denom.to_scaled_value(&v)), |v| {
                    cudos_orchestrator_balance
                        .with_label_values(&[labels.0.as_str(), labels.1.as_str()])
                        .set(v)
                }),
                None => debug!(denom = %denom.base, "orchestrator holds no balance in the base denom"),
            },
        );
    }

    {
        let ethereum = state.backends.ethereum.clone();
        let (labels, denom) = (labels.clone(), denom.clone());
        scrape.spawn(
            "ethereum orchestrator balance",
            async move { ethereum.native_balance(&eth_address).await },
            move |balance| {
                ethereum_orchestrator_balance
                    .with_label_values(&[labels.0.as_str(), labels.1.as_str()])
                    .set(denom.to_scaled_value(&balance));
            },
        );
    }

    let Some(token) = state.token_contract else {
        warn!("eth_token_contract is not configured, skipping erc20 balances");
        return render(scrape).await;
    };

    {
        let ethereum = state.backends.ethereum.clone();
        let (labels, denom) = (labels.clone(), denom.clone());
        scrape.spawn(
            "ethereum orchestrator erc20 balance",
            async move { ethereum.token_balance(&token, &eth_address).await },
            move |balance| {
                ethereum_orchestrator_erc20_balance
                    .with_label_values(&[labels.0.as_str(), labels.1.as_str()])
                    .set(denom.to_scaled_value(&balance));
            },
        );
    }

    match state.gravity_contract {
        Some(contract) => {
            let ethereum = state.backends.ethereum.clone();
            scrape.spawn(
                "gravity contract balance",
                async move { ethereum.token_balance(&token, &contract).await },
                move |balance| ethereum_contract_balance.set(denom.to_scaled_value(&balance)),
            );
        }
        None => warn!("eth_gravity_contract is not configured, skipping contract balance"),
    }

    render(scrape).await
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use crate::routes::testing::*;

    const ETH_ORCHESTRATOR: &str = "0x1111111111111111111111111111111111111111";
    const TOKEN: &str = "0x817bbdbc3e8a1204f3691d14bb44992841e3db35";
    const GRAVITY: &str = "0xb22b6d9a6bd2fa4fd7a7d3d2a6a2a4a8b41db3e2";

    async fn mock_orchestrator(node: &MockServer, address: &str) {
        let path = format!("/cosmos/bank/v1beta1/balances/{address}");
        node.mock_async(|when, then| {
            when.method(GET).path(path);
            then.status(200).json_body(json!({
                "balances": [
                    { "denom": "ibc/27394FB092D2ECCD56123C74F36E4C1F926001CEADA9CA97EA622B25F41E5EB2", "amount": "999" },
                    { "denom": "uatom", "amount": "2500000" }
                ],
                "pagination": { "next_key": null, "total": "2" }
            }));
        })
        .await;
    }

    #[tokio::test]
    async fn unreachable_ethereum_keeps_cosmos_balance() {
        let node = MockServer::start_async().await;
        let orchestrator = account(4);
        mock_orchestrator(&node, &orchestrator).await;

        let state = state(TestBackends {
            node: Some(node.base_url()),
            token_contract: Some(TOKEN.to_string()),
            gravity_contract: Some(GRAVITY.to_string()),
            ..TestBackends::default()
        })
        .await;
        let addr = serve(state).await;

        let (status, body) = get(
            addr,
            &format!(
                "/metrics/gravity-bridge?cudos_orchestrator_address={orchestrator}&ethereum_orchestrator_address={ETH_ORCHESTRATOR}"
            ),
        )
        .await;

        assert_eq!(status, 200);
        assert!(body.contains(&format!(
            r#"gravity_cudos_orchestrator_balance{{cudos_orchestrator_address="{orchestrator}",ethereum_orchestrator_address="{ETH_ORCHESTRATOR}"}} 2.5"#
        )));
        assert!(!body.contains("gravity_ethereum_"));
    }

    #[tokio::test]
    async fn ethereum_balances_are_scaled() {
        let node = MockServer::start_async().await;
        let orchestrator = account(5);
        mock_orchestrator(&node, &orchestrator).await;

        let eth = MockServer::start_async().await;
        eth.mock_async(|when, then| {
            when.method(POST).path("/").body_contains("eth_getBalance");
            then.status(200)
                .json_body(json!({ "jsonrpc": "2.0", "id": 1, "result": "0x1e8480" }));
        })
        .await;
        // balanceOf(orchestrator)
        eth.mock_async(|when, then| {
            when.method(POST)
                .path("/")
                .body_contains("eth_call")
                .body_contains("1111111111111111111111111111111111111111");
            then.status(200).json_body(json!({
                "jsonrpc": "2.0",
                "id": 2,
                "result": "0x00000000000000000000000000000000000000000000000000000000000f4240"
            }));
        })
        .await;
        // balanceOf(gravity contract)
        eth.mock_async(|when, then| {
            when.method(POST)
                .path("/")
                .body_contains("eth_call")
                .body_contains("b22b6d9a6bd2fa4fd7a7d3d2a6a2a4a8b41db3e2");
            then.status(200).json_body(json!({
                "jsonrpc": "2.0",
                "id": 3,
                "result": "0x00000000000000000000000000000000000000000000000000000000004c4b40"
            }));
        })
        .await;

        let state = state(TestBackends {
            node: Some(node.base_url()),
            eth: Some(eth.base_url()),
            token_contract: Some(TOKEN.to_string()),
            gravity_contract: Some(GRAVITY.to_string()),
            ..TestBackends::default()
        })
        .await;
        let addr = serve(state).await;

        let (_, body) = get(
            addr,
            &format!(
                "/metrics/gravity-bridge?cudos_orchestrator_address={orchestrator}&ethereum_orchestrator_address={ETH_ORCHESTRATOR}"
            ),
        )
        .await;

        assert!(body.contains(&format!(
            r#"gravity_ethereum_orchestrator_balance{{cudos_orchestrator_address="{orchestrator}",ethereum_orchestrator_address="{ETH_ORCHESTRATOR}"}} 2"#
        )));
        assert!(body.contains(&format!(
            r#"gravity_ethereum_orchestrator_erc20_balance{{cudos_orchestrator_address="{orchestrator}",ethereum_orchestrator_address="{ETH_ORCHESTRATOR}"}} 1"#
        )));
        assert!(body.contains("gravity_ethereum_contract_balance 5"));
    }

    #[tokio::test]
    async fn auto_detected_denom_matches_base_denom_balance() {
        let node = MockServer::start_async().await;
        let orchestrator = account(8);
        mock_orchestrator(&node, &orchestrator).await;
        node.mock_async(|when, then| {
            when.method(GET).path("/cosmos/bank/v1beta1/denoms_metadata");
            then.status(200).json_body(json!({
                "metadatas": [{
                    "denom_units": [
                        { "denom": "uatom", "exponent": 0 },
                        { "denom": "atom", "exponent": 6 }
                    ],
                    "base": "uatom",
                    "display": "atom"
                }]
            }));
        })
        .await;

        let client = cosmos::CosmosClient::new(&node.base_url(), 100).expect("client");
        let denomination = cosmos::chain::resolve_denomination("", 0.0, &client)
            .await
            .expect("denom");
        assert_eq!(denomination.denom, "atom");

        let state = state(TestBackends {
            node: Some(node.base_url()),
            denomination: Some(denomination),
            ..TestBackends::default()
        })
        .await;
        let addr = serve(state).await;

        let (_, body) = get(
            addr,
            &format!(
                "/metrics/gravity-bridge?cudos_orchestrator_address={orchestrator}&ethereum_orchestrator_address={ETH_ORCHESTRATOR}"
            ),
        )
        .await;

        assert!(body.contains(&format!(
            r#"gravity_cudos_orchestrator_balance{{cudos_orchestrator_address="{orchestrator}",ethereum_orchestrator_address="{ETH_ORCHESTRATOR}"}} 2.5"#
        )));
    }

    #[tokio::test]
    async fn wallet_without_base_denom_has_no_cosmos_balance() {
        let node = MockServer::start_async().await;
        let orchestrator = account(9);
        let path = format!("/cosmos/bank/v1beta1/balances/{orchestrator}");
        node.mock_async(|when, then| {
            when.method(GET).path(path);
            then.status(200).json_body(json!({
                "balances": [{ "denom": "uosmo", "amount": "700" }],
                "pagination": { "next_key": null, "total": "1" }
            }));
        })
        .await;

        let state = state(TestBackends {
            node: Some(node.base_url()),
            ..TestBackends::default()
        })
        .await;
        let addr = serve(state).await;

        let (status, body) = get(
            addr,
            &format!(
                "/metrics/gravity-bridge?cudos_orchestrator_address={orchestrator}&ethereum_orchestrator_address={ETH_ORCHESTRATOR}"
            ),
        )
        .await;

        assert_eq!(status, 200);
        assert!(!body.contains("gravity_cudos_orchestrator_balance{"));
    }

    #[tokio::test]
    async fn malformed_ethereum_address_yields_empty_body() {
        let state = state(TestBackends::default()).await;
        let addr = serve(state).await;
        let orchestrator = account(6);

        let (status, body) = get(
            addr,
            &format!(
                "/metrics/gravity-bridge?cudos_orchestrator_address={orchestrator}&ethereum_orchestrator_address=0x1234"
            ),
        )
        .await;

        assert_eq!(status, 200);
        assert!(body.is_empty());
    }
}

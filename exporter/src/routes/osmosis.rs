//! `GET /metrics/osmosis`: DEX token markets and totals.

use axum::{extract::State, response::Response};

use cosmos::{GaugeVec, MetricsError, ScalarGauge, Scrape, ScrapeRegistry};

use super::{registration_failed, render};
use crate::state::SharedState;

struct OsmosisMetrics {
    token_price: GaugeVec,
    token_liquidity: GaugeVec,
    token_volume_24h: GaugeVec,
    total_liquidity_usd: ScalarGauge,
    total_volume_24h_usd: ScalarGauge,
}

impl OsmosisMetrics {
    fn register(registry: &ScrapeRegistry) -> Result<Self, MetricsError> {
        let token = &["symbol", "denom"];
        Ok(Self {
            token_price: registry.gauge_vec("osmosis_token_price", "Token price in USD", token)?,
            token_liquidity: registry.gauge_vec(
                "osmosis_token_liquidity",
                "Token liquidity in USD",
                token,
            )?,
            token_volume_24h: registry.gauge_vec(
                "osmosis_token_volume_24h",
                "Token trading volume over the last 24h in USD",
                token,
            )?,
            total_liquidity_usd: registry.gauge(
                "osmosis_total_liquidity_usd",
                "Total liquidity in USD",
            )?,
            total_volume_24h_usd: registry.gauge(
                "osmosis_total_volume_24h_usd",
                "Total trading volume over the last 24h in USD",
            )?,
        })
    }
}

pub async fn osmosis_metrics(State(state): State<SharedState>) -> Response {
    let mut scrape = Scrape::begin("/metrics/osmosis", &state.settings.const_labels);
    let OsmosisMetrics {
        token_price,
        token_liquidity,
        token_volume_24h,
        total_liquidity_usd,
        total_volume_24h_usd,
    } = match OsmosisMetrics::register(scrape.registry()) {
        Ok(metrics) => metrics,
        Err(err) => return registration_failed(&scrape, err),
    };

    let osmosis = state.backends.osmosis.clone();
    scrape.spawn(
        "tokens",
        async move { osmosis.tokens().await },
        move |tokens| {
            for token in &tokens {
                let labels = [token.symbol.as_str(), token.denom.as_str()];
                token_price.with_label_values(&labels).set(token.price);
                token_liquidity
                    .with_label_values(&labels)
                    .set(token.liquidity);
                token_volume_24h
                    .with_label_values(&labels)
                    .set(token.volume_24h);
            }
        },
    );

    let osmosis = state.backends.osmosis.clone();
    scrape.spawn(
        "overview",
        async move { osmosis.overview().await },
        move |overview| {
            total_liquidity_usd.set(overview.liquidity_usd);
            total_volume_24h_usd.set(overview.volume_24h);
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
    async fn token_markets_survive_failed_overview() {
        let api = MockServer::start_async().await;
        api.mock_async(|when, then| {
            when.method(GET).path("/tokens/v2/all");
            then.status(200).json_body(json!([
                {
                    "price": 0.75,
                    "denom": "uosmo",
                    "symbol": "OSMO",
                    "liquidity": 120000.5,
                    "volume_24h": 3400.25,
                    "name": "Osmosis",
                    "price_24h_change": -1.2
                }
            ]));
        })
        .await;
        api.mock_async(|when, then| {
            when.method(GET).path("/overview/v1/metrics");
            then.status(502);
        })
        .await;

        let state = state(TestBackends {
            osmosis: Some(api.base_url()),
            ..TestBackends::default()
        })
        .await;
        let addr = serve(state).await;

        let (_, body) = get(addr, "/metrics/osmosis").await;

        assert!(body.contains(r#"osmosis_token_price{denom="uosmo",symbol="OSMO"} 0.75"#));
        assert!(body.contains(r#"osmosis_token_liquidity{denom="uosmo",symbol="OSMO"} 120000.5"#));
        assert!(!body.contains("osmosis_total_liquidity_usd"));
    }
}

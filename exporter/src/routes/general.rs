//! `GET /metrics/general`: chain-wide token figures and configured prices.

use axum::{extract::State, response::Response};
use tracing::error;

use cosmos::units::to_float;
use cosmos::{ClientError, GaugeVec, MetricsError, ScalarGauge, Scrape, ScrapeRegistry};

use super::{record, registration_failed, render};
use crate::state::SharedState;

struct GeneralMetrics {
    bonded_tokens: ScalarGauge,
    not_bonded_tokens: ScalarGauge,
    community_pool: GaugeVec,
    supply_total: GaugeVec,
    token_price: GaugeVec,
}

impl GeneralMetrics {
    fn register(registry: &ScrapeRegistry) -> Result<Self, MetricsError> {
        Ok(Self {
            bonded_tokens: registry.gauge("cosmos_general_bonded_tokens", "Bonded tokens")?,
            not_bonded_tokens: registry
                .gauge("cosmos_general_not_bonded_tokens", "Not bonded tokens")?,
            community_pool: registry.gauge_vec(
                "cosmos_general_community_pool",
                "Community pool",
                &["denom"],
            )?,
            supply_total: registry.gauge_vec(
                "cosmos_general_supply_total",
                "Total supply",
                &["denom"],
            )?,
            token_price: registry.gauge_vec(
                "cosmos_token_price",
                "Token Price",
                &["token", "currency"],
            )?,
        })
    }
}

pub async fn general_metrics(State(state): State<SharedState>) -> Response {
    let mut scrape = Scrape::begin("/metrics/general", &state.settings.const_labels);
    let metrics = match GeneralMetrics::register(scrape.registry()) {
        Ok(metrics) => metrics,
        Err(err) => return registration_failed(&scrape, err),
    };

    let GeneralMetrics {
        bonded_tokens,
        not_bonded_tokens,
        community_pool,
        supply_total,
        token_price,
    } = metrics;

    let cosmos = state.backends.cosmos.clone();
    scrape.spawn(
        "staking pool",
        async move { cosmos.staking_pool().await },
        move |resp| {
            record(resp.pool.bonded().map(|v| to_float(&v)), |v| {
                bonded_tokens.set(v)
            });
            record(resp.pool.not_bonded().map(|v| to_float(&v)), |v| {
                not_bonded_tokens.set(v)
            });
        },
    );

    let cosmos = state.backends.cosmos.clone();
    let denomination = state.chain.denomination.clone();
    scrape.spawn(
        "community pool",
        async move { cosmos.community_pool().await },
        move |resp| {
            for coin in &resp.pool {
                record(coin.amount_f64().map(|v| denomination.scale(v)), |v| {
                    community_pool.with_label_values(&[coin.denom.as_str()]).set(v)
                });
            }
        },
    );

    // Supply is exported in base units, unlike the community pool.
    let cosmos = state.backends.cosmos.clone();
    scrape.spawn(
        "total supply",
        async move { cosmos.total_supply().await },
        move |resp| {
            for coin in &resp.supply {
                record(coin.amount_int().map(|v| to_float(&v)), |v| {
                    supply_total.with_label_values(&[coin.denom.as_str()]).set(v)
                });
            }
        },
    );

    if !state.settings.token_prices.is_empty() {
        let prices = state.backends.prices.clone();
        let tokens = state.settings.token_prices.clone();
        scrape.spawn(
            "token prices",
            async move { Ok::<_, ClientError>(prices.current_prices(&tokens).await) },
            move |batch| {
                for quote in &batch.quotes {
                    token_price
                        .with_label_values(&[quote.token.as_str(), quote.currency.as_str()])
                        .set(quote.price);
                }
                if let Some(failure) = batch.failure {
                    error!(token = %failure.token, error = %failure.error, "could not get token price");
                }
            },
        );
    }

    render(scrape).await
}

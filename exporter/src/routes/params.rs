//! `GET /metrics/params`: module parameters of staking, mint, slashing and
//! distribution.

use axum::{extract::State, response::Response};

use cosmos::{MetricsError, ScalarGauge, Scrape, ScrapeRegistry};

use super::{record, registration_failed, render};
use crate::state::SharedState;

struct ParamsMetrics {
    max_validators: ScalarGauge,
    unbonding_time: ScalarGauge,
    blocks_per_year: ScalarGauge,
    goal_bonded: ScalarGauge,
    inflation_min: ScalarGauge,
    inflation_max: ScalarGauge,
    inflation_rate_change: ScalarGauge,
    current_inflation: ScalarGauge,
    downtime_jail_duration: ScalarGauge,
    min_signed_per_window: ScalarGauge,
    signed_blocks_window: ScalarGauge,
    slash_fraction_double_sign: ScalarGauge,
    slash_fraction_downtime: ScalarGauge,
    community_tax: ScalarGauge,
    base_proposer_reward: ScalarGauge,
    bonus_proposer_reward: ScalarGauge,
}

impl ParamsMetrics {
    fn register(registry: &ScrapeRegistry) -> Result<Self, MetricsError> {
        Ok(Self {
            max_validators: registry.gauge(
                "cosmos_params_max_validators",
                "Active set length",
            )?,
            unbonding_time: registry.gauge(
                "cosmos_params_unbonding_time",
                "Unbonding time, in seconds",
            )?,
            blocks_per_year: registry.gauge(
                "cosmos_params_blocks_per_year",
                "Blocks per year",
            )?,
            goal_bonded: registry.gauge("cosmos_params_goal_bonded", "Goal bonded")?,
            inflation_min: registry.gauge("cosmos_params_inflation_min", "Min inflation")?,
            inflation_max: registry.gauge("cosmos_params_inflation_max", "Max inflation")?,
            inflation_rate_change: registry.gauge(
                "cosmos_params_inflation_rate_change",
                "Inflation rate change",
            )?,
            current_inflation: registry.gauge(
                "cosmos_params_current_inflation",
                "Current inflation",
            )?,
            downtime_jail_duration: registry.gauge(
                "cosmos_params_downtime_jail_duration",
                "Downtime jail duration, in seconds",
            )?,
            min_signed_per_window: registry.gauge(
                "cosmos_params_min_signed_per_window",
                "Minimal amount of blocks to sign per window to avoid slashing",
            )?,
            signed_blocks_window: registry.gauge(
                "cosmos_params_signed_blocks_window",
                "Signed blocks window",
            )?,
            slash_fraction_double_sign: registry.gauge(
                "cosmos_params_slash_fraction_double_sign",
                "% of tokens to be slashed if double signing",
            )?,
            slash_fraction_downtime: registry.gauge(
                "cosmos_params_slash_fraction_downtime",
                "% of tokens to be slashed if downtime",
            )?,
            community_tax: registry.gauge("cosmos_params_community_tax", "Community tax")?,
            base_proposer_reward: registry.gauge(
                "cosmos_params_base_proposer_reward",
                "Base proposer reward",
            )?,
            bonus_proposer_reward: registry.gauge(
                "cosmos_params_bonus_proposer_reward",
                "Bonus proposer reward",
            )?,
        })
    }
}

pub async fn params_metrics(State(state): State<SharedState>) -> Response {
    let mut scrape = Scrape::begin("/metrics/params", &state.settings.const_labels);
    let metrics = match ParamsMetrics::register(scrape.registry()) {
        Ok(metrics) => metrics,
        Err(err) => return registration_failed(&scrape, err),
    };

    let ParamsMetrics {
        max_validators,
        unbonding_time,
        blocks_per_year,
        goal_bonded,
        inflation_min,
        inflation_max,
        inflation_rate_change,
        current_inflation,
        downtime_jail_duration,
        min_signed_per_window,
        signed_blocks_window,
        slash_fraction_double_sign,
        slash_fraction_downtime,
        community_tax,
        base_proposer_reward,
        bonus_proposer_reward,
    } = metrics;

    let cosmos = state.backends.cosmos.clone();
    scrape.spawn(
        "staking params",
        async move { cosmos.staking_params().await },
        move |params| {
            max_validators.set(f64::from(params.max_validators));
            record(params.unbonding_time_secs(), |v| unbonding_time.set(v));
        },
    );

    let cosmos = state.backends.cosmos.clone();
    scrape.spawn(
        "mint params",
        async move { cosmos.mint_params().await },
        move |params| {
            record(params.blocks_per_year(), |v| blocks_per_year.set(v));
            record(params.goal_bonded(), |v| goal_bonded.set(v));
            record(params.inflation_min(), |v| inflation_min.set(v));
            record(params.inflation_max(), |v| inflation_max.set(v));
            record(params.inflation_rate_change(), |v| {
                inflation_rate_change.set(v)
            });
        },
    );

    let cosmos = state.backends.cosmos.clone();
    scrape.spawn(
        "inflation",
        async move { cosmos.inflation().await },
        move |inflation| record(inflation.value(), |v| current_inflation.set(v)),
    );

    let cosmos = state.backends.cosmos.clone();
    scrape.spawn(
        "slashing params",
        async move { cosmos.slashing_params().await },
        move |params| {
            record(params.downtime_jail_duration_secs(), |v| {
                downtime_jail_duration.set(v)
            });
            record(params.min_signed_per_window(), |v| {
                min_signed_per_window.set(v)
            });
            record(params.signed_blocks_window(), |v| signed_blocks_window.set(v));
            record(params.slash_fraction_double_sign(), |v| {
                slash_fraction_double_sign.set(v)
            });
            record(params.slash_fraction_downtime(), |v| {
                slash_fraction_downtime.set(v)
            });
        },
    );

    // Newer SDK versions dropped the proposer rewards; they stay absent then.
    let cosmos = state.backends.cosmos.clone();
    scrape.spawn(
        "distribution params",
        async move { cosmos.distribution_params().await },
        move |params| {
            record(params.community_tax(), |v| community_tax.set(v));
            if let Some(value) = params.base_proposer_reward() {
                record(value, |v| base_proposer_reward.set(v));
            }
            if let Some(value) = params.bonus_proposer_reward() {
                record(value, |v| bonus_proposer_reward.set(v));
            }
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
    async fn params_are_exported_and_failed_modules_are_absent() {
        let node = MockServer::start_async().await;
        node.mock_async(|when, then| {
            when.method(GET).path("/cosmos/staking/v1beta1/params");
            then.status(200).json_body(json!({
                "params": {
                    "unbonding_time": "1814400s",
                    "max_validators": 180,
                    "max_entries": 7,
                    "historical_entries": 10000,
                    "bond_denom": "uatom"
                }
            }));
        })
        .await;
        node.mock_async(|when, then| {
            when.method(GET).path("/cosmos/mint/v1beta1/inflation");
            then.status(200)
                .json_body(json!({ "inflation": "0.100000000000000000" }));
        })
        .await;
        node.mock_async(|when, then| {
            when.method(GET).path("/cosmos/distribution/v1beta1/params");
            then.status(200).json_body(json!({
                "params": { "community_tax": "0.020000000000000000", "withdraw_addr_enabled": true }
            }));
        })
        .await;

        let state = state(TestBackends {
            node: Some(node.base_url()),
            ..TestBackends::default()
        })
        .await;
        let addr = serve(state).await;

        let (_, body) = get(addr, "/metrics/params").await;

        assert!(body.contains("cosmos_params_max_validators 180"));
        assert!(body.contains("cosmos_params_unbonding_time 1814400"));
        assert!(body.contains("cosmos_params_current_inflation 0.1"));
        assert!(body.contains("cosmos_params_community_tax 0.02"));
        assert!(!body.contains("cosmos_params_base_proposer_reward"));
        assert!(!body.contains("cosmos_params_goal_bonded"));
        assert!(!body.contains("cosmos_params_signed_blocks_window"));
    }
}

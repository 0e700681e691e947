//! `GET /metrics/wallet?address=`: balances and staking positions of one
//! account.

use axum::{
    extract::{Query, State},
    response::Response,
};
use serde::Deserialize;

use cosmos::address::validate_bech32;
use cosmos::{AddressError, GaugeVec, MetricsError, Scrape, ScrapeRegistry};

use super::{record, registration_failed, reject, render};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct WalletQuery {
    pub address: Option<String>,
}

struct WalletMetrics {
    balance: GaugeVec,
    delegations: GaugeVec,
    unbondings: GaugeVec,
    redelegations: GaugeVec,
    rewards: GaugeVec,
}

impl WalletMetrics {
    fn register(registry: &ScrapeRegistry) -> Result<Self, MetricsError> {
        Ok(Self {
            balance: registry.gauge_vec(
                "cosmos_wallet_balance",
                "Balance of the wallet",
                &["address", "denom"],
            )?,
            delegations: registry.gauge_vec(
                "cosmos_wallet_delegations",
                "Delegations of the wallet",
                &["address", "denom", "delegated_to"],
            )?,
            unbondings: registry.gauge_vec(
                "cosmos_wallet_unbondings",
                "Unbonding delegations of the wallet",
                &["address", "denom", "unbonded_from"],
            )?,
            redelegations: registry.gauge_vec(
                "cosmos_wallet_redelegations",
                "Redelegations of the wallet",
                &["address", "denom", "redelegated_from", "redelegated_to"],
            )?,
            rewards: registry.gauge_vec(
                "cosmos_wallet_rewards",
                "Rewards of the wallet",
                &["address", "denom", "validator_address"],
            )?,
        })
    }
}

pub async fn wallet_metrics(
    State(state): State<SharedState>,
    Query(query): Query<WalletQuery>,
) -> Response {
    let mut scrape = Scrape::begin("/metrics/wallet", &state.settings.const_labels);

    let address = match query
        .address
        .ok_or(AddressError::Missing)
        .and_then(|raw| validate_bech32(&raw, &state.prefixes.account))
    {
        Ok(address) => address,
        Err(err) => return reject(&scrape, err),
    };

    let metrics = match WalletMetrics::register(scrape.registry()) {
        Ok(metrics) => metrics,
        Err(err) => return registration_failed(&scrape, err),
    };
    let denomination = &state.chain.denomination;

    {
        let cosmos = state.backends.cosmos.clone();
        let (address, denom) = (address.clone(), denomination.clone());
        let gauge = metrics.balance;
        scrape.spawn(
            "balances",
            {
                let address = address.clone();
                async move { cosmos.all_balances(&address).await }
            },
            move |resp| {
                for coin in &resp.balances {
                    record(coin.amount_int().map(|v| denom.to_scaled_value(&v)), |v| {
                        gauge
                            .with_label_values(&[address.as_str(), coin.denom.as_str()])
                            .set(v)
                    });
                }
            },
        );
    }

    {
        let cosmos = state.backends.cosmos.clone();
        let (address, denom) = (address.clone(), denomination.clone());
        let gauge = metrics.delegations;
        scrape.spawn(
            "delegations",
            {
                let address = address.clone();
                async move { cosmos.delegator_delegations(&address).await }
            },
            move |delegations| {
                for delegation in &delegations {
                    let balance = &delegation.balance;
                    record(balance.amount_int().map(|v| denom.to_scaled_value(&v)), |v| {
                        gauge
                            .with_label_values(&[
                                address.as_str(),
                                balance.denom.as_str(),
                                delegation.delegation.validator_address.as_str(),
                            ])
                            .set(v)
                    });
                }
            },
        );
    }

    {
        let cosmos = state.backends.cosmos.clone();
        let (address, denom) = (address.clone(), denomination.clone());
        let gauge = metrics.unbondings;
        scrape.spawn(
            "unbonding delegations",
            {
                let address = address.clone();
                async move { cosmos.delegator_unbonding_delegations(&address).await }
            },
            move |unbondings| {
                for unbonding in &unbondings {
                    record(
                        unbonding.total_balance().map(|v| denom.to_scaled_value(&v)),
                        |v| {
                            gauge
                                .with_label_values(&[
                                    address.as_str(),
                                    denom.base.as_str(),
                                    unbonding.validator_address.as_str(),
                                ])
                                .set(v)
                        },
                    );
                }
            },
        );
    }

    {
        let cosmos = state.backends.cosmos.clone();
        let (address, denom) = (address.clone(), denomination.clone());
        let gauge = metrics.redelegations;
        scrape.spawn(
            "redelegations",
            {
                let address = address.clone();
                async move { cosmos.redelegations(&address).await }
            },
            move |redelegations| {
                for redelegation in &redelegations {
                    let pair = &redelegation.redelegation;
                    record(
                        redelegation.total_balance().map(|v| denom.to_scaled_value(&v)),
                        |v| {
                            gauge
                                .with_label_values(&[
                                    address.as_str(),
                                    denom.base.as_str(),
                                    pair.validator_src_address.as_str(),
                                    pair.validator_dst_address.as_str(),
                                ])
                                .set(v)
                        },
                    );
                }
            },
        );
    }

    {
        let cosmos = state.backends.cosmos.clone();
        let (address, denom) = (address.clone(), denomination.clone());
        let gauge = metrics.rewards;
        scrape.spawn(
            "rewards",
            {
                let address = address.clone();
                async move { cosmos.delegator_rewards(&address).await }
            },
            move |resp| {
                for reward in &resp.rewards {
                    for coin in &reward.reward {
                        record(coin.amount_f64().map(|v| denom.scale(v)), |v| {
                            gauge
                                .with_label_values(&[
                                    address.as_str(),
                                    coin.denom.as_str(),
                                    reward.validator_address.as_str(),
                                ])
                                .set(v)
                        });
                    }
                }
            },
        );
    }

    render(scrape).await
}

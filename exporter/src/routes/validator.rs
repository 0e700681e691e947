//! `GET /metrics/validator?address=`: one validator by operator address.

use axum::{
    extract::{Query, State},
    response::Response,
};
use serde::Deserialize;
use tracing::warn;

use cosmos::address::{consensus_address, validate_bech32};
use cosmos::{AddressError, ClientError, GaugeVec, MetricsError, Scrape, ScrapeRegistry};

use super::validators::ranked;
use super::{flag, record, registration_failed, reject, render};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct ValidatorQuery {
    pub address: Option<String>,
}

struct ValidatorMetrics {
    tokens: GaugeVec,
    delegator_shares: GaugeVec,
    commission_rate: GaugeVec,
    min_self_delegation: GaugeVec,
    jailed: GaugeVec,
    status: GaugeVec,
    delegations: GaugeVec,
    unbondings: GaugeVec,
    commission: GaugeVec,
    rewards: GaugeVec,
    missed_blocks: GaugeVec,
    rank: GaugeVec,
    active: GaugeVec,
}

impl ValidatorMetrics {
    fn register(registry: &ScrapeRegistry) -> Result<Self, MetricsError> {
        let described = &["address", "moniker"];
        Ok(Self {
            tokens: registry.gauge_vec(
                "cosmos_validator_tokens",
                "Tokens of the validator",
                described,
            )?,
            delegator_shares: registry.gauge_vec(
                "cosmos_validator_delegators_shares",
                "Delegators shares of the validator",
                described,
            )?,
            commission_rate: registry.gauge_vec(
                "cosmos_validator_commission_rate",
                "Commission rate of the validator",
                described,
            )?,
            min_self_delegation: registry.gauge_vec(
                "cosmos_validator_min_self_delegation",
                "Self declared minimum self delegation shares of the validator",
                described,
            )?,
            jailed: registry.gauge_vec(
                "cosmos_validator_jailed",
                "1 if the validator is jailed, 0 if not",
                described,
            )?,
            status: registry.gauge_vec(
                "cosmos_validator_status",
                "Status of the validator",
                described,
            )?,
            delegations: registry.gauge_vec(
                "cosmos_validator_delegations",
                "Delegations of the validator",
                &["address", "denom", "delegated_by"],
            )?,
            unbondings: registry.gauge_vec(
                "cosmos_validator_unbondings",
                "Unbondings of the validator",
                &["address", "denom", "unbonded_by"],
            )?,
            commission: registry.gauge_vec(
                "cosmos_validator_commission",
                "Accumulated commission of the validator",
                &["address", "denom"],
            )?,
            rewards: registry.gauge_vec(
                "cosmos_validator_rewards",
                "Outstanding rewards of the validator",
                &["address", "denom"],
            )?,
            missed_blocks: registry.gauge_vec(
                "cosmos_validator_missed_blocks",
                "Missed blocks of the validator",
                &["address"],
            )?,
            rank: registry.gauge_vec(
                "cosmos_validator_rank",
                "Rank of the validator by bonded tokens",
                &["address"],
            )?,
            active: registry.gauge_vec(
                "cosmos_validator_active",
                "1 if the validator is in the active set, 0 if not",
                &["address"],
            )?,
        })
    }
}

pub async fn validator_metrics(
    State(state): State<SharedState>,
    Query(query): Query<ValidatorQuery>,
) -> Response {
    let mut scrape = Scrape::begin("/metrics/validator", &state.settings.const_labels);

    let address = match query
        .address
        .ok_or(AddressError::Missing)
        .and_then(|raw| validate_bech32(&raw, &state.prefixes.validator))
    {
        Ok(address) => address,
        Err(err) => return reject(&scrape, err),
    };

    let ValidatorMetrics {
        tokens,
        delegator_shares,
        commission_rate,
        min_self_delegation,
        jailed,
        status,
        delegations,
        unbondings,
        commission,
        rewards,
        missed_blocks,
        rank,
        active,
    } = match ValidatorMetrics::register(scrape.registry()) {
        Ok(metrics) => metrics,
        Err(err) => return registration_failed(&scrape, err),
    };
    let denom = state.chain.denomination.clone();

    // ---------------------------
    // Validator record
    // ---------------------------

    {
        let cosmos = state.backends.cosmos.clone();
        let query_address = address.clone();
        let denom = denom.clone();
        scrape.spawn(
            "validator",
            async move { cosmos.validator(&query_address).await },
            move |validator| {
                let labels = [validator.operator_address.as_str(), validator.moniker()];

                record(
                    validator.tokens().map(|v| denom.to_scaled_value(&v)),
                    |v| tokens.with_label_values(&labels).set(v),
                );
                record(validator.delegator_shares().map(|v| denom.scale(v)), |v| {
                    delegator_shares.with_label_values(&labels).set(v)
                });
                record(validator.commission_rate(), |v| {
                    commission_rate.with_label_values(&labels).set(v)
                });
                record(
                    validator
                        .min_self_delegation()
                        .map(|v| denom.to_scaled_value(&v)),
                    |v| min_self_delegation.with_label_values(&labels).set(v),
                );
                jailed
                    .with_label_values(&labels)
                    .set(flag(validator.jailed));
                status
                    .with_label_values(&labels)
                    .set(validator.status.as_f64());
            },
        );
    }

    // ---------------------------
    // Delegations and unbondings
    // ---------------------------

    {
        let cosmos = state.backends.cosmos.clone();
        let (query_address, address, denom) = (address.clone(), address.clone(), denom.clone());
        let gauge = delegations;
        scrape.spawn(
            "delegations",
            async move { cosmos.validator_delegations(&query_address).await },
            move |delegations| {
                for delegation in &delegations {
                    let balance = &delegation.balance;
                    record(balance.amount_int().map(|v| denom.to_scaled_value(&v)), |v| {
                        gauge
                            .with_label_values(&[
                                address.as_str(),
                                balance.denom.as_str(),
                                delegation.delegation.delegator_address.as_str(),
                            ])
                            .set(v)
                    });
                }
            },
        );
    }

    {
        let cosmos = state.backends.cosmos.clone();
        let (query_address, address, denom) = (address.clone(), address.clone(), denom.clone());
        let gauge = unbondings;
        scrape.spawn(
            "unbonding delegations",
            async move { cosmos.validator_unbonding_delegations(&query_address).await },
            move |unbondings| {
                for unbonding in &unbondings {
                    record(
                        unbonding.total_balance().map(|v| denom.to_scaled_value(&v)),
                        |v| {
                            gauge
                                .with_label_values(&[
                                    address.as_str(),
                                    denom.base.as_str(),
                                    unbonding.delegator_address.as_str(),
                                ])
                                .set(v)
                        },
                    );
                }
            },
        );
    }

    // ---------------------------
    // Distribution
    // ---------------------------

    {
        let cosmos = state.backends.cosmos.clone();
        let (query_address, address, denom) = (address.clone(), address.clone(), denom.clone());
        let gauge = commission;
        scrape.spawn(
            "commission",
            async move { cosmos.validator_commission(&query_address).await },
            move |resp| {
                for coin in &resp.commission.commission {
                    record(coin.amount_f64().map(|v| denom.scale(v)), |v| {
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
        let (query_address, address, denom) = (address.clone(), address.clone(), denom.clone());
        let gauge = rewards;
        scrape.spawn(
            "outstanding rewards",
            async move { cosmos.validator_outstanding_rewards(&query_address).await },
            move |resp| {
                for coin in &resp.rewards.rewards {
                    record(coin.amount_f64().map(|v| denom.scale(v)), |v| {
                        gauge
                            .with_label_values(&[address.as_str(), coin.denom.as_str()])
                            .set(v)
                    });
                }
            },
        );
    }

    // ---------------------------
    // Signing info and rank
    // ---------------------------

    {
        let cosmos = state.backends.cosmos.clone();
        let consensus_prefix = state.prefixes.consensus_node.clone();
        let (query_address, address) = (address.clone(), address.clone());
        let gauge = missed_blocks;
        scrape.spawn(
            "signing info",
            async move {
                let validator = cosmos.validator(&query_address).await?;
                let pubkey = validator.consensus_pubkey.ok_or_else(|| {
                    ClientError::Protocol(format!("{query_address} has no consensus key"))
                })?;
                let consensus = consensus_address(&pubkey, &consensus_prefix)
                    .map_err(|err| ClientError::Protocol(err.to_string()))?;
                cosmos.signing_info(&consensus).await
            },
            move |info| {
                record(info.missed_blocks(), |v| {
                    gauge.with_label_values(&[address.as_str()]).set(v)
                });
            },
        );
    }

    {
        let cosmos = state.backends.cosmos.clone();
        scrape.spawn(
            "validator set",
            async move { cosmos.validators().await },
            move |validators| {
                let ranked = ranked(validators);
                match ranked
                    .iter()
                    .position(|validator| validator.operator_address == address)
                {
                    Some(index) => {
                        let labels = [address.as_str()];
                        rank.with_label_values(&labels).set((index + 1) as f64);
                        active
                            .with_label_values(&labels)
                            .set(flag(ranked[index].is_bonded()));
                    }
                    None => warn!(validator = %address, "validator is not in the validator set"),
                }
            },
        );
    }

    render(scrape).await
}

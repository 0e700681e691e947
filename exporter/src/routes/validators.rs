//! `GET /metrics/validators`: the whole validator set.

use std::collections::HashMap;

use axum::{extract::State, response::Response};
use tracing::{debug, warn};

use cosmos::address::consensus_address;
use cosmos::types::Validator;
use cosmos::{GaugeVec, MetricsError, Scrape, ScrapeRegistry};

use super::{flag, record, registration_failed, render};
use crate::state::SharedState;

/// Orders validators by bonded tokens, largest first.
///
/// Validators with unparseable token amounts sort last.
pub(crate) fn ranked(validators: Vec<Validator>) -> Vec<Validator> {
    let mut keyed: Vec<_> = validators
        .into_iter()
        .map(|validator| (validator.tokens().unwrap_or_default(), validator))
        .collect();
    keyed.sort_by(|a, b| b.0.cmp(&a.0));
    keyed.into_iter().map(|(_, validator)| validator).collect()
}

struct ValidatorsMetrics {
    commission: GaugeVec,
    status: GaugeVec,
    jailed: GaugeVec,
    tokens: GaugeVec,
    delegator_shares: GaugeVec,
    min_self_delegation: GaugeVec,
    missed_blocks: GaugeVec,
    rank: GaugeVec,
    active: GaugeVec,
}

impl ValidatorsMetrics {
    fn register(registry: &ScrapeRegistry) -> Result<Self, MetricsError> {
        let labels = &["address", "moniker"];
        Ok(Self {
            commission: registry.gauge_vec(
                "cosmos_validators_commission",
                "Commission of the validator",
                labels,
            )?,
            status: registry.gauge_vec(
                "cosmos_validators_status",
                "Status of the validator",
                labels,
            )?,
            jailed: registry.gauge_vec(
                "cosmos_validators_jailed",
                "Jailed status of the validator",
                labels,
            )?,
            tokens: registry.gauge_vec(
                "cosmos_validators_tokens",
                "Tokens of the validator",
                labels,
            )?,
            delegator_shares: registry.gauge_vec(
                "cosmos_validators_delegator_shares",
                "Delegator shares of the validator",
                labels,
            )?,
            min_self_delegation: registry.gauge_vec(
                "cosmos_validators_min_self_delegation",
                "Self declared minimum self delegation shares of the validator",
                labels,
            )?,
            missed_blocks: registry.gauge_vec(
                "cosmos_validators_missed_blocks",
                "Missed blocks of the validator",
                labels,
            )?,
            rank: registry.gauge_vec(
                "cosmos_validators_rank",
                "Rank of the validator by bonded tokens",
                labels,
            )?,
            active: registry.gauge_vec(
                "cosmos_validators_active",
                "1 if the validator is in the active set, 0 if not",
                labels,
            )?,
        })
    }
}

pub async fn validators_metrics(State(state): State<SharedState>) -> Response {
    let mut scrape = Scrape::begin("/metrics/validators", &state.settings.const_labels);
    let ValidatorsMetrics {
        commission,
        status,
        jailed,
        tokens,
        delegator_shares,
        min_self_delegation,
        missed_blocks,
        rank,
        active,
    } = match ValidatorsMetrics::register(scrape.registry()) {
        Ok(metrics) => metrics,
        Err(err) => return registration_failed(&scrape, err),
    };

    let cosmos = state.backends.cosmos.clone();
    let denom = state.chain.denomination.clone();
    scrape.spawn(
        "validators",
        async move { cosmos.validators().await },
        move |validators| {
            for (index, validator) in ranked(validators).iter().enumerate() {
                let labels = [validator.operator_address.as_str(), validator.moniker()];

                record(validator.commission_rate(), |v| {
                    commission.with_label_values(&labels).set(v)
                });
                status
                    .with_label_values(&labels)
                    .set(validator.status.as_f64());
                jailed
                    .with_label_values(&labels)
                    .set(flag(validator.jailed));
                record(
                    validator.tokens().map(|v| denom.to_scaled_value(&v)),
                    |v| tokens.with_label_values(&labels).set(v),
                );
                record(validator.delegator_shares().map(|v| denom.scale(v)), |v| {
                    delegator_shares.with_label_values(&labels).set(v)
                });
                record(
                    validator
                        .min_self_delegation()
                        .map(|v| denom.to_scaled_value(&v)),
                    |v| min_self_delegation.with_label_values(&labels).set(v),
                );
                rank.with_label_values(&labels).set((index + 1) as f64);
                active
                    .with_label_values(&labels)
                    .set(flag(validator.is_bonded()));
            }
        },
    );

    let cosmos = state.backends.cosmos.clone();
    let consensus_prefix = state.prefixes.consensus_node.clone();
    scrape.spawn(
        "signing infos",
        async move { tokio::try_join!(cosmos.validators(), cosmos.signing_infos()) },
        move |(validators, infos)| {
            let by_address: HashMap<&str, _> = infos
                .iter()
                .map(|info| (info.address.as_str(), info))
                .collect();

            for validator in &validators {
                let Some(pubkey) = &validator.consensus_pubkey else {
                    debug!(validator = %validator.operator_address, "validator has no consensus key");
                    continue;
                };
                let address = match consensus_address(pubkey, &consensus_prefix) {
                    Ok(address) => address,
                    Err(err) => {
                        warn!(validator = %validator.operator_address, error = %err, "could not derive consensus address");
                        continue;
                    }
                };
                let Some(info) = by_address.get(address.as_str()) else {
                    debug!(validator = %validator.operator_address, "no signing info");
                    continue;
                };

                record(info.missed_blocks(), |v| {
                    missed_blocks
                        .with_label_values(&[
                            validator.operator_address.as_str(),
                            validator.moniker(),
                        ])
                        .set(v)
                });
            }
        },
    );

    render(scrape).await
}

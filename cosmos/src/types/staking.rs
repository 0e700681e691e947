//! `cosmos.staking.v1beta1` and `cosmos.slashing.v1beta1` query responses.

use num_bigint::BigUint;
use serde::Deserialize;

use super::{Coin, parse_dec, parse_int};
use crate::client::ClientError;

#[derive(Clone, Debug, Deserialize)]
pub struct PoolResponse {
    pub pool: Pool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Pool {
    pub not_bonded_tokens: String,
    pub bonded_tokens: String,
}

impl Pool {
    pub fn bonded(&self) -> Result<BigUint, ClientError> {
        parse_int(&self.bonded_tokens)
    }

    pub fn not_bonded(&self) -> Result<BigUint, ClientError> {
        parse_int(&self.not_bonded_tokens)
    }
}

/// Bonding status of a validator.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
pub enum BondStatus {
    #[serde(rename = "BOND_STATUS_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "BOND_STATUS_UNBONDED")]
    Unbonded,
    #[serde(rename = "BOND_STATUS_UNBONDING")]
    Unbonding,
    #[serde(rename = "BOND_STATUS_BONDED")]
    Bonded,
}

impl BondStatus {
    /// Numeric value matching the protobuf enum, used as the gauge value.
    pub fn as_f64(self) -> f64 {
        match self {
            BondStatus::Unspecified => 0.0,
            BondStatus::Unbonded => 1.0,
            BondStatus::Unbonding => 2.0,
            BondStatus::Bonded => 3.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ValidatorResponse {
    pub validator: Validator,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ValidatorsResponse {
    #[serde(default)]
    pub validators: Vec<Validator>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Validator {
    pub operator_address: String,
    #[serde(default)]
    pub consensus_pubkey: Option<ConsensusPubkey>,
    #[serde(default)]
    pub jailed: bool,
    pub status: BondStatus,
    pub tokens: String,
    pub delegator_shares: String,
    #[serde(default)]
    pub description: Description,
    pub commission: Commission,
    pub min_self_delegation: String,
}

impl Validator {
    pub fn tokens(&self) -> Result<BigUint, ClientError> {
        parse_int(&self.tokens)
    }

    pub fn delegator_shares(&self) -> Result<f64, ClientError> {
        parse_dec(&self.delegator_shares)
    }

    pub fn commission_rate(&self) -> Result<f64, ClientError> {
        parse_dec(&self.commission.commission_rates.rate)
    }

    pub fn min_self_delegation(&self) -> Result<BigUint, ClientError> {
        parse_int(&self.min_self_delegation)
    }

    pub fn moniker(&self) -> &str {
        &self.description.moniker
    }

    pub fn is_bonded(&self) -> bool {
        self.status == BondStatus::Bonded
    }
}

/// `google.protobuf.Any`-encoded consensus key, e.g.
/// `{"@type": "/cosmos.crypto.ed25519.PubKey", "key": "<base64>"}`.
#[derive(Clone, Debug, Deserialize)]
pub struct ConsensusPubkey {
    #[serde(rename = "@type")]
    pub type_url: String,
    pub key: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Description {
    #[serde(default)]
    pub moniker: String,
    #[serde(default)]
    pub identity: String,
    #[serde(default)]
    pub website: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Commission {
    pub commission_rates: CommissionRates,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CommissionRates {
    pub rate: String,
    pub max_rate: String,
    pub max_change_rate: String,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct DelegationResponses {
    #[serde(default)]
    pub delegation_responses: Vec<DelegationResponse>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DelegationResponse {
    pub delegation: Delegation,
    pub balance: Coin,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Delegation {
    pub delegator_address: String,
    pub validator_address: String,
    pub shares: String,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct UnbondingResponses {
    #[serde(default)]
    pub unbonding_responses: Vec<UnbondingDelegation>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UnbondingDelegation {
    pub delegator_address: String,
    pub validator_address: String,
    #[serde(default)]
    pub entries: Vec<UnbondingDelegationEntry>,
}

impl UnbondingDelegation {
    /// Sum of the remaining balance over all entries.
    pub fn total_balance(&self) -> Result<BigUint, ClientError> {
        self.entries
            .iter()
            .try_fold(BigUint::default(), |acc, entry| Ok(acc + parse_int(&entry.balance)?))
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct UnbondingDelegationEntry {
    pub creation_height: String,
    pub completion_time: String,
    pub initial_balance: String,
    pub balance: String,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct RedelegationResponses {
    #[serde(default)]
    pub redelegation_responses: Vec<RedelegationResponse>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RedelegationResponse {
    pub redelegation: Redelegation,
    #[serde(default)]
    pub entries: Vec<RedelegationEntryResponse>,
}

impl RedelegationResponse {
    pub fn total_balance(&self) -> Result<BigUint, ClientError> {
        self.entries
            .iter()
            .try_fold(BigUint::default(), |acc, entry| Ok(acc + parse_int(&entry.balance)?))
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Redelegation {
    pub delegator_address: String,
    pub validator_src_address: String,
    pub validator_dst_address: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RedelegationEntryResponse {
    pub balance: String,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct SigningInfoResponse {
    pub val_signing_info: ValidatorSigningInfo,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct SigningInfosResponse {
    #[serde(default)]
    pub info: Vec<ValidatorSigningInfo>,
}

/// Liveness record kept by the slashing module, keyed by consensus address.
#[derive(Clone, Debug, Deserialize)]
pub struct ValidatorSigningInfo {
    pub address: String,
    #[serde(default)]
    pub start_height: String,
    #[serde(default)]
    pub index_offset: String,
    #[serde(default)]
    pub jailed_until: String,
    #[serde(default)]
    pub tombstoned: bool,
    pub missed_blocks_counter: String,
}

impl ValidatorSigningInfo {
    pub fn missed_blocks(&self) -> Result<f64, ClientError> {
        parse_dec(&self.missed_blocks_counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validator_parses_from_gateway_json() {
        let json = r#"{
            "validator": {
                "operator_address": "cosmosvaloper1abc",
                "consensus_pubkey": {
                    "@type": "/cosmos.crypto.ed25519.PubKey",
                    "key": "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA="
                },
                "jailed": false,
                "status": "BOND_STATUS_BONDED",
                "tokens": "1500000",
                "delegator_shares": "1500000.000000000000000000",
                "description": { "moniker": "alpha", "identity": "", "website": "", "security_contact": "", "details": "" },
                "unbonding_height": "0",
                "unbonding_time": "1970-01-01T00:00:00Z",
                "commission": {
                    "commission_rates": { "rate": "0.050000000000000000", "max_rate": "0.200000000000000000", "max_change_rate": "0.010000000000000000" },
                    "update_time": "2021-01-01T00:00:00Z"
                },
                "min_self_delegation": "1"
            }
        }"#;

        let resp: ValidatorResponse = serde_json::from_str(json).expect("validator should parse");
        let validator = resp.validator;
        assert!(validator.is_bonded());
        assert_eq!(validator.moniker(), "alpha");
        assert_eq!(validator.commission_rate().expect("rate"), 0.05);
        assert_eq!(validator.tokens().expect("tokens"), BigUint::from(1_500_000u32));
    }

    #[test]
    fn unbonding_balance_sums_entries() {
        let json = r#"{
            "delegator_address": "cosmos1d",
            "validator_address": "cosmosvaloper1v",
            "entries": [
                { "creation_height": "10", "completion_time": "2024-01-01T00:00:00Z", "initial_balance": "100", "balance": "100" },
                { "creation_height": "11", "completion_time": "2024-01-02T00:00:00Z", "initial_balance": "50", "balance": "40" }
            ]
        }"#;

        let ubd: UnbondingDelegation = serde_json::from_str(json).expect("unbonding should parse");
        assert_eq!(ubd.total_balance().expect("sum"), BigUint::from(140u32));
    }
}

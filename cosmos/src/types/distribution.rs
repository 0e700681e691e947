//! `cosmos.distribution.v1beta1` query responses.

use serde::Deserialize;

use super::DecCoin;

#[derive(Clone, Debug, Deserialize)]
pub struct CommunityPoolResponse {
    #[serde(default)]
    pub pool: Vec<DecCoin>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DelegatorRewardsResponse {
    #[serde(default)]
    pub rewards: Vec<DelegationDelegatorReward>,
    #[serde(default)]
    pub total: Vec<DecCoin>,
}

/// Rewards a delegator has pending with one validator.
#[derive(Clone, Debug, Deserialize)]
pub struct DelegationDelegatorReward {
    pub validator_address: String,
    #[serde(default)]
    pub reward: Vec<DecCoin>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ValidatorCommissionResponse {
    pub commission: ValidatorAccumulatedCommission,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ValidatorAccumulatedCommission {
    #[serde(default)]
    pub commission: Vec<DecCoin>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ValidatorOutstandingRewardsResponse {
    pub rewards: ValidatorOutstandingRewards,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ValidatorOutstandingRewards {
    #[serde(default)]
    pub rewards: Vec<DecCoin>,
}

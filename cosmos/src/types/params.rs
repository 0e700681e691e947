//! Module parameters exported by `/metrics/params`.
//!
//! Every numeric field is a string on the wire; accessors parse on demand.

use serde::Deserialize;

use super::{parse_dec, parse_duration_secs};
use crate::client::ClientError;

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ParamsEnvelope<T> {
    pub params: T,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StakingParams {
    pub unbonding_time: String,
    pub max_validators: u32,
    #[serde(default)]
    pub max_entries: u32,
    #[serde(default)]
    pub historical_entries: u32,
    pub bond_denom: String,
}

impl StakingParams {
    pub fn unbonding_time_secs(&self) -> Result<f64, ClientError> {
        parse_duration_secs(&self.unbonding_time)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct MintParams {
    pub mint_denom: String,
    pub inflation_rate_change: String,
    pub inflation_max: String,
    pub inflation_min: String,
    pub goal_bonded: String,
    pub blocks_per_year: String,
}

impl MintParams {
    pub fn inflation_rate_change(&self) -> Result<f64, ClientError> {
        parse_dec(&self.inflation_rate_change)
    }

    pub fn inflation_max(&self) -> Result<f64, ClientError> {
        parse_dec(&self.inflation_max)
    }

    pub fn inflation_min(&self) -> Result<f64, ClientError> {
        parse_dec(&self.inflation_min)
    }

    pub fn goal_bonded(&self) -> Result<f64, ClientError> {
        parse_dec(&self.goal_bonded)
    }

    pub fn blocks_per_year(&self) -> Result<f64, ClientError> {
        parse_dec(&self.blocks_per_year)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct InflationResponse {
    pub inflation: String,
}

impl InflationResponse {
    pub fn value(&self) -> Result<f64, ClientError> {
        parse_dec(&self.inflation)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SlashingParams {
    pub signed_blocks_window: String,
    pub min_signed_per_window: String,
    pub downtime_jail_duration: String,
    pub slash_fraction_double_sign: String,
    pub slash_fraction_downtime: String,
}

impl SlashingParams {
    pub fn signed_blocks_window(&self) -> Result<f64, ClientError> {
        parse_dec(&self.signed_blocks_window)
    }

    pub fn min_signed_per_window(&self) -> Result<f64, ClientError> {
        parse_dec(&self.min_signed_per_window)
    }

    pub fn downtime_jail_duration_secs(&self) -> Result<f64, ClientError> {
        parse_duration_secs(&self.downtime_jail_duration)
    }

    pub fn slash_fraction_double_sign(&self) -> Result<f64, ClientError> {
        parse_dec(&self.slash_fraction_double_sign)
    }

    pub fn slash_fraction_downtime(&self) -> Result<f64, ClientError> {
        parse_dec(&self.slash_fraction_downtime)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct DistributionParams {
    pub community_tax: String,
    // Deprecated since SDK v0.47 and reported as "0" there.
    #[serde(default)]
    pub base_proposer_reward: Option<String>,
    #[serde(default)]
    pub bonus_proposer_reward: Option<String>,
    #[serde(default)]
    pub withdraw_addr_enabled: bool,
}

impl DistributionParams {
    pub fn community_tax(&self) -> Result<f64, ClientError> {
        parse_dec(&self.community_tax)
    }

    pub fn base_proposer_reward(&self) -> Option<Result<f64, ClientError>> {
        self.base_proposer_reward.as_deref().map(parse_dec)
    }

    pub fn bonus_proposer_reward(&self) -> Option<Result<f64, ClientError>> {
        self.bonus_proposer_reward.as_deref().map(parse_dec)
    }
}

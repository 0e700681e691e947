//! Wire types returned by the node's query interfaces.
//!
//! The Cosmos REST gateway renders protobuf messages as JSON where every
//! integer (`sdk.Int`, `uint64`) and every decimal (`sdk.Dec`) is a string.
//! The structs here keep those fields as strings and expose typed accessors,
//! so a single malformed amount only fails the metric that reads it.

use num_bigint::BigUint;
use serde::Deserialize;

use crate::client::ClientError;

pub mod bank;
pub mod distribution;
pub mod params;
pub mod staking;
pub mod tendermint;

pub use bank::{AllBalancesResponse, DenomUnit, DenomsMetadataResponse, Metadata, TotalSupplyResponse};
pub use distribution::{
    CommunityPoolResponse, DelegationDelegatorReward, DelegatorRewardsResponse,
    ValidatorCommissionResponse, ValidatorOutstandingRewardsResponse,
};
pub use params::{
    DistributionParams, InflationResponse, MintParams, SlashingParams, StakingParams,
};
pub use staking::{
    BondStatus, DelegationResponse, PoolResponse, RedelegationResponse, UnbondingDelegation,
    Validator, ValidatorSigningInfo,
};
pub use tendermint::{NetInfo, NodeStatus};

/// Integer amount of a single denom (`cosmos.base.v1beta1.Coin`).
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

impl Coin {
    /// Parses the amount as an unbounded unsigned integer.
    pub fn amount_int(&self) -> Result<BigUint, ClientError> {
        parse_int(&self.amount)
    }
}

/// Decimal amount of a single denom (`cosmos.base.v1beta1.DecCoin`).
///
/// Used by the distribution module (community pool, rewards, commission),
/// whose amounts carry 18 fractional digits.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DecCoin {
    pub denom: String,
    pub amount: String,
}

impl DecCoin {
    pub fn amount_f64(&self) -> Result<f64, ClientError> {
        parse_dec(&self.amount)
    }
}

/// Pagination metadata attached to list responses.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PageResponse {
    #[serde(default)]
    pub next_key: Option<String>,
    #[serde(default)]
    pub total: Option<String>,
}

/// Parses an `sdk.Int` string.
pub fn parse_int(raw: &str) -> Result<BigUint, ClientError> {
    raw.parse::<BigUint>()
        .map_err(|_| ClientError::Amount(raw.to_string()))
}

/// Parses an `sdk.Dec` (or plain float) string.
pub fn parse_dec(raw: &str) -> Result<f64, ClientError> {
    raw.parse::<f64>()
        .map_err(|_| ClientError::Amount(raw.to_string()))
}

/// Parses a protobuf JSON `Duration`, e.g. `"1814400s"` or `"0.5s"`, into
/// seconds.
pub fn parse_duration_secs(raw: &str) -> Result<f64, ClientError> {
    raw.strip_suffix('s')
        .and_then(|secs| secs.parse::<f64>().ok())
        .ok_or_else(|| ClientError::Amount(raw.to_string()))
}

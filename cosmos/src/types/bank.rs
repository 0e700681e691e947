//! `cosmos.bank.v1beta1` query responses.

use serde::Deserialize;

use super::{Coin, PageResponse};

#[derive(Clone, Debug, Deserialize)]
pub struct AllBalancesResponse {
    #[serde(default)]
    pub balances: Vec<Coin>,
    #[serde(default)]
    pub pagination: Option<PageResponse>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TotalSupplyResponse {
    #[serde(default)]
    pub supply: Vec<Coin>,
    #[serde(default)]
    pub pagination: Option<PageResponse>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DenomsMetadataResponse {
    #[serde(default)]
    pub metadatas: Vec<Metadata>,
}

/// Denom metadata registered in the bank module.
#[derive(Clone, Debug, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub denom_units: Vec<DenomUnit>,
    pub base: String,
    pub display: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DenomUnit {
    pub denom: String,
    #[serde(default)]
    pub exponent: u32,
    #[serde(default)]
    pub aliases: Vec<String>,
}

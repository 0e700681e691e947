//! One-time startup resolution of chain-wide facts.
//!
//! Before the server starts, the exporter learns the chain id from the
//! node's status and the denom (plus its coefficient) either from the
//! settings or from the bank module's denom metadata. The result is a
//! [`ChainContext`] value; settings are never mutated.

use thiserror::Error;
use tracing::{debug, info};

use crate::address::AddressError;
use crate::client::{ClientError, CosmosClient, TendermintClient};
use crate::units::Denomination;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("could not create {backend} client: {source}")]
    Client {
        backend: &'static str,
        #[source]
        source: ClientError,
    },
    #[error("invalid {setting}: {source}")]
    Address {
        setting: &'static str,
        #[source]
        source: AddressError,
    },
    #[error("could not get chain id: {0}")]
    ChainId(#[source] ClientError),
    #[error("could not get denom metadata: {0}")]
    DenomMetadata(#[source] ClientError),
    #[error(
        "no denom infos. Try running the binary with --denom and --denom-coefficient to set them manually"
    )]
    NoDenomInfos,
    #[error("could not find denom info for {0:?}")]
    DenomNotFound(String),
}

/// Facts about the chain resolved at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct ChainContext {
    pub chain_id: String,
    pub denomination: Denomination,
}

impl ChainContext {
    pub async fn resolve(
        denom: &str,
        coefficient: f64,
        cosmos: &CosmosClient,
        tendermint: &TendermintClient,
    ) -> Result<Self, StartupError> {
        let status = tendermint.status().await.map_err(StartupError::ChainId)?;
        let chain_id = status.node_info.network;
        info!(chain_id = %chain_id, "got chain id");

        let denomination = resolve_denomination(denom, coefficient, cosmos).await?;
        Ok(Self {
            chain_id,
            denomination,
        })
    }
}

/// Determines the denom and coefficient.
///
/// When both are configured they are used as-is, the configured denom is
/// taken as the base denom and the node is not queried. Otherwise the first
/// denom metadata entry decides: its display unit is the denom unless one is
/// configured, its `base` is the base denom, and the coefficient is
/// `10^exponent` of the matching unit.
pub async fn resolve_denomination(
    denom: &str,
    coefficient: f64,
    cosmos: &CosmosClient,
) -> Result<Denomination, StartupError> {
    if !denom.is_empty() && coefficient != 0.0 {
        info!(denom, coefficient, "using provided denom and coefficient");
        return Ok(Denomination::new(denom, coefficient));
    }

    let metadatas = cosmos
        .denoms_metadata()
        .await
        .map_err(StartupError::DenomMetadata)?;
    let metadata = metadatas.first().ok_or(StartupError::NoDenomInfos)?;

    let denom = if denom.is_empty() {
        metadata.display.as_str()
    } else {
        denom
    };

    for unit in &metadata.denom_units {
        debug!(denom = %unit.denom, exponent = unit.exponent, "denom info");
        if unit.denom == denom {
            let coefficient = 10f64.powi(unit.exponent as i32);
            info!(denom, base = %metadata.base, coefficient, "got denom info");
            return Ok(Denomination::new(denom, coefficient).with_base(&metadata.base));
        }
    }

    Err(StartupError::DenomNotFound(denom.to_string()))
}

//! Shared application state.

use std::sync::Arc;

use cosmos::{
    Bech32Prefixes, ChainContext, ClientError, CosmosClient, EthAddress, EthereumClient,
    OsmosisClient, PriceClient, Settings, StartupError, TendermintClient,
};

/// One long-lived client per backend.
///
/// Clients are cheap to clone (they share a connection pool), so request
/// tasks take their own copy.
#[derive(Clone, Debug)]
pub struct Backends {
    pub cosmos: CosmosClient,
    pub tendermint: TendermintClient,
    pub ethereum: EthereumClient,
    pub prices: PriceClient,
    pub osmosis: OsmosisClient,
}

impl Backends {
    pub fn connect(settings: &Settings) -> Result<Self, StartupError> {
        Ok(Self {
            cosmos: CosmosClient::new(&settings.node, settings.limit)
                .map_err(client_error("cosmos"))?,
            tendermint: TendermintClient::new(&settings.tendermint_rpc)
                .map_err(client_error("tendermint"))?,
            ethereum: EthereumClient::new(&settings.eth_rpc).map_err(client_error("ethereum"))?,
            prices: PriceClient::new(&settings.price_api, settings.price_currencies.clone())
                .map_err(client_error("price"))?,
            osmosis: OsmosisClient::new(&settings.osmosis_api).map_err(client_error("osmosis"))?,
        })
    }
}

fn client_error(backend: &'static str) -> impl FnOnce(ClientError) -> StartupError {
    move |source| StartupError::Client { backend, source }
}

/// Read-only state handed to every request handler.
///
/// This is wrapped in an [`Arc`] and passed to request handlers via Axum's
/// `State` extractor. Nothing in it changes after startup.
pub struct AppState {
    pub settings: Settings,
    pub prefixes: Bech32Prefixes,
    /// Chain id and denomination resolved at startup.
    pub chain: ChainContext,
    pub backends: Backends,
    /// ERC-20 contract of the bridged token, if configured.
    pub token_contract: Option<EthAddress>,
    /// Gravity bridge contract, if configured.
    pub gravity_contract: Option<EthAddress>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        chain: ChainContext,
        backends: Backends,
    ) -> Result<Self, StartupError> {
        let token_contract = contract("eth_token_contract", &settings.eth_token_contract)?;
        let gravity_contract = contract("eth_gravity_contract", &settings.eth_gravity_contract)?;

        Ok(Self {
            prefixes: settings.prefixes(),
            settings,
            chain,
            backends,
            token_contract,
            gravity_contract,
        })
    }
}

fn contract(setting: &'static str, raw: &str) -> Result<Option<EthAddress>, StartupError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|source| StartupError::Address { setting, source })
}

/// Thread-safe alias for `AppState`.
pub type SharedState = Arc<AppState>;

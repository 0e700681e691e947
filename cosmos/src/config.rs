//! Exporter configuration.
//!
//! Settings are layered, later sources overriding earlier ones:
//!
//! 1. built-in defaults,
//! 2. a config file (`config.{toml,json,...}` in the working directory, or
//!    an explicit path),
//! 3. `COSMOS_EXPORTER_*` environment variables,
//! 4. command-line overrides applied by the binary.
//!
//! The resulting [`Settings`] value is immutable and is passed by reference
//! (or inside an `Arc`) to everything that needs it.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
pub use config::ConfigError;
use serde::Deserialize;

/// Prefix of environment variables, e.g. `COSMOS_EXPORTER_NODE`.
pub const ENV_PREFIX: &str = "COSMOS_EXPORTER";

/// Keys holding comma-separated lists when read from the environment.
const LIST_KEYS: [&str; 2] = ["token_prices", "price_currencies"];

#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    /// Address the HTTP server binds to.
    pub listen_address: SocketAddr,
    /// Base URL of the node's REST gateway.
    pub node: String,
    /// Base URL of the node's Tendermint RPC.
    pub tendermint_rpc: String,
    /// Ethereum JSON-RPC endpoint for the bridge side.
    pub eth_rpc: String,
    /// ERC-20 contract of the bridged token.
    #[serde(default)]
    pub eth_token_contract: String,
    /// Gravity bridge contract holding locked tokens.
    #[serde(default)]
    pub eth_gravity_contract: String,
    pub osmosis_api: String,
    /// Root of the CoinGecko-compatible price API.
    pub price_api: String,
    /// Display denom. Auto-detected from bank metadata when empty.
    #[serde(default)]
    pub denom: String,
    /// Divisor from base to display unit. Auto-detected when zero.
    #[serde(default)]
    pub denom_coefficient: f64,
    /// Page size for list queries.
    pub limit: u64,
    pub log_level: String,

    pub bech_prefix: String,
    #[serde(default)]
    pub bech_account_prefix: Option<String>,
    #[serde(default)]
    pub bech_account_pubkey_prefix: Option<String>,
    #[serde(default)]
    pub bech_validator_prefix: Option<String>,
    #[serde(default)]
    pub bech_validator_pubkey_prefix: Option<String>,
    #[serde(default)]
    pub bech_consensus_node_prefix: Option<String>,
    #[serde(default)]
    pub bech_consensus_node_pubkey_prefix: Option<String>,

    /// Labels attached to every exported series.
    #[serde(default)]
    pub const_labels: HashMap<String, String>,
    /// CoinGecko token ids whose prices `/metrics/general` exports.
    #[serde(default)]
    pub token_prices: Vec<String>,
    /// Quote currencies exported per token.
    pub price_currencies: Vec<String>,
}

impl Settings {
    /// Starts a builder with defaults, the config file and `env` applied.
    ///
    /// With `file = None` an optional `config.*` in the working directory is
    /// used; an explicit path must exist.
    pub fn builder(
        file: Option<&Path>,
        env: Environment,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let file = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name("config").required(false),
        };

        Ok(Self::defaults()?.add_source(file).add_source(env))
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("listen_address", "0.0.0.0:9300")?
            .set_default("node", "http://localhost:1317")?
            .set_default("tendermint_rpc", "http://localhost:26657")?
            .set_default("eth_rpc", "http://localhost:8545")?
            .set_default("osmosis_api", "https://api-osmosis.imperator.co")?
            .set_default("price_api", "https://api.coingecko.com/api/v3")?
            .set_default("limit", 1000i64)?
            .set_default("log_level", "info")?
            .set_default("bech_prefix", "cosmos")?
            .set_default("price_currencies", vec!["usd", "gbp"])
    }

    /// Environment source reading `COSMOS_EXPORTER_*` from the process.
    pub fn environment() -> Environment {
        Self::environment_from(None)
    }

    /// Environment source reading from `vars` instead of the process
    /// environment when given.
    pub fn environment_from(vars: Option<HashMap<String, String>>) -> Environment {
        LIST_KEYS
            .iter()
            .fold(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(","),
                |env, key| env.with_list_parse_key(key),
            )
            .source(vars)
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }

    /// Resolves the bech32 prefixes, deriving unset ones from
    /// `bech_prefix`.
    pub fn prefixes(&self) -> Bech32Prefixes {
        let base = &self.bech_prefix;
        let pick = |explicit: &Option<String>, suffix: &str| match explicit.as_deref() {
            Some(prefix) if !prefix.is_empty() => prefix.to_string(),
            _ => format!("{base}{suffix}"),
        };

        Bech32Prefixes {
            account: pick(&self.bech_account_prefix, ""),
            account_pubkey: pick(&self.bech_account_pubkey_prefix, "pub"),
            validator: pick(&self.bech_validator_prefix, "valoper"),
            validator_pubkey: pick(&self.bech_validator_pubkey_prefix, "valoperpub"),
            consensus_node: pick(&self.bech_consensus_node_prefix, "valcons"),
            consensus_node_pubkey: pick(&self.bech_consensus_node_pubkey_prefix, "valconspub"),
        }
    }
}

/// Human-readable parts of the chain's bech32 addresses.
///
/// Most chains derive all of them from one base prefix; some (e.g. Iris)
/// use unrelated prefixes, which is why each can be set separately.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bech32Prefixes {
    pub account: String,
    pub account_pubkey: String,
    pub validator: String,
    pub validator_pubkey: String,
    pub consensus_node: String,
    pub consensus_node_pubkey: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(vars: &[(&str, &str)]) -> Settings {
        let env = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        let builder = Settings::builder(None, Settings::environment_from(Some(env)))
            .expect("builder");
        Settings::from_builder(builder).expect("settings")
    }

    #[test]
    fn defaults_apply_without_any_source() {
        let settings = load(&[]);

        assert_eq!(settings.listen_address, "0.0.0.0:9300".parse().expect("addr"));
        assert_eq!(settings.node, "http://localhost:1317");
        assert_eq!(settings.limit, 1000);
        assert_eq!(settings.denom_coefficient, 0.0);
        assert_eq!(settings.price_currencies, vec!["usd", "gbp"]);
        assert!(settings.token_prices.is_empty());
    }

    #[test]
    fn environment_overrides_defaults() {
        let settings = load(&[
            ("COSMOS_EXPORTER_NODE", "http://node:1317"),
            ("COSMOS_EXPORTER_DENOM", "uatom"),
            ("COSMOS_EXPORTER_DENOM_COEFFICIENT", "1000000"),
            ("COSMOS_EXPORTER_TOKEN_PRICES", "cosmos,cudos"),
        ]);

        assert_eq!(settings.node, "http://node:1317");
        assert_eq!(settings.denom, "uatom");
        assert_eq!(settings.denom_coefficient, 1_000_000.0);
        assert_eq!(settings.token_prices, vec!["cosmos", "cudos"]);
    }

    #[test]
    fn overrides_win_over_environment() {
        let env = HashMap::from([(
            "COSMOS_EXPORTER_LOG_LEVEL".to_string(),
            "debug".to_string(),
        )]);
        let builder = Settings::builder(None, Settings::environment_from(Some(env)))
            .and_then(|b| b.set_override("log_level", "warn"))
            .expect("builder");
        let settings = Settings::from_builder(builder).expect("settings");

        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn prefixes_derive_from_base_prefix() {
        let mut settings = load(&[("COSMOS_EXPORTER_BECH_PREFIX", "cudos")]);
        settings.bech_validator_prefix = Some("cudosoper".to_string());
        let prefixes = settings.prefixes();

        assert_eq!(prefixes.account, "cudos");
        assert_eq!(prefixes.account_pubkey, "cudospub");
        assert_eq!(prefixes.validator, "cudosoper");
        assert_eq!(prefixes.consensus_node, "cudosvalcons");
        assert_eq!(prefixes.consensus_node_pubkey, "cudosvalconspub");
    }

    #[test]
    fn invalid_listen_address_is_rejected() {
        let env = HashMap::from([(
            "COSMOS_EXPORTER_LISTEN_ADDRESS".to_string(),
            "not-an-address".to_string(),
        )]);
        let builder =
            Settings::builder(None, Settings::environment_from(Some(env))).expect("builder");

        assert!(Settings::from_builder(builder).is_err());
    }
}

//! Command-line flags.
//!
//! Every flag is optional and only overrides the corresponding setting when
//! given, so the config file and `COSMOS_EXPORTER_*` environment variables
//! stay in effect for everything not passed on the command line.

use std::collections::HashMap;
use std::path::PathBuf;

use clap::Parser;

use cosmos::Settings;
use cosmos::config::ConfigError;

#[derive(Debug, Default, Parser)]
#[command(
    name = "cosmos-exporter",
    version,
    about = "Scrapes a Cosmos-SDK node on demand and serves Prometheus metrics"
)]
pub struct Cli {
    /// Config file (TOML or JSON). Defaults to an optional `config.*` in the
    /// working directory.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Address to listen on, e.g. `0.0.0.0:9300`.
    #[arg(long, value_name = "ADDR")]
    pub listen_address: Option<String>,
    /// Node REST gateway base URL.
    #[arg(long, value_name = "URL")]
    pub node: Option<String>,
    /// Tendermint RPC base URL.
    #[arg(long, value_name = "URL")]
    pub tendermint_rpc: Option<String>,
    /// Ethereum JSON-RPC endpoint.
    #[arg(long, value_name = "URL")]
    pub eth_rpc: Option<String>,
    /// ERC-20 contract of the bridged token.
    #[arg(long, value_name = "ADDRESS")]
    pub eth_token_contract: Option<String>,
    /// Gravity bridge contract.
    #[arg(long, value_name = "ADDRESS")]
    pub eth_gravity_contract: Option<String>,
    /// Osmosis analytics API base URL.
    #[arg(long, value_name = "URL")]
    pub osmosis_api: Option<String>,
    /// Price API root.
    #[arg(long, value_name = "URL")]
    pub price_api: Option<String>,

    /// Denom to scale balances to.
    #[arg(long)]
    pub denom: Option<String>,
    /// Divisor from the base unit to `--denom`.
    #[arg(long)]
    pub denom_coefficient: Option<f64>,
    /// Page size for list queries.
    #[arg(long)]
    pub limit: Option<u64>,
    /// Log level used when `RUST_LOG` is unset.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Base bech32 prefix all other prefixes derive from.
    #[arg(long)]
    pub bech_prefix: Option<String>,
    #[arg(long)]
    pub bech_account_prefix: Option<String>,
    #[arg(long)]
    pub bech_account_pubkey_prefix: Option<String>,
    #[arg(long)]
    pub bech_validator_prefix: Option<String>,
    #[arg(long)]
    pub bech_validator_pubkey_prefix: Option<String>,
    #[arg(long)]
    pub bech_consensus_node_prefix: Option<String>,
    #[arg(long)]
    pub bech_consensus_node_pubkey_prefix: Option<String>,

    /// Token ids to export prices for, comma-separated.
    #[arg(long, value_delimiter = ',', value_name = "IDS")]
    pub token_prices: Option<Vec<String>>,
    /// Quote currencies, comma-separated.
    #[arg(long, value_delimiter = ',', value_name = "CURRENCIES")]
    pub price_currencies: Option<Vec<String>>,
    /// Constant label added to every series. Repeatable.
    #[arg(long = "const-label", value_name = "KEY=VALUE", value_parser = parse_label)]
    pub const_labels: Vec<(String, String)>,
}

impl Cli {
    /// Loads settings with these flags layered on top of the file and
    /// environment.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let mut builder = Settings::builder(self.config.as_deref(), Settings::environment())?
            .set_override_option("listen_address", self.listen_address.clone())?
            .set_override_option("node", self.node.clone())?
            .set_override_option("tendermint_rpc", self.tendermint_rpc.clone())?
            .set_override_option("eth_rpc", self.eth_rpc.clone())?
            .set_override_option("eth_token_contract", self.eth_token_contract.clone())?
            .set_override_option("eth_gravity_contract", self.eth_gravity_contract.clone())?
            .set_override_option("osmosis_api", self.osmosis_api.clone())?
            .set_override_option("price_api", self.price_api.clone())?
            .set_override_option("denom", self.denom.clone())?
            .set_override_option("denom_coefficient", self.denom_coefficient)?
            .set_override_option("limit", self.limit.map(|limit| limit.to_string()))?
            .set_override_option("log_level", self.log_level.clone())?
            .set_override_option("bech_prefix", self.bech_prefix.clone())?
            .set_override_option("bech_account_prefix", self.bech_account_prefix.clone())?
            .set_override_option(
                "bech_account_pubkey_prefix",
                self.bech_account_pubkey_prefix.clone(),
            )?
            .set_override_option("bech_validator_prefix", self.bech_validator_prefix.clone())?
            .set_override_option(
                "bech_validator_pubkey_prefix",
                self.bech_validator_pubkey_prefix.clone(),
            )?
            .set_override_option(
                "bech_consensus_node_prefix",
                self.bech_consensus_node_prefix.clone(),
            )?
            .set_override_option(
                "bech_consensus_node_pubkey_prefix",
                self.bech_consensus_node_pubkey_prefix.clone(),
            )?
            .set_override_option("token_prices", self.token_prices.clone())?
            .set_override_option("price_currencies", self.price_currencies.clone())?;

        if !self.const_labels.is_empty() {
            let labels: HashMap<String, String> = self.const_labels.iter().cloned().collect();
            builder = builder.set_override("const_labels", labels)?;
        }

        Settings::from_builder(builder)
    }
}

fn parse_label(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {raw:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_parse_lists_and_labels() {
        let cli = Cli::try_parse_from([
            "cosmos-exporter",
            "--node",
            "http://node:1317",
            "--token-prices",
            "cosmos,cudos",
            "--const-label",
            "network=mainnet",
            "--const-label",
            "region=eu",
            "--limit",
            "50",
        ])
        .expect("parse");

        assert_eq!(cli.node.as_deref(), Some("http://node:1317"));
        assert_eq!(
            cli.token_prices,
            Some(vec!["cosmos".to_string(), "cudos".to_string()])
        );
        assert_eq!(cli.const_labels.len(), 2);
        assert_eq!(cli.limit, Some(50));
    }

    #[test]
    fn malformed_label_is_rejected() {
        let parsed = Cli::try_parse_from(["cosmos-exporter", "--const-label", "no-equals"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn given_flags_override_settings() {
        let cli = Cli {
            denom: Some("ucudos".to_string()),
            limit: Some(25),
            const_labels: vec![("network".to_string(), "testnet".to_string())],
            ..Cli::default()
        };
        let settings = cli.settings().expect("settings");

        assert_eq!(settings.denom, "ucudos");
        assert_eq!(settings.limit, 25);
        assert_eq!(
            settings.const_labels.get("network").map(String::as_str),
            Some("testnet")
        );
    }
}

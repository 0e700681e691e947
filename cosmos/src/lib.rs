//! Cosmos exporter library crate.
//!
//! This crate provides the building blocks of an on-demand Prometheus
//! exporter for Cosmos-SDK chains:
//!
//! - clients for the node's REST gateway and Tendermint RPC (`client`),
//! - wire types with typed accessors (`types`),
//! - the Ethereum JSON-RPC client for the gravity bridge (`ethereum`),
//! - price and DEX market data clients (`prices`, `osmosis`),
//! - base-unit to display-unit conversion (`units`),
//! - bech32 and Ethereum address handling (`address`),
//! - per-request Prometheus registries and scrape fan-out (`metrics`,
//!   `scrape`),
//! - layered configuration and startup resolution (`config`, `chain`).
//!
//! The `cosmos-exporter` binary composes these into HTTP handlers.

pub mod address;
pub mod chain;
pub mod client;
pub mod config;
pub mod ethereum;
pub mod metrics;
pub mod osmosis;
pub mod prices;
pub mod scrape;
pub mod types;
pub mod units;

pub use address::{AddressError, EthAddress};
pub use chain::{ChainContext, StartupError};
pub use client::{ClientError, CosmosClient, TendermintClient};
pub use config::{Bech32Prefixes, Settings};
pub use ethereum::EthereumClient;
pub use metrics::{CONTENT_TYPE, GaugeVec, MetricsError, ScalarGauge, ScrapeRegistry};
pub use osmosis::OsmosisClient;
pub use prices::PriceClient;
pub use scrape::Scrape;
pub use units::Denomination;

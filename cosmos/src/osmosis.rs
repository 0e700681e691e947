//! Client for the Osmosis DEX analytics API.

use serde::Deserialize;

use crate::client::{ClientError, endpoint, get_json, http_client};

/// Market data of one token listed on the DEX.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenMarket {
    pub symbol: String,
    pub denom: String,
    #[serde(default)]
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub liquidity: f64,
    #[serde(default)]
    pub volume_24h: f64,
    #[serde(default)]
    pub price_24h_change: f64,
}

/// DEX-wide totals.
#[derive(Clone, Debug, Deserialize)]
pub struct Overview {
    pub liquidity_usd: f64,
    #[serde(default)]
    pub liquidity_usd_24h: f64,
    pub volume_24h: f64,
    #[serde(default)]
    pub volume_24h_change: f64,
}

#[derive(Clone, Debug)]
pub struct OsmosisClient {
    http: reqwest::Client,
    base_url: String,
}

impl OsmosisClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: http_client()?,
            base_url: crate::client::base_url(base_url)?,
        })
    }

    pub async fn tokens(&self) -> Result<Vec<TokenMarket>, ClientError> {
        get_json(&self.http, endpoint(&self.base_url, "/tokens/v2/all"), &[]).await
    }

    pub async fn overview(&self) -> Result<Overview, ClientError> {
        get_json(&self.http, endpoint(&self.base_url, "/overview/v1/metrics"), &[]).await
    }
}

//! Token price lookups against a CoinGecko-compatible quote service.

use std::collections::HashMap;

use serde::Deserialize;

use crate::client::{ClientError, endpoint, get_json, http_client};

/// One price of one token in one currency.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenQuote {
    pub token: String,
    pub currency: String,
    pub price: f64,
}

/// Result of walking the configured token list.
///
/// Lookups run in order and stop at the first failing token; quotes
/// gathered before that point are kept.
#[derive(Debug, Default)]
pub struct QuoteBatch {
    pub quotes: Vec<TokenQuote>,
    pub failure: Option<QuoteFailure>,
}

#[derive(Debug)]
pub struct QuoteFailure {
    pub token: String,
    pub error: ClientError,
}

#[derive(Debug, Deserialize)]
struct CoinResponse {
    market_data: MarketData,
}

#[derive(Debug, Deserialize)]
struct MarketData {
    #[serde(default)]
    current_price: HashMap<String, f64>,
}

#[derive(Clone, Debug)]
pub struct PriceClient {
    http: reqwest::Client,
    base_url: String,
    currencies: Vec<String>,
}

impl PriceClient {
    /// `base_url` is the API root, e.g. `"https://api.coingecko.com/api/v3"`.
    /// `currencies` lists the quote currencies to export per token.
    pub fn new(base_url: &str, currencies: Vec<String>) -> Result<Self, ClientError> {
        Ok(Self {
            http: http_client()?,
            base_url: crate::client::base_url(base_url)?,
            currencies,
        })
    }

    /// Fetches current quotes for a single token id.
    pub async fn token_quotes(&self, token: &str) -> Result<Vec<TokenQuote>, ClientError> {
        let url = endpoint(&self.base_url, &format!("/coins/{token}"));
        let coin: CoinResponse = get_json(&self.http, url, &[]).await?;

        self.currencies
            .iter()
            .map(|currency| {
                coin.market_data
                    .current_price
                    .get(currency)
                    .map(|price| TokenQuote {
                        token: token.to_string(),
                        currency: currency.clone(),
                        price: *price,
                    })
                    .ok_or_else(|| {
                        ClientError::Protocol(format!("no {currency} quote for {token}"))
                    })
            })
            .collect()
    }

    /// Fetches quotes for every token id, one after another.
    pub async fn current_prices(&self, tokens: &[String]) -> QuoteBatch {
        let mut batch = QuoteBatch::default();

        for token in tokens {
            match self.token_quotes(token).await {
                Ok(quotes) => batch.quotes.extend(quotes),
                Err(error) => {
                    batch.failure = Some(QuoteFailure {
                        token: token.clone(),
                        error,
                    });
                    break;
                }
            }
        }

        batch
    }
}

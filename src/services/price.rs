use crate::error::{GasWatchError, Result};
use crate::services::{
    etherscan::EtherscanClient,
    fallback::{FallbackChain, Source},
};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

/// Price used when no provider has ever answered.
pub const DEFAULT_ETH_PRICE_USD: f64 = 3000.0;

const COINGECKO_TIMEOUT: Duration = Duration::from_secs(10);
const ETHERSCAN_PRICE_TIMEOUT: Duration = Duration::from_secs(5);

/// ETH/USD price with provider fallback and a last-known-value cache.
pub struct PriceSource {
    chain: FallbackChain<f64>,
    cached: RwLock<Option<f64>>,
}

impl PriceSource {
    pub fn new(chain: FallbackChain<f64>) -> Self {
        Self {
            chain,
            cached: RwLock::new(None),
        }
    }

    /// CoinGecko first, Etherscan second.
    pub fn with_defaults(
        client: reqwest::Client,
        coingecko_url: &str,
        etherscan: EtherscanClient,
    ) -> Self {
        Self::new(
            FallbackChain::new()
                .with_source(CoinGeckoPrice::new(client, coingecko_url))
                .with_source(EtherscanPrice::new(etherscan)),
        )
    }

    /// Never fails: falls back to the last good price, then to [`DEFAULT_ETH_PRICE_USD`].
    pub async fn fetch_asset_price_usd(&self) -> f64 {
        if let Some(price) = self.chain.resolve().await {
            *self.cached.write().await = Some(price);
            return price;
        }

        let fallback = self.cached_price().await.unwrap_or(DEFAULT_ETH_PRICE_USD);
        tracing::warn!("All ETH price providers failed, using fallback price ${:.2}", fallback);
        fallback
    }

    pub async fn cached_price(&self) -> Option<f64> {
        *self.cached.read().await
    }
}

fn validate_price(source: &str, price: f64) -> Result<f64> {
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(GasWatchError::malformed(source, format!("invalid price {}", price)))
    }
}

pub struct CoinGeckoPrice {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CoinGeckoQuote {
    usd: Option<f64>,
}

impl CoinGeckoPrice {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Source<f64> for CoinGeckoPrice {
    fn name(&self) -> &str {
        "coingecko"
    }

    fn timeout(&self) -> Duration {
        COINGECKO_TIMEOUT
    }

    async fn fetch(&self) -> Result<f64> {
        let quotes: HashMap<String, CoinGeckoQuote> = self
            .client
            .get(format!("{}/simple/price", self.base_url))
            .query(&[("ids", "ethereum"), ("vs_currencies", "usd")])
            .timeout(COINGECKO_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| GasWatchError::malformed(self.name(), e.to_string()))?;

        let price = quotes
            .get("ethereum")
            .and_then(|q| q.usd)
            .ok_or_else(|| GasWatchError::malformed(self.name(), "missing ethereum.usd"))?;

        validate_price(self.name(), price)
    }
}

pub struct EtherscanPrice {
    etherscan: EtherscanClient,
}

#[derive(Debug, Deserialize)]
struct EthPriceResult {
    ethusd: String,
}

impl EtherscanPrice {
    pub fn new(etherscan: EtherscanClient) -> Self {
        Self { etherscan }
    }
}

#[async_trait]
impl Source<f64> for EtherscanPrice {
    fn name(&self) -> &str {
        "etherscan-ethprice"
    }

    fn timeout(&self) -> Duration {
        ETHERSCAN_PRICE_TIMEOUT
    }

    async fn fetch(&self) -> Result<f64> {
        let result: EthPriceResult = self
            .etherscan
            .call(self.name(), "stats", "ethprice", ETHERSCAN_PRICE_TIMEOUT)
            .await?;

        let price: f64 = result.ethusd.trim().parse().map_err(|_| {
            GasWatchError::malformed(self.name(), format!("bad ethusd {:?}", result.ethusd))
        })?;

        validate_price(self.name(), price)
    }
}

use crate::error::Result;
use crate::models::GasEstimate;
use crate::services::{
    etherscan::EtherscanClient,
    fallback::{FallbackChain, Source},
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

const GAS_ORACLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Tiered gas prices from the Etherscan gas oracle.
pub struct GasSource {
    chain: FallbackChain<GasEstimate>,
}

impl GasSource {
    pub fn new(etherscan: EtherscanClient) -> Self {
        Self {
            chain: FallbackChain::new().with_source(EtherscanGasOracle::new(etherscan)),
        }
    }

    /// `None` means this cycle has no gas data and should be skipped.
    pub async fn fetch_gas_estimate(&self) -> Option<GasEstimate> {
        let estimate = self.chain.resolve().await;
        if estimate.is_none() {
            tracing::error!("Failed to fetch gas prices");
        }
        estimate
    }
}

pub struct EtherscanGasOracle {
    etherscan: EtherscanClient,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GasOracleResult {
    #[serde(default)]
    safe_gas_price: Option<Value>,
    #[serde(default)]
    standard_gas_price: Option<Value>,
    #[serde(default)]
    fast_gas_price: Option<Value>,
    #[serde(default)]
    propose_gas_price: Option<Value>,
}

impl EtherscanGasOracle {
    pub fn new(etherscan: EtherscanClient) -> Self {
        Self { etherscan }
    }
}

#[async_trait]
impl Source<GasEstimate> for EtherscanGasOracle {
    fn name(&self) -> &str {
        "etherscan-gasoracle"
    }

    fn timeout(&self) -> Duration {
        GAS_ORACLE_TIMEOUT
    }

    async fn fetch(&self) -> Result<GasEstimate> {
        let result: GasOracleResult = self
            .etherscan
            .call(self.name(), "gastracker", "gasoracle", GAS_ORACLE_TIMEOUT)
            .await?;

        Ok(GasEstimate::from_tiers(
            gwei(&result.safe_gas_price),
            gwei(&result.standard_gas_price),
            gwei(&result.fast_gas_price),
            gwei(&result.propose_gas_price),
        ))
    }
}

/// Oracle prices arrive as decimal strings; absent, empty or garbage counts as missing.
fn gwei(raw: &Option<Value>) -> Option<f64> {
    let value = match raw.as_ref()? {
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };

    (value.is_finite() && value >= 0.0).then_some(value)
}

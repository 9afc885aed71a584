use super::{fee::round_half_up, GasEstimate, TierFees};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub timestamp: DateTime<Utc>,
    pub safe: f64,
    pub standard: f64,
    pub fast: f64,
    pub eth_price: f64,

    // Older files predate the USD fee columns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_fee_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_fee_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fast_fee_usd: Option<f64>,
}

impl HistoryRecord {
    pub fn from_cycle(
        timestamp: DateTime<Utc>,
        gas: &GasEstimate,
        asset_usd_price: f64,
        fees: &TierFees,
    ) -> Self {
        Self {
            timestamp,
            safe: round_half_up(gas.safe, 2),
            standard: round_half_up(gas.standard, 2),
            fast: round_half_up(gas.fast, 2),
            eth_price: round_half_up(asset_usd_price, 2),
            safe_fee_usd: Some(round_half_up(fees.safe.fee_usd, 2)),
            standard_fee_usd: Some(round_half_up(fees.standard.fee_usd, 2)),
            fast_fee_usd: Some(round_half_up(fees.fast.fee_usd, 2)),
        }
    }
}

/// Rolling averages over the most recent records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub sample_size: usize,
    pub avg_safe: f64,
    pub avg_standard: f64,
    pub avg_fast: f64,
    /// Only present when at least one sampled record carries USD fees.
    pub usd: Option<UsdFeeAverages>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsdFeeAverages {
    pub sample_size: usize,
    pub avg_safe_fee_usd: f64,
    pub avg_standard_fee_usd: f64,
    pub avg_fast_fee_usd: f64,
}

use super::GasEstimate;

/// Gas used by a plain ETH transfer.
pub const TRANSFER_GAS_UNITS: u64 = 21_000;

const GWEI_PER_ETH: f64 = 1e9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeEstimate {
    pub gas_units: u64,
    pub price_gwei: f64,
    pub fee_gwei: f64,
    pub fee_native: f64,
    pub fee_usd: f64,
}

impl FeeEstimate {
    /// Cost of a plain transfer at `price_gwei`, priced at `asset_usd_price` per ETH.
    pub fn for_gas_price(price_gwei: f64, asset_usd_price: f64) -> Self {
        let fee_gwei = TRANSFER_GAS_UNITS as f64 * price_gwei;
        let fee_native = fee_gwei / GWEI_PER_ETH;

        Self {
            gas_units: TRANSFER_GAS_UNITS,
            price_gwei,
            fee_gwei,
            fee_native,
            fee_usd: fee_native * asset_usd_price,
        }
    }

    pub fn native_display(&self) -> String {
        format!("{:.6}", round_half_up(self.fee_native, 6))
    }

    pub fn usd_display(&self) -> String {
        format!("{:.2}", round_half_up(self.fee_usd, 2))
    }
}

/// Fee estimates for the three displayed tiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierFees {
    pub safe: FeeEstimate,
    pub standard: FeeEstimate,
    pub fast: FeeEstimate,
}

impl TierFees {
    pub fn new(gas: &GasEstimate, asset_usd_price: f64) -> Self {
        Self {
            safe: FeeEstimate::for_gas_price(gas.safe, asset_usd_price),
            standard: FeeEstimate::for_gas_price(gas.standard, asset_usd_price),
            fast: FeeEstimate::for_gas_price(gas.fast, asset_usd_price),
        }
    }

    pub fn labeled(&self) -> [(&'static str, &FeeEstimate); 3] {
        [
            ("Safe", &self.safe),
            ("Standard", &self.standard),
            ("Fast", &self.fast),
        ]
    }
}

pub fn round_half_up(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    // f64::round rounds half away from zero, which is half-up for the non-negative values here
    (value * factor).round() / factor
}

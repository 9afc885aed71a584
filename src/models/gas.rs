use serde::{Deserialize, Serialize};

/// Tiered gas prices in gwei, as reported by the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasEstimate {
    pub safe: f64,
    pub standard: f64,
    pub fast: f64,
    pub propose: f64,
}

impl GasEstimate {
    /// Fills every tier from whatever the oracle returned.
    ///
    /// - safe: safe, then propose
    /// - standard: standard, then propose, then safe
    /// - fast: fast, then propose
    ///
    /// A tier with nothing to fall back on is 0.
    pub fn from_tiers(
        safe: Option<f64>,
        standard: Option<f64>,
        fast: Option<f64>,
        propose: Option<f64>,
    ) -> Self {
        Self {
            safe: safe.or(propose).unwrap_or(0.0),
            standard: standard.or(propose).or(safe).unwrap_or(0.0),
            fast: fast.or(propose).unwrap_or(0.0),
            propose: propose.unwrap_or(0.0),
        }
    }
}

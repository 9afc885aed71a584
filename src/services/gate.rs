use crate::models::{GasEstimate, LowGasAlert, TierFees};
use std::fmt;
use std::time::Duration;

const MS_PER_MINUTE: u64 = 60_000;

/// Decides whether a low gas alert goes out, keeping the cooldown between dispatches.
///
/// Only the standard tier is compared with the threshold. The cooldown state is
/// the time of the last confirmed dispatch and nothing else.
#[derive(Debug, Clone)]
pub struct NotificationGate {
    threshold_gwei: f64,
    cooldown_ms: u64,
    last_fired_at_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    Fire(LowGasAlert),
    CoolingDown {
        standard_gwei: f64,
        remaining_minutes: u64,
    },
    AboveThreshold {
        standard_gwei: f64,
    },
}

impl GateDecision {
    pub fn should_fire(&self) -> bool {
        matches!(self, GateDecision::Fire(_))
    }
}

impl fmt::Display for GateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateDecision::Fire(alert) => {
                write!(f, "standard gas {:.2} gwei is at or below threshold", alert.standard_gwei)
            }
            GateDecision::CoolingDown { standard_gwei, remaining_minutes } => write!(
                f,
                "standard gas {:.2} gwei is still low, notification cooling down ({} min remaining)",
                standard_gwei, remaining_minutes
            ),
            GateDecision::AboveThreshold { standard_gwei } => {
                write!(f, "standard gas {:.2} gwei is above threshold", standard_gwei)
            }
        }
    }
}

impl NotificationGate {
    pub fn new(threshold_gwei: f64, cooldown: Duration) -> Self {
        Self {
            threshold_gwei,
            cooldown_ms: u64::try_from(cooldown.as_millis()).unwrap_or(u64::MAX),
            last_fired_at_ms: 0,
        }
    }

    pub fn threshold_gwei(&self) -> f64 {
        self.threshold_gwei
    }

    pub fn last_fired_at_ms(&self) -> u64 {
        self.last_fired_at_ms
    }

    pub fn evaluate(&self, gas: &GasEstimate, asset_usd_price: f64, now_ms: u64) -> GateDecision {
        let standard_gwei = gas.standard;
        if standard_gwei > self.threshold_gwei {
            return GateDecision::AboveThreshold { standard_gwei };
        }

        let elapsed = now_ms.saturating_sub(self.last_fired_at_ms);
        if elapsed > self.cooldown_ms {
            return GateDecision::Fire(self.build_alert(gas, asset_usd_price));
        }

        let remaining_ms = self.cooldown_ms - elapsed;
        GateDecision::CoolingDown {
            standard_gwei,
            remaining_minutes: remaining_ms.div_ceil(MS_PER_MINUTE),
        }
    }

    /// Starts a new cooldown window. Call only after delivery was confirmed.
    pub fn record_dispatch(&mut self, now_ms: u64) {
        self.last_fired_at_ms = now_ms;
    }

    fn build_alert(&self, gas: &GasEstimate, asset_usd_price: f64) -> LowGasAlert {
        let fees = TierFees::new(gas, asset_usd_price);

        let mut body = format!(
            "Gas price triggered the alert (<= {} Gwei)\n",
            self.threshold_gwei
        );
        for (label, fee) in fees.labeled() {
            body.push_str(&format!(
                "\n{}: {:.2} Gwei\n   Fee: {} ETH (${})\n",
                label,
                fee.price_gwei,
                fee.native_display(),
                fee.usd_display()
            ));
        }
        body.push_str("\nGood time to transact!");

        LowGasAlert {
            title: "Gas price is low!".to_string(),
            body,
            standard_gwei: gas.standard,
        }
    }
}

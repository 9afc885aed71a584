//! Console rendering of a query cycle.

use crate::models::{GasEstimate, HistorySummary, TierFees, TRANSFER_GAS_UNITS};
use chrono::{DateTime, TimeZone};
use std::fmt::{Display, Write};

pub fn render_cycle<Tz>(
    queried_at: &DateTime<Tz>,
    asset_usd_price: f64,
    gas: &GasEstimate,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let fees = TierFees::new(gas, asset_usd_price);
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "\n=== Ethereum Mainnet Gas Prices ===");
    let _ = writeln!(out, "Queried at: {}", queried_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "ETH price: ${:.2}", asset_usd_price);

    for (label, fee) in fees.labeled() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}:", label);
        let _ = writeln!(out, "   Gas price: {:.2} Gwei", fee.price_gwei);
        let _ = writeln!(
            out,
            "   Transfer fee: {} ETH (${})",
            fee.native_display(),
            fee.usd_display()
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Note: transfer fees assume a {} gas limit", TRANSFER_GAS_UNITS);
    let _ = writeln!(out, "===================================");
    out
}

pub fn render_summary(summary: Option<&HistorySummary>) -> String {
    let Some(summary) = summary else {
        return "No history data yet".to_string();
    };

    let header = format!("Average of the last {} queries:", summary.sample_size);
    let line = match &summary.usd {
        Some(usd) => format!(
            "Safe: {:.2} Gwei (${:.2}) | Standard: {:.2} Gwei (${:.2}) | Fast: {:.2} Gwei (${:.2})",
            summary.avg_safe,
            usd.avg_safe_fee_usd,
            summary.avg_standard,
            usd.avg_standard_fee_usd,
            summary.avg_fast,
            usd.avg_fast_fee_usd
        ),
        None => format!(
            "Safe: {:.2} Gwei | Standard: {:.2} Gwei | Fast: {:.2} Gwei",
            summary.avg_safe, summary.avg_standard, summary.avg_fast
        ),
    };

    format!("\n{}\n{}", header, line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UsdFeeAverages;
    use chrono::Utc;

    #[test]
    fn test_cycle_report_lists_all_tiers() {
        let queried_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let gas = GasEstimate { safe: 10.0, standard: 12.0, fast: 15.0, propose: 12.0 };

        let out = render_cycle(&queried_at, 3000.0, &gas);

        assert!(out.contains("Queried at: 2024-05-01 12:30:00"));
        assert!(out.contains("ETH price: $3000.00"));
        assert!(out.contains(
            "Safe:\n   Gas price: 10.00 Gwei\n   Transfer fee: 0.000210 ETH ($0.63)"
        ));
        assert!(out.contains("Standard:\n   Gas price: 12.00 Gwei"));
        assert!(out.contains("Fast:\n   Gas price: 15.00 Gwei"));
        assert!(out.contains("21000 gas limit"));
    }

    #[test]
    fn test_summary_without_data() {
        assert_eq!(render_summary(None), "No history data yet");
    }

    #[test]
    fn test_summary_with_and_without_usd() {
        let mut summary = HistorySummary {
            sample_size: 4,
            avg_safe: 1.0,
            avg_standard: 1.5,
            avg_fast: 2.25,
            usd: None,
        };
        let out = render_summary(Some(&summary));
        assert!(out.contains("last 4 queries"));
        assert!(out.contains("Safe: 1.00 Gwei | Standard: 1.50 Gwei | Fast: 2.25 Gwei"));

        summary.usd = Some(UsdFeeAverages {
            sample_size: 2,
            avg_safe_fee_usd: 0.06,
            avg_standard_fee_usd: 0.09,
            avg_fast_fee_usd: 0.14,
        });
        let out = render_summary(Some(&summary));
        assert!(out.contains("Safe: 1.00 Gwei ($0.06)"));
        assert!(out.contains("Fast: 2.25 Gwei ($0.14)"));
    }
}

use crate::error::Result;
use crate::models::{HistoryRecord, HistorySummary, UsdFeeAverages};
use std::path::{Path, PathBuf};

/// Records kept on disk.
pub const MAX_HISTORY_ENTRIES: usize = 100;

/// Records averaged by [`summarize`].
pub const SUMMARY_WINDOW: usize = 10;

/// Bounded log of past cycles backed by a pretty-printed JSON array.
///
/// Best effort only: read and write failures are logged and never stop the tracker.
pub struct HistoryStore {
    path: PathBuf,
    records: Vec<HistoryRecord>,
    recording: bool,
}

impl HistoryStore {
    /// Loads existing history from `path`. `recording` gates whether cycles get appended.
    pub fn open(path: impl Into<PathBuf>, recording: bool) -> Self {
        let path = path.into();
        let records = load(&path);
        tracing::debug!(
            path = %path.display(),
            entries = records.len(),
            recording,
            "History loaded"
        );

        Self {
            path,
            records,
            recording,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn append(&mut self, record: HistoryRecord) {
        self.records.push(record);
    }

    /// Trims to the newest [`MAX_HISTORY_ENTRIES`] and overwrites the file.
    pub fn save(&mut self) {
        if self.records.len() > MAX_HISTORY_ENTRIES {
            let excess = self.records.len() - MAX_HISTORY_ENTRIES;
            self.records.drain(..excess);
        }

        if let Err(e) = self.write() {
            tracing::error!(path = %self.path.display(), "Failed to save history: {}", e);
        }
    }

    /// Appends and saves when recording is on; otherwise does nothing.
    pub fn record(&mut self, record: HistoryRecord) {
        if !self.recording {
            return;
        }
        self.append(record);
        self.save();
    }

    pub fn summary(&self) -> Option<HistorySummary> {
        summarize(&self.records)
    }

    fn write(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.records)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Reads the history file. Missing file means empty history; unreadable or
/// malformed content is logged and also yields empty history.
pub fn load(path: &Path) -> Vec<HistoryRecord> {
    if !path.exists() {
        return Vec::new();
    }

    let parsed: Result<Vec<HistoryRecord>> = std::fs::read_to_string(path)
        .map_err(crate::error::GasWatchError::from)
        .and_then(|data| serde_json::from_str(&data).map_err(Into::into));

    match parsed {
        Ok(records) => records,
        Err(e) => {
            tracing::error!(path = %path.display(), "Failed to load history: {}", e);
            Vec::new()
        }
    }
}

/// Averages of the last [`SUMMARY_WINDOW`] records.
///
/// USD fee averages only cover the records of that window that carry USD fees.
pub fn summarize(records: &[HistoryRecord]) -> Option<HistorySummary> {
    if records.is_empty() {
        return None;
    }

    let recent = &records[records.len().saturating_sub(SUMMARY_WINDOW)..];
    let n = recent.len() as f64;
    let mean = |f: fn(&HistoryRecord) -> f64| recent.iter().map(f).sum::<f64>() / n;

    let with_usd: Vec<(f64, f64, f64)> = recent
        .iter()
        .filter_map(|r| match (r.safe_fee_usd, r.standard_fee_usd, r.fast_fee_usd) {
            (Some(safe), Some(standard), Some(fast)) => Some((safe, standard, fast)),
            _ => None,
        })
        .collect();

    let usd = (!with_usd.is_empty()).then(|| {
        let m = with_usd.len() as f64;
        UsdFeeAverages {
            sample_size: with_usd.len(),
            avg_safe_fee_usd: with_usd.iter().map(|t| t.0).sum::<f64>() / m,
            avg_standard_fee_usd: with_usd.iter().map(|t| t.1).sum::<f64>() / m,
            avg_fast_fee_usd: with_usd.iter().map(|t| t.2).sum::<f64>() / m,
        }
    });

    Some(HistorySummary {
        sample_size: recent.len(),
        avg_safe: mean(|r| r.safe),
        avg_standard: mean(|r| r.standard),
        avg_fast: mean(|r| r.fast),
        usd,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn record(i: u32, with_usd: bool) -> HistoryRecord {
        let base = i as f64;
        HistoryRecord {
            timestamp: Utc.timestamp_opt(1_700_000_000 + i as i64 * 60, 0).unwrap(),
            safe: base,
            standard: base + 1.0,
            fast: base + 2.0,
            eth_price: 3000.0,
            safe_fee_usd: with_usd.then_some(base / 10.0),
            standard_fee_usd: with_usd.then_some(base / 10.0 + 0.1),
            fast_fee_usd: with_usd.then_some(base / 10.0 + 0.2),
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join("none.json"), false);
        assert!(store.records().is_empty());
        assert!(store.summary().is_none());
    }

    #[test]
    fn test_malformed_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(load(&path).is_empty());
    }

    #[test]
    fn test_save_keeps_last_hundred_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        let mut store = HistoryStore::open(&path, true);

        for i in 0..130 {
            store.append(record(i, true));
        }
        store.save();

        assert_eq!(store.records().len(), MAX_HISTORY_ENTRIES);
        assert_eq!(store.records()[0].safe, 30.0);
        assert_eq!(store.records()[99].safe, 129.0);

        let reloaded = load(&path);
        assert_eq!(reloaded, store.records());
        assert!(reloaded.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn test_file_format_is_camel_case_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        let mut store = HistoryStore::open(&path, true);
        store.record(record(1, true));

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with('['));
        assert!(raw.contains("\"ethPrice\""));
        assert!(raw.contains("\"standardFeeUsd\""));
        assert!(raw.contains('\n'));
    }

    #[test]
    fn test_record_is_noop_when_disabled() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        let mut store = HistoryStore::open(&path, false);

        store.record(record(1, true));

        assert!(store.records().is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn test_reads_records_without_usd_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(
            &path,
            r#"[{"timestamp":"2024-01-01T00:00:00.000Z","safe":10,"standard":12,"fast":15,"ethPrice":2300.5}]"#,
        )
        .unwrap();

        let records = load(&path);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].standard, 12.0);
        assert!(records[0].safe_fee_usd.is_none());
    }

    #[test]
    fn test_summarize_uses_last_ten() {
        let records: Vec<_> = (0..15).map(|i| record(i, true)).collect();
        let summary = summarize(&records).unwrap();

        // records 5..=14
        assert_eq!(summary.sample_size, 10);
        assert!((summary.avg_safe - 9.5).abs() < 1e-9);
        assert!((summary.avg_standard - 10.5).abs() < 1e-9);
        assert!((summary.avg_fast - 11.5).abs() < 1e-9);

        let usd = summary.usd.unwrap();
        assert_eq!(usd.sample_size, 10);
        assert!((usd.avg_safe_fee_usd - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_usd_only_over_records_with_fees() {
        let mut records: Vec<_> = (0..8).map(|i| record(i, false)).collect();
        records.push(record(10, true));
        records.push(record(20, true));

        let summary = summarize(&records).unwrap();
        assert_eq!(summary.sample_size, 10);

        let usd = summary.usd.unwrap();
        assert_eq!(usd.sample_size, 2);
        assert!((usd.avg_safe_fee_usd - 1.5).abs() < 1e-9);
        assert!((usd.avg_fast_fee_usd - 1.7).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_without_usd() {
        let records: Vec<_> = (0..3).map(|i| record(i, false)).collect();
        let summary = summarize(&records).unwrap();
        assert_eq!(summary.sample_size, 3);
        assert!(summary.usd.is_none());
    }
}

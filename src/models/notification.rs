use serde::{Deserialize, Serialize};

/// Bark interruption level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Level {
    Active,
    TimeSensitive,
    Passive,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyOptions {
    pub sound: String,
    pub icon: String,
    pub group: String,
    pub level: Level,
    pub badge: u32,
    pub url: Option<String>,
}

impl Default for NotifyOptions {
    fn default() -> Self {
        Self {
            sound: "bell".to_string(),
            icon: "⛽".to_string(),
            group: "gas-tracker".to_string(),
            level: Level::Active,
            badge: 1,
            url: None,
        }
    }
}

impl NotifyOptions {
    /// Options for the low gas alert: critical level, rocket icon.
    pub fn low_gas() -> Self {
        Self {
            icon: "🚀".to_string(),
            level: Level::Critical,
            ..Default::default()
        }
    }
}

/// A low gas price alert ready for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct LowGasAlert {
    pub title: String,
    pub body: String,
    pub standard_gwei: f64,
}

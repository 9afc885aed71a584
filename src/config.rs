use anyhow::{bail, Context, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Notification gate
    pub gas_threshold_gwei: f64,
    pub notification_cooldown: Duration,

    // Bark push delivery
    pub bark_key: Option<String>,
    pub bark_server_url: String,

    // Upstream APIs
    pub etherscan_api_url: String,
    pub etherscan_api_key: Option<String>,
    pub coingecko_api_url: String,

    // Scheduling
    pub interval_minutes: u64,

    // History
    pub history_file: PathBuf,
    pub history_recording: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gas_threshold_gwei: 1.0,
            notification_cooldown: Duration::from_secs(30 * 60),
            bark_key: None,
            bark_server_url: "https://api.day.app".to_string(),
            etherscan_api_url: "https://api.etherscan.io/api".to_string(),
            etherscan_api_key: None,
            coingecko_api_url: "https://api.coingecko.com/api/v3".to_string(),
            interval_minutes: 1,
            history_file: PathBuf::from("gas_history.json"),
            history_recording: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let cooldown_minutes: u64 = parse_or_default(&get, "NOTIFICATION_COOLDOWN", 30, |_| true);

        let config = Self {
            gas_threshold_gwei: parse_or_default(
                &get,
                "GAS_THRESHOLD",
                defaults.gas_threshold_gwei,
                |v: &f64| v.is_finite() && *v >= 0.0,
            ),
            notification_cooldown: Duration::from_secs(cooldown_minutes.saturating_mul(60)),

            bark_key: get("BARK_KEY"),
            bark_server_url: get("BARK_SERVER_URL").unwrap_or(defaults.bark_server_url),

            etherscan_api_url: get("ETHERSCAN_API_URL").unwrap_or(defaults.etherscan_api_url),
            etherscan_api_key: get("ETHERSCAN_API_KEY"),
            coingecko_api_url: get("COINGECKO_API_URL").unwrap_or(defaults.coingecko_api_url),

            interval_minutes: parse_or_default(
                &get,
                "DEFAULT_INTERVAL",
                defaults.interval_minutes,
                |v: &u64| *v > 0,
            ),

            history_file: get("HISTORY_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.history_file),
            history_recording: match get("HISTORY_RECORDING") {
                Some(raw) => parse_flag(&raw)
                    .with_context(|| format!("Invalid HISTORY_RECORDING: {}", raw))?,
                None => defaults.history_recording,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn notifications_enabled(&self) -> bool {
        self.bark_key.is_some()
    }

    pub fn cooldown_minutes(&self) -> u64 {
        self.notification_cooldown.as_secs() / 60
    }

    fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("BARK_SERVER_URL", &self.bark_server_url),
            ("ETHERSCAN_API_URL", &self.etherscan_api_url),
            ("COINGECKO_API_URL", &self.coingecko_api_url),
        ] {
            if !url.starts_with("http") {
                bail!("{} must be HTTP(S) URL", name);
            }
        }

        tracing::debug!(
            threshold_gwei = self.gas_threshold_gwei,
            cooldown_minutes = self.cooldown_minutes(),
            interval_minutes = self.interval_minutes,
            "Configuration validated"
        );

        Ok(())
    }
}

/// Numeric settings never stop startup: an unusable value falls back to the default.
fn parse_or_default<T, G, V>(get: &G, key: &str, default: T, valid: V) -> T
where
    T: FromStr + fmt::Display,
    G: Fn(&str) -> Option<String>,
    V: Fn(&T) -> bool,
{
    let Some(raw) = get(key) else {
        return default;
    };

    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => value,
        _ => {
            tracing::warn!("Invalid {}: {}, using default {}", key, raw, default);
            default
        }
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("expected true/false"),
    }
}

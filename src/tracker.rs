use crate::config::Config;
use crate::models::{GasEstimate, HistoryRecord, NotifyOptions, TierFees};
use crate::report;
use crate::services::{
    BarkNotifier, EtherscanClient, GasSource, GateDecision, HistoryStore, NotificationGate,
    Notifier, PriceSource,
};
use anyhow::Result;
use chrono::{Local, TimeZone, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::Instrument;
use uuid::Uuid;

/// What a single query cycle ended with.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Gas data was unavailable; nothing downstream ran.
    Skipped,
    Completed {
        gas: GasEstimate,
        asset_usd_price: f64,
        decision: GateDecision,
        notified: bool,
    },
}

/// Owns every piece of state shared between query cycles.
pub struct GasTracker {
    gas: GasSource,
    price: PriceSource,
    notifier: Arc<dyn Notifier>,
    gate: Mutex<NotificationGate>,
    history: Mutex<HistoryStore>,
}

impl GasTracker {
    pub fn new(
        gas: GasSource,
        price: PriceSource,
        notifier: Arc<dyn Notifier>,
        gate: NotificationGate,
        history: HistoryStore,
    ) -> Self {
        Self {
            gas,
            price,
            notifier,
            gate: Mutex::new(gate),
            history: Mutex::new(history),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("gas-watch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let etherscan = EtherscanClient::new(
            client.clone(),
            config.etherscan_api_url.clone(),
            config.etherscan_api_key.clone(),
        );

        Ok(Self::new(
            GasSource::new(etherscan.clone()),
            PriceSource::with_defaults(client.clone(), &config.coingecko_api_url, etherscan),
            Arc::new(BarkNotifier::new(
                client,
                &config.bark_server_url,
                config.bark_key.clone(),
            )),
            NotificationGate::new(config.gas_threshold_gwei, config.notification_cooldown),
            HistoryStore::open(config.history_file.clone(), config.history_recording),
        ))
    }

    pub async fn query_once(&self) -> CycleOutcome {
        let now_ms = Utc::now().timestamp_millis().max(0) as u64;
        self.query_once_at(now_ms).await
    }

    /// Runs one cycle as if the wall clock read `now_ms`.
    pub async fn query_once_at(&self, now_ms: u64) -> CycleOutcome {
        let span = tracing::info_span!("cycle", id = %Uuid::new_v4());
        self.run_cycle(now_ms).instrument(span).await
    }

    async fn run_cycle(&self, now_ms: u64) -> CycleOutcome {
        tracing::info!("Querying gas prices and ETH price...");

        let (gas, asset_usd_price) = tokio::join!(
            self.gas.fetch_gas_estimate(),
            self.price.fetch_asset_price_usd()
        );

        let Some(gas) = gas else {
            tracing::error!("Query failed, will retry on the next cycle");
            return CycleOutcome::Skipped;
        };

        let queried_at = Utc
            .timestamp_millis_opt(now_ms as i64)
            .single()
            .unwrap_or_else(Utc::now);
        println!(
            "{}",
            report::render_cycle(&queried_at.with_timezone(&Local), asset_usd_price, &gas)
        );

        let (decision, notified) = self.notify_if_low(&gas, asset_usd_price, now_ms).await;

        {
            let mut history = self.history.lock().await;
            if history.is_recording() {
                let fees = TierFees::new(&gas, asset_usd_price);
                history.record(HistoryRecord::from_cycle(queried_at, &gas, asset_usd_price, &fees));
            }
            println!("{}", report::render_summary(history.summary().as_ref()));
        }

        CycleOutcome::Completed {
            gas,
            asset_usd_price,
            decision,
            notified,
        }
    }

    async fn notify_if_low(
        &self,
        gas: &GasEstimate,
        asset_usd_price: f64,
        now_ms: u64,
    ) -> (GateDecision, bool) {
        // Lock spans evaluate, send and record_dispatch
        let mut gate = self.gate.lock().await;
        let decision = gate.evaluate(gas, asset_usd_price, now_ms);

        let notified = match &decision {
            GateDecision::Fire(alert) => {
                let sent = self
                    .notifier
                    .send(&alert.title, &alert.body, &NotifyOptions::low_gas())
                    .await;
                if sent {
                    gate.record_dispatch(now_ms);
                    tracing::info!(
                        "Low gas notification sent ({:.2} Gwei <= {} Gwei)",
                        alert.standard_gwei,
                        gate.threshold_gwei()
                    );
                }
                sent
            }
            GateDecision::CoolingDown { .. } => {
                tracing::info!("{}", decision);
                false
            }
            GateDecision::AboveThreshold { .. } => {
                tracing::debug!("{}", decision);
                false
            }
        };

        (decision, notified)
    }
}

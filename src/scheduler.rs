use crate::tracker::GasTracker;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};

/// Runs a cycle right away, then once per interval, until `shutdown` resolves.
///
/// Cycles are awaited inside the loop, so a slow cycle delays the next tick
/// instead of overlapping with it.
pub struct Scheduler {
    tracker: Arc<GasTracker>,
    period: Duration,
}

impl Scheduler {
    pub fn new(tracker: Arc<GasTracker>, period: Duration) -> Self {
        Self { tracker, period }
    }

    pub fn every_minutes(tracker: Arc<GasTracker>, minutes: u64) -> Self {
        Self::new(tracker, Duration::from_secs(minutes.max(1) * 60))
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub async fn run<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            _ = self.run_forever() => {}
            _ = shutdown => {
                tracing::info!("Shutdown signal received, stopping scheduler");
            }
        }
    }

    async fn run_forever(&self) {
        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            // First tick completes immediately
            interval.tick().await;
            self.tracker.query_once().await;
        }
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotifyOptions;
    use crate::services::{
        EtherscanClient, GasSource, HistoryStore, NotificationGate, Notifier, PriceSource,
    };
    use async_trait::async_trait;
    use mockito::{Matcher, Server, ServerGuard};

    struct Silent;

    #[async_trait]
    impl Notifier for Silent {
        async fn send(&self, _title: &str, _body: &str, _options: &NotifyOptions) -> bool {
            false
        }
    }

    async fn oracle_server() -> ServerGuard {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api")
            .match_query(Matcher::UrlEncoded("action".into(), "ethprice".into()))
            .with_status(200)
            .with_body(r#"{"status":"1","result":{"ethusd":"3000"}}"#)
            .create_async()
            .await;
        server
    }

    fn tracker_for(server: &Server, history_dir: &tempfile::TempDir) -> Arc<GasTracker> {
        let client = reqwest::Client::new();
        let etherscan = EtherscanClient::new(client.clone(), format!("{}/api", server.url()), None);
        Arc::new(GasTracker::new(
            GasSource::new(etherscan.clone()),
            PriceSource::with_defaults(client, "http://127.0.0.1:9", etherscan),
            Arc::new(Silent),
            NotificationGate::new(1.0, Duration::ZERO),
            HistoryStore::open(history_dir.path().join("history.json"), false),
        ))
    }

    fn mock_gas_oracle(server: &mut Server) -> mockito::Mock {
        server
            .mock("GET", "/api")
            .match_query(Matcher::UrlEncoded("action".into(), "gasoracle".into()))
            .with_status(200)
            .with_body(r#"{"status":"1","result":{"ProposeGasPrice":"12"}}"#)
    }

    #[tokio::test]
    async fn test_runs_immediately_then_stops_on_shutdown() {
        let mut server = oracle_server().await;
        let oracle = mock_gas_oracle(&mut server).expect(1).create_async().await;
        let dir = tempfile::tempdir().unwrap();

        let scheduler = Scheduler::every_minutes(tracker_for(&server, &dir), 60);
        assert_eq!(scheduler.period(), Duration::from_secs(3600));

        scheduler
            .run(tokio::time::sleep(Duration::from_millis(500)))
            .await;

        oracle.assert_async().await;
    }

    #[tokio::test]
    async fn test_repeats_on_fixed_interval() {
        let mut server = oracle_server().await;
        let oracle = mock_gas_oracle(&mut server)
            .expect_at_least(3)
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();

        Scheduler::new(tracker_for(&server, &dir), Duration::from_millis(150))
            .run(tokio::time::sleep(Duration::from_millis(700)))
            .await;

        oracle.assert_async().await;
    }
}

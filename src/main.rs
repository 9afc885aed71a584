use anyhow::Result;
use gas_watch::{
    config::Config,
    scheduler::{shutdown_signal, Scheduler},
    tracker::GasTracker,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!("Starting gas-watch v{}", env!("CARGO_PKG_VERSION"));

    if config.notifications_enabled() {
        tracing::info!(
            "Bark notifications enabled (threshold: {} Gwei, cooldown: {} min)",
            config.gas_threshold_gwei,
            config.cooldown_minutes()
        );
    } else {
        tracing::warn!("BARK_KEY is not set, notifications are disabled");
        tracing::info!("Set BARK_KEY in the environment or in a .env file to enable them");
    }

    let tracker = Arc::new(GasTracker::from_config(&config)?);

    tracing::info!("Gas tracker started, querying every {} min", config.interval_minutes);
    tracing::info!(
        "History file: {} (recording {})",
        config.history_file.display(),
        if config.history_recording { "on" } else { "off" }
    );
    println!("Press Ctrl+C to exit\n");

    Scheduler::every_minutes(tracker, config.interval_minutes)
        .run(shutdown_signal())
        .await;

    println!("\n\nGas tracker stopped. Goodbye!");
    Ok(())
}

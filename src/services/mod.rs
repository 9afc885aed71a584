pub mod etherscan;
pub mod fallback;
pub mod gas;
pub mod gate;
pub mod history;
pub mod notifier;
pub mod price;

pub use etherscan::EtherscanClient;
pub use fallback::{FallbackChain, Source};
pub use gas::{EtherscanGasOracle, GasSource};
pub use gate::{GateDecision, NotificationGate};
pub use history::HistoryStore;
pub use notifier::{BarkNotifier, Notifier};
pub use price::{CoinGeckoPrice, EtherscanPrice, PriceSource, DEFAULT_ETH_PRICE_USD};

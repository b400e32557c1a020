pub mod provider;
pub mod types;

pub use provider::{PriceHistoryProvider, YahooChartProvider};
pub use types::PriceHistory;

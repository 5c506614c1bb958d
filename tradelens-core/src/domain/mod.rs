//! Domain types for TradeLens

pub mod ids;
pub mod leg;
pub mod trade;

pub use ids::{RowNumber, TradeRef};
pub use leg::{RawLeg, Side, TradeLeg};
pub use trade::{weekday_name, LegPair, Trade};

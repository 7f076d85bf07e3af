//! Pricing math
pub mod constants;
pub mod odds;
pub mod payout;
pub mod quote;
pub mod units;

pub use odds::{calculate_odds, odds_for};
pub use payout::{estimate_bet, estimate_payout, estimate_position};
pub use quote::{quote, quote_linear};
pub use units::{PrecisionFormatter, Rounding};

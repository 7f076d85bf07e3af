//! Pricing and payout estimation for prediction markets.
//!
//! Given an immutable [`types::MarketSnapshot`], the engine derives implied
//! odds ([`math::odds`]), previews the shares a bet would receive
//! ([`math::quote`]) and estimates the payout of held or hypothetical
//! positions ([`math::payout`]). Results are integer base units; render them
//! with [`math::units`].
//!
//! Every function is pure and synchronous. The on-chain contracts remain
//! authoritative; these values are previews.

pub mod error;
pub mod math;
pub mod types;

pub use error::Error;

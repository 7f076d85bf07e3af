//! Engine errors

use thiserror::Error;

use crate::{math::units::FormatError, types::PricingRegime};

#[derive(Debug, Error)]
pub enum Error {
    #[error("outcome {outcome_id} out of range ({outcome_count} outcomes)")]
    InvalidOutcome {
        outcome_id: usize,
        outcome_count: usize,
    },
    #[error("invalid amount: {reason}")]
    InvalidAmount { reason: String },
    #[error("no exact solver for pricing regime {regime:?}")]
    UnsupportedRegime { regime: PricingRegime },
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("invalid market snapshot: {reason}")]
    InvalidSnapshot { reason: String },
    #[error("market is no longer open for new stakes")]
    MarketClosed,
    #[error("invalid display configuration")]
    Config(#[from] serde_json::Error),
}

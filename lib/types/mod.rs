//! Data contracts between the external data layer and the pricing engine.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::{
    error::Error,
    math::constants::{BPS_SCALE, MAX_CONSTANT_PRODUCT_OUTCOMES, MIN_OUTCOMES},
};

pub mod position;

pub use position::{
    MarketResolution, PayoutEstimate, Position, PositionStatus, Stake,
};

/// How a market prices its outcomes.
#[derive(
    Clone, Copy, Debug, Display, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum PricingRegime {
    /// Stakes are pooled per outcome and split among winners, net of fee.
    Parimutuel,
    /// Constant-product AMM over per-outcome reserves.
    ConstantProduct,
    /// An N-outcome market the engine cannot solve exactly.
    Unsupported(usize),
}

impl PricingRegime {
    /// Pick the regime for a market from its pool type and outcome count.
    ///
    /// This is the only place a boolean pool flag is turned into a regime.
    pub fn classify(is_parimutuel: bool, outcome_count: usize) -> Self {
        if is_parimutuel {
            Self::Parimutuel
        } else if outcome_count <= MAX_CONSTANT_PRODUCT_OUTCOMES {
            Self::ConstantProduct
        } else {
            Self::Unsupported(outcome_count)
        }
    }
}

/// Immutable point-in-time read of a market's liquidity state.
///
/// For `ConstantProduct` markets `reserves` are AMM reserves. For `Parimutuel`
/// markets they are the cumulative staked volume per outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub pricing_regime: PricingRegime,
    pub outcome_count: usize,
    pub reserves: Vec<u64>,
    pub total_volume: u64,
    pub fee_rate_bps: u32,
}

impl MarketSnapshot {
    /// Build a snapshot, rejecting inconsistent shapes.
    pub fn new(
        pricing_regime: PricingRegime,
        reserves: Vec<u64>,
        total_volume: u64,
        fee_rate_bps: u32,
    ) -> Result<Self, Error> {
        let snapshot = Self {
            pricing_regime,
            outcome_count: reserves.len(),
            reserves,
            total_volume,
            fee_rate_bps,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.outcome_count < MIN_OUTCOMES {
            return Err(Error::InvalidSnapshot {
                reason: format!(
                    "market has {} outcomes, need at least {MIN_OUTCOMES}",
                    self.outcome_count
                ),
            });
        }
        if self.reserves.len() != self.outcome_count {
            return Err(Error::InvalidSnapshot {
                reason: format!(
                    "{} reserves for {} outcomes",
                    self.reserves.len(),
                    self.outcome_count
                ),
            });
        }
        if u64::from(self.fee_rate_bps) > BPS_SCALE {
            return Err(Error::InvalidSnapshot {
                reason: format!(
                    "fee rate {} bps exceeds {BPS_SCALE}",
                    self.fee_rate_bps
                ),
            });
        }
        match self.pricing_regime {
            PricingRegime::Unsupported(n) if n != self.outcome_count => {
                return Err(Error::InvalidSnapshot {
                    reason: format!(
                        "unsupported regime declares {n} outcomes, snapshot has {}",
                        self.outcome_count
                    ),
                });
            }
            _ => {}
        }
        Ok(())
    }

    pub fn check_outcome(&self, outcome_id: usize) -> Result<(), Error> {
        if outcome_id >= self.outcome_count {
            return Err(Error::InvalidOutcome {
                outcome_id,
                outcome_count: self.outcome_count,
            });
        }
        Ok(())
    }

    /// Amount left after the fee is taken from `gross_amount`.
    ///
    /// Rounds down, so the fee (`gross - net`) absorbs the remainder.
    pub fn net_amount(&self, gross_amount: u64) -> u64 {
        apply_fee(gross_amount, self.fee_rate_bps)
    }

    /// Sum of every reserve except `outcome_id`.
    ///
    /// Widened to `u128` so pooled opponents never clamp.
    pub fn opposing_reserve(&self, outcome_id: usize) -> u128 {
        self.reserves
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != outcome_id)
            .map(|(_, reserve)| u128::from(*reserve))
            .sum()
    }
}

/// `amount × (1 − fee_rate_bps / 10000)`, rounded down.
pub(crate) fn apply_fee(amount: u64, fee_rate_bps: u32) -> u64 {
    let keep = BPS_SCALE.saturating_sub(u64::from(fee_rate_bps));
    let net = u128::from(amount) * u128::from(keep) / u128::from(BPS_SCALE);
    // net <= amount, so this never truncates
    net as u64
}

/// A hypothetical or about-to-submit wager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetIntent {
    pub outcome_id: usize,
    pub gross_amount: u64,
}

impl BetIntent {
    pub fn new(outcome_id: usize, gross_amount: u64) -> Self {
        Self {
            outcome_id,
            gross_amount,
        }
    }
}

/// Where a quote came from.
#[derive(
    Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize,
)]
pub enum QuoteSource {
    /// Solved against the market's pricing regime.
    Exact,
    /// Three-outcome pooled-opponent approximation.
    PooledOpponent,
    /// `gross × display_odds` for markets without a solver. Lossy.
    LinearFallback,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteResult {
    pub shares_out: u64,
    pub net_amount: u64,
    pub fee_amount: u64,
    /// `round(10000 × (1 − shares_out / net_amount))`. Negative when the bet
    /// buys more shares than it stakes.
    pub price_impact_bps: i64,
    pub source: QuoteSource,
}

/// Implied odds for one outcome. `None` means unavailable.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutcomeOdds {
    pub outcome_id: usize,
    pub odds: Option<f64>,
    pub implied_probability: Option<f64>,
}

impl OutcomeOdds {
    pub fn unavailable(outcome_id: usize) -> Self {
        Self {
            outcome_id,
            odds: None,
            implied_probability: None,
        }
    }
}

//! Positions, market resolution and display-side position status.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::types::BetIntent;

/// Read-only mirror of an on-chain position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub outcome_id: usize,
    pub shares: u64,
    pub total_invested: u64,
}

/// What a payout estimate is computed for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stake {
    /// A position already held on-chain.
    Held(Position),
    /// A bet that has not been placed.
    Hypothetical(BetIntent),
}

impl Stake {
    pub fn outcome_id(&self) -> usize {
        match self {
            Self::Held(position) => position.outcome_id,
            Self::Hypothetical(intent) => intent.outcome_id,
        }
    }

    /// Amount the user paid, or would pay, for this stake.
    pub fn cost_basis(&self) -> u64 {
        match self {
            Self::Held(position) => position.total_invested,
            Self::Hypothetical(intent) => intent.gross_amount,
        }
    }
}

/// Settlement state of a market as observed by the data layer.
#[derive(
    Clone, Copy, Debug, Default, Display, PartialEq, Eq, Serialize, Deserialize,
)]
pub enum MarketResolution {
    #[default]
    Open,
    Settled { winning_outcome: usize },
    /// Voided or cancelled. Every stake is refunded.
    Voided,
}

impl MarketResolution {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Display-side lifecycle of a position.
///
/// The authoritative state lives on-chain; the engine only derives a status
/// from a resolution and never transitions one.
#[derive(
    Clone, Copy, Debug, Display, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum PositionStatus {
    Pending,
    Won,
    Lost,
    Refunded,
    Claimed,
}

impl PositionStatus {
    /// Status of a position on `outcome_id` under `resolution`.
    pub fn for_outcome(resolution: MarketResolution, outcome_id: usize) -> Self {
        match resolution {
            MarketResolution::Open => Self::Pending,
            MarketResolution::Settled { winning_outcome }
                if winning_outcome == outcome_id =>
            {
                Self::Won
            }
            MarketResolution::Settled { .. } => Self::Lost,
            MarketResolution::Voided => Self::Refunded,
        }
    }

    pub fn can_transition_to(&self, new_status: PositionStatus) -> bool {
        use PositionStatus::{Claimed, Lost, Pending, Refunded, Won};
        match (self, new_status) {
            (Pending, Won) => true,
            (Pending, Lost) => true,
            (Pending, Refunded) => true,

            // Claimed once redemption is observed
            (Won, Claimed) => true,

            (status, new_status) if status == &new_status => true,

            _ => false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Lost | Self::Refunded | Self::Claimed)
    }
}

/// Estimated payout for a held or hypothetical stake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutEstimate {
    pub outcome_id: usize,
    pub status: PositionStatus,
    /// Base units redeemable if the estimate holds. `None` when unavailable;
    /// a lost position is `Some(0)`.
    pub payout: Option<u64>,
    pub cost_basis: u64,
    pub profit: Option<i64>,
}

impl PayoutEstimate {
    pub fn new(
        outcome_id: usize,
        status: PositionStatus,
        payout: Option<u64>,
        cost_basis: u64,
    ) -> Self {
        let profit = payout.map(|payout| {
            let diff = i128::from(payout) - i128::from(cost_basis);
            diff.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
        });
        Self {
            outcome_id,
            status,
            payout,
            cost_basis,
            profit,
        }
    }
}

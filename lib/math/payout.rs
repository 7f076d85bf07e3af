//! Payout estimates for held and hypothetical stakes.
//!
//! A winning constant-product share redeems for one base unit. A parimutuel
//! stake receives its proportional slice of the net pool. Markets without a
//! solver pay `stake × display_odds` when the caller supplies display odds.
//!
//! Settled and voided markets need no pricing: a losing stake pays exactly 0
//! and a voided market refunds the original stake.

use crate::{
    error::Error,
    math::{
        constants::{BPS_SCALE, MAX_CONSTANT_PRODUCT_OUTCOMES},
        quote::quote,
        units::{Rounding, to_base_units_f64},
    },
    types::{
        BetIntent, MarketResolution, MarketSnapshot, PayoutEstimate, Position,
        PositionStatus, PricingRegime, Stake,
    },
};

/// Parimutuel payout: `net_pool × stake / outcome_pool`, capped at the net
/// pool.
///
/// A hypothetical bet is first added to the pools: its gross amount to the
/// total volume and its net amount to the outcome pool. A held position is
/// already part of both.
fn parimutuel_payout(snapshot: &MarketSnapshot, stake: &Stake) -> Option<u64> {
    let outcome_id = stake.outcome_id();
    let (stake_amount, added_gross, added_net) = match stake {
        Stake::Held(position) => (position.shares, 0, 0),
        Stake::Hypothetical(intent) => {
            let net = snapshot.net_amount(intent.gross_amount);
            (net, intent.gross_amount, net)
        }
    };
    let outcome_pool =
        u128::from(snapshot.reserves[outcome_id]) + u128::from(added_net);
    if outcome_pool == 0 {
        tracing::debug!(outcome_id, "empty parimutuel outcome pool");
        return None;
    }
    let total_volume =
        u128::from(snapshot.total_volume) + u128::from(added_gross);
    let keep = u128::from(BPS_SCALE - u64::from(snapshot.fee_rate_bps));
    let net_pool = total_volume * keep / u128::from(BPS_SCALE);

    let Some(scaled) = net_pool.checked_mul(u128::from(stake_amount)) else {
        tracing::warn!(
            outcome_id,
            stake_amount,
            "parimutuel payout overflows, estimate unavailable"
        );
        return None;
    };
    let payout = (scaled / outcome_pool).min(net_pool);
    u64::try_from(payout).ok()
}

/// `floor(cost_basis × display_odds)`, or `None` without display odds.
fn linear_payout(
    stake: &Stake,
    display_odds: Option<f64>,
) -> Result<Option<u64>, Error> {
    let Some(odds) = display_odds else {
        tracing::debug!(
            outcome_id = stake.outcome_id(),
            "no display odds for unsupported market, payout unavailable"
        );
        return Ok(None);
    };
    if !odds.is_finite() || odds <= 0.0 {
        return Err(Error::InvalidAmount {
            reason: format!("display odds must be positive, got {odds}"),
        });
    }
    let payout =
        to_base_units_f64(stake.cost_basis() as f64 * odds, Rounding::Down)?;
    Ok(Some(payout))
}

fn regime_payout(
    snapshot: &MarketSnapshot,
    stake: &Stake,
    display_odds: Option<f64>,
) -> Result<Option<u64>, Error> {
    match snapshot.pricing_regime {
        PricingRegime::ConstantProduct
            if snapshot.outcome_count <= MAX_CONSTANT_PRODUCT_OUTCOMES =>
        {
            match stake {
                Stake::Held(position) => Ok(Some(position.shares)),
                Stake::Hypothetical(intent) => {
                    Ok(Some(quote(snapshot, intent)?.shares_out))
                }
            }
        }
        PricingRegime::Parimutuel => Ok(parimutuel_payout(snapshot, stake)),
        PricingRegime::ConstantProduct | PricingRegime::Unsupported(_) => {
            linear_payout(stake, display_odds)
        }
    }
}

/// Estimate what `stake` pays out under `resolution`.
///
/// `display_odds` is only consulted for markets without a solver.
///
/// # Errors
/// - `InvalidOutcome` if the stake or the winning outcome is out of range
/// - `InvalidAmount` for a zero hypothetical bet or unusable display odds
/// - `MarketClosed` for a hypothetical bet on a settled or voided market
pub fn estimate_payout(
    snapshot: &MarketSnapshot,
    resolution: MarketResolution,
    stake: &Stake,
    display_odds: Option<f64>,
) -> Result<PayoutEstimate, Error> {
    snapshot.validate()?;
    let outcome_id = stake.outcome_id();
    snapshot.check_outcome(outcome_id)?;
    if let MarketResolution::Settled { winning_outcome } = resolution {
        snapshot.check_outcome(winning_outcome)?;
    }
    if let Stake::Hypothetical(intent) = stake {
        if !resolution.is_open() {
            return Err(Error::MarketClosed);
        }
        if intent.gross_amount == 0 {
            return Err(Error::InvalidAmount {
                reason: "bet amount must be positive".to_owned(),
            });
        }
    }

    let status = PositionStatus::for_outcome(resolution, outcome_id);
    let cost_basis = stake.cost_basis();
    let payout = match status {
        PositionStatus::Lost => Some(0),
        PositionStatus::Refunded => Some(cost_basis),
        PositionStatus::Pending
        | PositionStatus::Won
        | PositionStatus::Claimed => {
            regime_payout(snapshot, stake, display_odds)?
        }
    };

    let estimate = PayoutEstimate::new(outcome_id, status, payout, cost_basis);
    tracing::trace!(
        regime = %snapshot.pricing_regime,
        outcome_id,
        %status,
        payout = ?estimate.payout,
        profit = ?estimate.profit,
        "estimated payout"
    );
    Ok(estimate)
}

/// Estimate the payout of a position already held on-chain.
pub fn estimate_position(
    snapshot: &MarketSnapshot,
    resolution: MarketResolution,
    position: &Position,
    display_odds: Option<f64>,
) -> Result<PayoutEstimate, Error> {
    estimate_payout(snapshot, resolution, &Stake::Held(*position), display_odds)
}

/// Estimate the payout of a bet on an open market if its outcome wins.
pub fn estimate_bet(
    snapshot: &MarketSnapshot,
    intent: &BetIntent,
    display_odds: Option<f64>,
) -> Result<PayoutEstimate, Error> {
    estimate_payout(
        snapshot,
        MarketResolution::Open,
        &Stake::Hypothetical(*intent),
        display_odds,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parimutuel() -> MarketSnapshot {
        MarketSnapshot::new(
            PricingRegime::Parimutuel,
            vec![400_000, 600_000],
            1_000_000,
            200,
        )
        .unwrap()
    }

    fn held(outcome_id: usize, shares: u64, total_invested: u64) -> Position {
        Position {
            outcome_id,
            shares,
            total_invested,
        }
    }

    #[test]
    fn test_parimutuel_hypothetical_bet() {
        let estimate =
            estimate_bet(&parimutuel(), &BetIntent::new(0, 100_000), None)
                .unwrap();
        // 1_078_000 × 98_000 / 498_000
        assert_eq!(estimate.payout, Some(212_136));
        assert_eq!(estimate.profit, Some(112_136));
        assert_eq!(estimate.status, PositionStatus::Pending);
    }

    #[test]
    fn test_parimutuel_held_position() {
        let estimate = estimate_position(
            &parimutuel(),
            MarketResolution::Open,
            &held(0, 98_000, 100_000),
            None,
        )
        .unwrap();
        // 980_000 × 98_000 / 400_000
        assert_eq!(estimate.payout, Some(240_100));
    }

    #[test]
    fn test_parimutuel_empty_pool_is_unavailable() {
        let market = MarketSnapshot::new(
            PricingRegime::Parimutuel,
            vec![0, 600_000],
            600_000,
            200,
        )
        .unwrap();
        let estimate = estimate_position(
            &market,
            MarketResolution::Open,
            &held(0, 0, 0),
            None,
        )
        .unwrap();
        assert_eq!(estimate.payout, None);
        assert_eq!(estimate.profit, None);
    }

    #[test]
    fn test_parimutuel_payout_capped_at_net_pool() {
        // stake larger than the recorded pool
        let estimate = estimate_position(
            &parimutuel(),
            MarketResolution::Open,
            &held(0, 2_000_000, 2_000_000),
            None,
        )
        .unwrap();
        assert_eq!(estimate.payout, Some(980_000));
    }

    #[test]
    fn test_constant_product_payouts() {
        let market = MarketSnapshot::new(
            PricingRegime::ConstantProduct,
            vec![1_000_000, 1_000_000],
            0,
            200,
        )
        .unwrap();
        let bet =
            estimate_bet(&market, &BetIntent::new(0, 100_000), None).unwrap();
        assert_eq!(bet.payout, Some(89_253));

        let position = estimate_position(
            &market,
            MarketResolution::Open,
            &held(1, 150_000, 120_000),
            None,
        )
        .unwrap();
        assert_eq!(position.payout, Some(150_000));
        assert_eq!(position.profit, Some(30_000));
    }

    #[test]
    fn test_unsupported_uses_display_odds() {
        let market = MarketSnapshot::new(
            PricingRegime::Unsupported(4),
            vec![1_000; 4],
            4_000,
            0,
        )
        .unwrap();
        let bet = BetIntent::new(3, 100_000);
        assert_eq!(
            estimate_bet(&market, &bet, Some(2.5)).unwrap().payout,
            Some(250_000)
        );
        assert_eq!(estimate_bet(&market, &bet, None).unwrap().payout, None);
        assert!(matches!(
            estimate_bet(&market, &bet, Some(-1.0)),
            Err(Error::InvalidAmount { .. })
        ));

        let position = estimate_position(
            &market,
            MarketResolution::Open,
            &held(1, 0, 40_000),
            Some(1.5),
        )
        .unwrap();
        assert_eq!(position.payout, Some(60_000));
    }

    #[test]
    fn test_settled_market() {
        let market = parimutuel();
        let settled = MarketResolution::Settled { winning_outcome: 1 };

        let lost =
            estimate_position(&market, settled, &held(0, 98_000, 100_000), None)
                .unwrap();
        assert_eq!(lost.status, PositionStatus::Lost);
        assert_eq!(lost.payout, Some(0));
        assert_eq!(lost.profit, Some(-100_000));

        let won =
            estimate_position(&market, settled, &held(1, 60_000, 61_000), None)
                .unwrap();
        assert_eq!(won.status, PositionStatus::Won);
        // 980_000 × 60_000 / 600_000
        assert_eq!(won.payout, Some(98_000));
    }

    #[test]
    fn test_voided_market_refunds_stake() {
        let market = parimutuel();
        let refund = estimate_position(
            &market,
            MarketResolution::Voided,
            &held(0, 98_000, 100_000),
            None,
        )
        .unwrap();
        assert_eq!(refund.status, PositionStatus::Refunded);
        assert_eq!(refund.payout, Some(100_000));
        assert_eq!(refund.profit, Some(0));
    }

    #[test]
    fn test_estimate_errors() {
        let market = parimutuel();
        assert!(matches!(
            estimate_payout(
                &market,
                MarketResolution::Voided,
                &Stake::Hypothetical(BetIntent::new(0, 100)),
                None
            ),
            Err(Error::MarketClosed)
        ));
        assert!(matches!(
            estimate_bet(&market, &BetIntent::new(0, 0), None),
            Err(Error::InvalidAmount { .. })
        ));
        assert!(matches!(
            estimate_bet(&market, &BetIntent::new(2, 100), None),
            Err(Error::InvalidOutcome { .. })
        ));
        assert!(matches!(
            estimate_position(
                &market,
                MarketResolution::Settled { winning_outcome: 7 },
                &held(0, 1, 1),
                None
            ),
            Err(Error::InvalidOutcome { outcome_id: 7, .. })
        ));
    }
}

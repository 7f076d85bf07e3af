//! Implied odds per outcome.
//!
//! Odds are "payout per unit staked if the outcome wins" and are point-in-time
//! estimates: later bets move them. Any division that would produce a
//! non-finite value yields an unavailable outcome instead.

use crate::{
    error::Error,
    math::constants::{BPS_SCALE, MAX_CONSTANT_PRODUCT_OUTCOMES},
    types::{MarketSnapshot, OutcomeOdds, PricingRegime},
};

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// `total_volume × (1 − fee_rate_bps / 10000)` as a float.
fn net_pool(total_volume: u64, fee_rate_bps: u32) -> f64 {
    total_volume as f64 * (1.0 - f64::from(fee_rate_bps) / BPS_SCALE as f64)
}

fn parimutuel_odds(snapshot: &MarketSnapshot, outcome_id: usize) -> OutcomeOdds {
    let pool = snapshot.reserves[outcome_id];
    let net = net_pool(snapshot.total_volume, snapshot.fee_rate_bps);
    let odds = if pool > 0 {
        finite(net / pool as f64)
    } else {
        None
    };
    let implied_probability = if snapshot.total_volume > 0 {
        finite(pool as f64 / snapshot.total_volume as f64)
    } else {
        None
    };
    OutcomeOdds {
        outcome_id,
        odds,
        implied_probability,
    }
}

/// Spot price is the opposing share of the pool. With three outcomes the two
/// other reserves are pooled into one opponent, which approximates the
/// three-way invariant.
fn constant_product_odds(
    snapshot: &MarketSnapshot,
    outcome_id: usize,
) -> OutcomeOdds {
    let target = snapshot.reserves[outcome_id] as f64;
    let opposing = snapshot.opposing_reserve(outcome_id) as f64;
    let pool = target + opposing;
    if pool <= 0.0 {
        return OutcomeOdds::unavailable(outcome_id);
    }
    let price = finite(opposing / pool);
    let odds = price
        .filter(|price| *price > 0.0)
        .and_then(|price| finite(1.0 / price));
    OutcomeOdds {
        outcome_id,
        odds,
        implied_probability: price,
    }
}

fn outcome_odds(snapshot: &MarketSnapshot, outcome_id: usize) -> OutcomeOdds {
    match snapshot.pricing_regime {
        PricingRegime::Parimutuel => parimutuel_odds(snapshot, outcome_id),
        PricingRegime::ConstantProduct
            if snapshot.outcome_count <= MAX_CONSTANT_PRODUCT_OUTCOMES =>
        {
            constant_product_odds(snapshot, outcome_id)
        }
        PricingRegime::ConstantProduct | PricingRegime::Unsupported(_) => {
            OutcomeOdds::unavailable(outcome_id)
        }
    }
}

/// Odds for every outcome of the market, in outcome order.
///
/// Unsupported regimes return all outcomes unavailable; display odds for
/// those markets come from outside the engine.
pub fn calculate_odds(
    snapshot: &MarketSnapshot,
) -> Result<Vec<OutcomeOdds>, Error> {
    snapshot.validate()?;
    let odds: Vec<OutcomeOdds> = (0..snapshot.outcome_count)
        .map(|outcome_id| outcome_odds(snapshot, outcome_id))
        .collect();
    let unavailable = odds.iter().filter(|o| o.odds.is_none()).count();
    if unavailable > 0 {
        tracing::debug!(
            regime = %snapshot.pricing_regime,
            unavailable,
            outcomes = snapshot.outcome_count,
            "odds unavailable for some outcomes"
        );
    }
    Ok(odds)
}

/// Odds for a single outcome.
pub fn odds_for(
    snapshot: &MarketSnapshot,
    outcome_id: usize,
) -> Result<OutcomeOdds, Error> {
    snapshot.validate()?;
    snapshot.check_outcome(outcome_id)?;
    Ok(outcome_odds(snapshot, outcome_id))
}

//! Share quotes for a candidate bet.
//!
//! The fee comes off the gross amount before any reserve math. Constant-product
//! quotes are solved in exact integer arithmetic: the new target reserve is
//! rounded up, so `shares_out` rounds down and a preview never promises more
//! than the pool pays.

use crate::{
    error::Error,
    math::{
        constants::MAX_CONSTANT_PRODUCT_OUTCOMES,
        units::{Rounding, to_base_units_f64},
    },
    types::{BetIntent, MarketSnapshot, PricingRegime, QuoteResult, QuoteSource},
};

/// Reserves after `net_amount` enters the opposing side of a two-sided
/// constant-product pool.
///
/// The opposing side is `u128` because a pooled three-outcome opponent can
/// exceed `u64`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurveStep {
    pub target_after: u64,
    pub opposing_after: u128,
    pub shares_out: u64,
}

/// Solve `target × opposing = k` for a deposit of `net_amount` into the
/// opposing reserve.
///
/// `target_after` is the smallest integer with
/// `target_after × opposing_after >= k`. Returns `None` when the
/// opposing reserve stays empty (division by zero).
pub fn solve_constant_product(
    target: u64,
    opposing: u128,
    net_amount: u64,
) -> Option<CurveStep> {
    let opposing_after = opposing.checked_add(u128::from(net_amount))?;
    if opposing_after == 0 {
        return None;
    }
    // target − ceil(k / opposing_after) == floor(target × net / opposing_after),
    // which never forms k and stays within u128
    let shares = u128::from(target) * u128::from(net_amount) / opposing_after;
    // net <= opposing_after, so shares <= target
    let shares_out = shares as u64;
    Some(CurveStep {
        target_after: target - shares_out,
        opposing_after,
        shares_out,
    })
}

/// `round(10000 × (1 − shares_out / net_amount))`, or 0 for a zero stake.
pub fn price_impact_bps(shares_out: u64, net_amount: u64) -> i64 {
    if net_amount == 0 {
        return 0;
    }
    let impact = (1.0 - shares_out as f64 / net_amount as f64) * 10_000.0;
    impact.round() as i64
}

fn check_intent(
    snapshot: &MarketSnapshot,
    intent: &BetIntent,
) -> Result<(), Error> {
    snapshot.validate()?;
    snapshot.check_outcome(intent.outcome_id)?;
    if intent.gross_amount == 0 {
        return Err(Error::InvalidAmount {
            reason: "bet amount must be positive".to_owned(),
        });
    }
    Ok(())
}

/// Quote the shares `intent` would receive.
///
/// # Errors
/// - `InvalidOutcome` if the outcome is out of range
/// - `InvalidAmount` if the gross amount is zero
/// - `UnsupportedRegime` if the market has no exact solver; callers fall back
///   to [`quote_linear`]
pub fn quote(
    snapshot: &MarketSnapshot,
    intent: &BetIntent,
) -> Result<QuoteResult, Error> {
    check_intent(snapshot, intent)?;
    let net_amount = snapshot.net_amount(intent.gross_amount);
    let fee_amount = intent.gross_amount - net_amount;

    let (shares_out, source) = match snapshot.pricing_regime {
        // One bookkeeping share per net unit staked
        PricingRegime::Parimutuel => (net_amount, QuoteSource::Exact),
        PricingRegime::ConstantProduct
            if snapshot.outcome_count <= MAX_CONSTANT_PRODUCT_OUTCOMES =>
        {
            let source = if snapshot.outcome_count == 2 {
                QuoteSource::Exact
            } else {
                QuoteSource::PooledOpponent
            };
            let target = snapshot.reserves[intent.outcome_id];
            let opposing = snapshot.opposing_reserve(intent.outcome_id);
            match solve_constant_product(target, opposing, net_amount) {
                Some(step) => (step.shares_out, source),
                None => {
                    tracing::warn!(
                        outcome_id = intent.outcome_id,
                        target,
                        opposing,
                        net_amount,
                        "constant-product solve has no finite result, quoting zero shares"
                    );
                    (0, source)
                }
            }
        }
        regime => return Err(Error::UnsupportedRegime { regime }),
    };

    let result = QuoteResult {
        shares_out,
        net_amount,
        fee_amount,
        price_impact_bps: price_impact_bps(shares_out, net_amount),
        source,
    };
    tracing::debug!(
        regime = %snapshot.pricing_regime,
        outcome_id = intent.outcome_id,
        gross_amount = intent.gross_amount,
        net_amount,
        shares_out,
        price_impact_bps = result.price_impact_bps,
        %source,
        "quoted bet"
    );
    Ok(result)
}

/// Lossy quote for markets without a solver: `floor(gross × display_odds)`.
///
/// `display_odds` comes from outside the engine. The result ignores the
/// bet's own effect on the market, so `price_impact_bps` is 0.
pub fn quote_linear(
    snapshot: &MarketSnapshot,
    intent: &BetIntent,
    display_odds: f64,
) -> Result<QuoteResult, Error> {
    check_intent(snapshot, intent)?;
    if !display_odds.is_finite() || display_odds <= 0.0 {
        return Err(Error::InvalidAmount {
            reason: format!("display odds must be positive, got {display_odds}"),
        });
    }
    let net_amount = snapshot.net_amount(intent.gross_amount);
    let shares_out = to_base_units_f64(
        intent.gross_amount as f64 * display_odds,
        Rounding::Down,
    )?;
    tracing::debug!(
        regime = %snapshot.pricing_regime,
        outcome_id = intent.outcome_id,
        gross_amount = intent.gross_amount,
        display_odds,
        shares_out,
        "linear fallback quote"
    );
    Ok(QuoteResult {
        shares_out,
        net_amount,
        fee_amount: intent.gross_amount - net_amount,
        price_impact_bps: 0,
        source: QuoteSource::LinearFallback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant_product(reserves: Vec<u64>, fee_rate_bps: u32) -> MarketSnapshot {
        MarketSnapshot::new(
            PricingRegime::ConstantProduct,
            reserves,
            0,
            fee_rate_bps,
        )
        .unwrap()
    }

    #[test]
    fn test_two_outcome_quote() {
        let market = constant_product(vec![1_000_000, 1_000_000], 200);
        let result = quote(&market, &BetIntent::new(0, 100_000)).unwrap();
        assert_eq!(result.net_amount, 98_000);
        assert_eq!(result.fee_amount, 2_000);
        // 10^12 / 1_098_000 = 910_746.8.., rounded up to 910_747. Flooring
        // target' instead gives 89_254 and overstates the pool by one unit.
        assert_eq!(result.shares_out, 89_253);
        assert_eq!(result.source, QuoteSource::Exact);
        // 1 - 89_253 / 98_000 = 0.08925..
        assert_eq!(result.price_impact_bps, 893);
    }

    #[test]
    fn test_solve_preserves_invariant() {
        let step =
            solve_constant_product(1_000_000, 1_000_000, 98_000).unwrap();
        assert_eq!(step.target_after, 910_747);
        assert_eq!(step.opposing_after, 1_098_000);
        let k = 1_000_000u128 * 1_000_000;
        let k_after = u128::from(step.target_after) * step.opposing_after;
        assert!(k_after >= k);
        assert!(k_after - k < step.opposing_after);
    }

    #[test]
    fn test_solve_division_by_zero() {
        assert_eq!(solve_constant_product(1_000, 0, 0), None);
        let empty_target = solve_constant_product(0, 1_000, 500).unwrap();
        assert_eq!(empty_target.shares_out, 0);
    }

    #[test]
    fn test_huge_opposing_reserve_does_not_overflow() {
        let step =
            solve_constant_product(1_000, u128::from(u64::MAX), 1).unwrap();
        assert_eq!(step.opposing_after, u128::from(u64::MAX) + 1);
        assert_eq!(step.shares_out, 0);

        let target = u64::MAX / 2;
        let market = constant_product(vec![target, u64::MAX - 10], 0);
        let result = quote(&market, &BetIntent::new(0, 1_000)).unwrap();
        // (2^63 - 1) × 1_000 / (2^64 + 989)
        assert_eq!(result.shares_out, 499);

        // pooled opponents sum past u64::MAX
        let market = constant_product(vec![target, u64::MAX, u64::MAX], 0);
        let result = quote(&market, &BetIntent::new(0, 1_000_000)).unwrap();
        let opposing = 2 * u128::from(u64::MAX) + 1_000_000;
        let expected = u128::from(target) * 1_000_000 / opposing;
        assert_eq!(u128::from(result.shares_out), expected);
        assert!(result.shares_out > 0);
    }

    #[test]
    fn test_zero_division_quotes_zero_shares() {
        // 1 unit at 2% fee nets 0, and the opposing reserve is empty
        let market = constant_product(vec![1_000, 0], 200);
        let result = quote(&market, &BetIntent::new(0, 1)).unwrap();
        assert_eq!(result.net_amount, 0);
        assert_eq!(result.shares_out, 0);
        assert_eq!(result.price_impact_bps, 0);
    }

    #[test]
    fn test_cheap_side_buys_more_shares_than_stake() {
        let market = constant_product(vec![1_000, 10], 0);
        let result = quote(&market, &BetIntent::new(0, 10)).unwrap();
        assert_eq!(result.shares_out, 500);
        assert_eq!(result.price_impact_bps, -490_000);
    }

    #[test]
    fn test_three_outcome_quote_pools_opponents() {
        let market = constant_product(vec![1_000_000, 600_000, 400_000], 0);
        let result = quote(&market, &BetIntent::new(0, 100_000)).unwrap();
        // equivalent to a two-sided pool of [1_000_000, 1_000_000]
        let step =
            solve_constant_product(1_000_000, 1_000_000, 100_000).unwrap();
        assert_eq!(result.shares_out, step.shares_out);
        assert_eq!(result.source, QuoteSource::PooledOpponent);
    }

    #[test]
    fn test_parimutuel_shares_equal_net() {
        let market = MarketSnapshot::new(
            PricingRegime::Parimutuel,
            vec![400_000, 600_000],
            1_000_000,
            200,
        )
        .unwrap();
        let result = quote(&market, &BetIntent::new(1, 100_000)).unwrap();
        assert_eq!(result.shares_out, 98_000);
        assert_eq!(result.net_amount, 98_000);
        assert_eq!(result.price_impact_bps, 0);
    }

    #[test]
    fn test_quote_errors() {
        let market = constant_product(vec![1_000, 1_000, 1_000], 0);
        assert!(matches!(
            quote(&market, &BetIntent::new(5, 100)),
            Err(Error::InvalidOutcome {
                outcome_id: 5,
                outcome_count: 3
            })
        ));
        assert!(matches!(
            quote(&market, &BetIntent::new(0, 0)),
            Err(Error::InvalidAmount { .. })
        ));

        let unsupported = MarketSnapshot::new(
            PricingRegime::Unsupported(4),
            vec![1_000; 4],
            4_000,
            0,
        )
        .unwrap();
        assert!(matches!(
            quote(&unsupported, &BetIntent::new(0, 100)),
            Err(Error::UnsupportedRegime {
                regime: PricingRegime::Unsupported(4)
            })
        ));

        let oversized = constant_product(vec![1_000; 4], 0);
        assert!(matches!(
            quote(&oversized, &BetIntent::new(0, 100)),
            Err(Error::UnsupportedRegime {
                regime: PricingRegime::ConstantProduct
            })
        ));
    }

    #[test]
    fn test_full_fee_leaves_nothing() {
        let market = constant_product(vec![1_000, 1_000], 10_000);
        let result = quote(&market, &BetIntent::new(0, 500)).unwrap();
        assert_eq!(result.net_amount, 0);
        assert_eq!(result.fee_amount, 500);
        assert_eq!(result.shares_out, 0);
    }

    #[test]
    fn test_linear_fallback() {
        let unsupported = MarketSnapshot::new(
            PricingRegime::Unsupported(5),
            vec![1_000; 5],
            5_000,
            100,
        )
        .unwrap();
        let result =
            quote_linear(&unsupported, &BetIntent::new(2, 100_000), 3.5).unwrap();
        assert_eq!(result.shares_out, 350_000);
        assert_eq!(result.net_amount, 99_000);
        assert_eq!(result.source, QuoteSource::LinearFallback);

        assert!(matches!(
            quote_linear(&unsupported, &BetIntent::new(2, 100_000), f64::NAN),
            Err(Error::InvalidAmount { .. })
        ));
        assert!(matches!(
            quote_linear(&unsupported, &BetIntent::new(2, 100_000), 0.0),
            Err(Error::InvalidAmount { .. })
        ));
    }
}

//! Pricing engine constants
//!
//! # Single Source of Truth for Precision and Scale
//!
//! Every scale factor and display precision used by the pricing engine is
//! defined here. The on-chain contracts settle in integer base units, so these
//! values must agree with the deployed market contracts for previews to match
//! what a user can actually redeem.

/// Denominator for basis-point quantities
///
/// 10000 bps = 100%. Fee rates are stored as integer bps in `[0, BPS_SCALE]`.
pub const BPS_SCALE: u64 = 10_000;

/// Decimals of the settlement asset (a 6-decimal stable asset)
///
/// `1_000_000` base units render as `"1.000000"`.
pub const ASSET_DECIMALS: u32 = 6;

/// Decimal places used when rendering odds
pub const ODDS_DISPLAY_DECIMALS: u32 = 4;

/// Decimal places used when rendering basis points as a percentage
///
/// `250` bps renders as `"2.50"`.
pub const BPS_DISPLAY_DECIMALS: u32 = 2;

/// Decimal places used when rendering human-facing percentages
pub const PERCENT_DISPLAY_DECIMALS: u32 = 2;

/// Largest decimal count accepted by the formatter
///
/// Base-unit amounts are `u64`, which has at most 20 digits, so 18 decimals
/// keeps every value representable as an exact decimal.
pub const MAX_DISPLAY_DECIMALS: u32 = 18;

/// Minimum number of outcomes a market can have
pub const MIN_OUTCOMES: usize = 2;

/// Largest outcome count the constant-product solver handles
///
/// Two outcomes are solved exactly. Three outcomes use the pooled-opponent
/// approximation. Anything larger is `PricingRegime::Unsupported`.
pub const MAX_CONSTANT_PRODUCT_OUTCOMES: usize = 3;

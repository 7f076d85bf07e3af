//! Base-unit conversion utilities with standardized rounding.
//!
//! Amounts cross the engine boundary as integer base units of the settlement
//! asset. This module converts between those integers, the floating-point
//! values produced by pricing math, and the decimal strings shown to users.
//!
//! # Rounding Conventions
//! - `Rounding::Up` (ceil): Use for costs/fees charged TO user
//! - `Rounding::Down` (floor): Use for payouts TO user
//! - `Rounding::Nearest` (round half away from zero): Use for neutral
//!   calculations
//!
//! Human-facing odds and percentages are rounded half-up at the display
//! precision. Parsing user input truncates extra fractional digits toward zero.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy, prelude::FromPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::constants::{
    ASSET_DECIMALS, BPS_DISPLAY_DECIMALS, MAX_DISPLAY_DECIMALS,
    ODDS_DISPLAY_DECIMALS, PERCENT_DISPLAY_DECIMALS,
};

/// Errors that can occur during base-unit conversion and formatting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("Non-numeric amount: {0:?}")]
    NonNumeric(String),
    #[error("Non-finite value: {0}")]
    NonFinite(f64),
    #[error("Negative value not allowed: {0}")]
    Negative(String),
    #[error("Value exceeds maximum: {0}")]
    Overflow(String),
    #[error("Unsupported decimal count {decimals} (max {max})")]
    UnsupportedDecimals { decimals: u32, max: u32 },
}

/// Rounding strategy for base-unit conversions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    /// Round up (ceil) - use for costs/fees charged TO user.
    Up,
    /// Round down (floor) - use for payouts TO user.
    Down,
    /// Round to nearest - use for neutral calculations.
    Nearest,
}

fn check_decimals(decimals: u32) -> Result<(), FormatError> {
    if decimals > MAX_DISPLAY_DECIMALS {
        return Err(FormatError::UnsupportedDecimals {
            decimals,
            max: MAX_DISPLAY_DECIMALS,
        });
    }
    Ok(())
}

/// Render an integer base-unit amount as an exact decimal string.
///
/// # Examples
/// ```
/// use prediction_pricing::math::units::to_display;
///
/// assert_eq!(to_display(1_500_000, 6).unwrap(), "1.500000");
/// assert_eq!(to_display(42, 0).unwrap(), "42");
/// ```
pub fn to_display(value: u64, decimals: u32) -> Result<String, FormatError> {
    check_decimals(decimals)?;
    Ok(Decimal::from_i128_with_scale(i128::from(value), decimals).to_string())
}

/// Parse a human decimal string into integer base units.
///
/// Fractional digits beyond `decimals` are truncated toward zero, so a parsed
/// amount never exceeds what the user typed.
///
/// # Errors
/// Returns `FormatError` if:
/// - The input is empty or not a decimal number
/// - The value is negative
/// - The value does not fit in `u64` base units
pub fn to_base_units(display: &str, decimals: u32) -> Result<u64, FormatError> {
    check_decimals(decimals)?;
    let trimmed = display.trim();
    if trimmed.is_empty() {
        return Err(FormatError::NonNumeric(display.to_owned()));
    }
    let parsed = Decimal::from_str(trimmed)
        .map_err(|_| FormatError::NonNumeric(display.to_owned()))?;
    if parsed.is_sign_negative() && !parsed.is_zero() {
        return Err(FormatError::Negative(trimmed.to_owned()));
    }
    let mut truncated =
        parsed.round_dp_with_strategy(decimals, RoundingStrategy::ToZero);
    truncated.rescale(decimals);
    // rescale gives up on the requested scale when the mantissa would overflow
    if truncated.scale() != decimals {
        return Err(FormatError::Overflow(trimmed.to_owned()));
    }
    u64::try_from(truncated.mantissa())
        .map_err(|_| FormatError::Overflow(trimmed.to_owned()))
}

/// Convert f64 to u64 base units with validation and explicit rounding.
///
/// # Arguments
/// * `value` - The floating-point value (already in base units)
/// * `mode` - The rounding strategy to apply
///
/// # Errors
/// Returns `FormatError` if:
/// - Value is NaN or infinite
/// - Value is negative
/// - Rounded value exceeds u64::MAX
///
/// # Examples
/// ```
/// use prediction_pricing::math::units::{to_base_units_f64, Rounding};
///
/// // Costs round up
/// assert_eq!(to_base_units_f64(100.3, Rounding::Up).unwrap(), 101);
///
/// // Payouts round down
/// assert_eq!(to_base_units_f64(100.9, Rounding::Down).unwrap(), 100);
/// ```
pub fn to_base_units_f64(value: f64, mode: Rounding) -> Result<u64, FormatError> {
    if !value.is_finite() {
        return Err(FormatError::NonFinite(value));
    }
    if value < 0.0 {
        return Err(FormatError::Negative(value.to_string()));
    }
    let rounded = match mode {
        Rounding::Up => value.ceil(),
        Rounding::Down => value.floor(),
        Rounding::Nearest => value.round(),
    };
    if rounded >= u64::MAX as f64 {
        return Err(FormatError::Overflow(value.to_string()));
    }
    Ok(rounded as u64)
}

/// Round half-up to `decimals` places and pad with trailing zeros.
fn round_half_up(value: Decimal, decimals: u32) -> String {
    let mut rounded = value
        .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(decimals);
    rounded.to_string()
}

fn decimal_from_f64(value: f64) -> Result<Decimal, FormatError> {
    if !value.is_finite() {
        return Err(FormatError::NonFinite(value));
    }
    Decimal::from_f64(value).ok_or_else(|| FormatError::Overflow(value.to_string()))
}

/// Render odds with `decimals` places, rounding half-up.
pub fn format_odds_with(odds: f64, decimals: u32) -> Result<String, FormatError> {
    check_decimals(decimals)?;
    Ok(round_half_up(decimal_from_f64(odds)?, decimals))
}

/// Render odds with the standard 4 decimal places.
pub fn format_odds(odds: f64) -> Result<String, FormatError> {
    format_odds_with(odds, ODDS_DISPLAY_DECIMALS)
}

/// Render a basis-point value as `bps / 100`.
///
/// ```
/// use prediction_pricing::math::units::format_bps;
///
/// assert_eq!(format_bps(250), "2.50");
/// ```
pub fn format_bps(bps: u32) -> String {
    round_half_up(
        Decimal::from(bps) / Decimal::ONE_HUNDRED,
        BPS_DISPLAY_DECIMALS,
    )
}

/// Render a fraction (`0.125` = 12.5%) as a percentage, rounding half-up.
pub fn format_percent_with(
    fraction: f64,
    decimals: u32,
) -> Result<String, FormatError> {
    check_decimals(decimals)?;
    let percent = decimal_from_f64(fraction)?
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or_else(|| FormatError::Overflow(fraction.to_string()))?;
    Ok(round_half_up(percent, decimals))
}

/// Render a fraction as a percentage with the standard 2 decimal places.
pub fn format_percent(fraction: f64) -> Result<String, FormatError> {
    format_percent_with(fraction, PERCENT_DISPLAY_DECIMALS)
}

/// Display precision settings supplied by the UI layer.
///
/// Missing fields fall back to the engine defaults, so a partial JSON object
/// such as `{"odds_decimals": 2}` is a valid configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayPrecision {
    pub asset_decimals: u32,
    pub odds_decimals: u32,
    pub bps_decimals: u32,
    pub percent_decimals: u32,
}

impl Default for DisplayPrecision {
    fn default() -> Self {
        Self {
            asset_decimals: ASSET_DECIMALS,
            odds_decimals: ODDS_DISPLAY_DECIMALS,
            bps_decimals: BPS_DISPLAY_DECIMALS,
            percent_decimals: PERCENT_DISPLAY_DECIMALS,
        }
    }
}

impl DisplayPrecision {
    pub fn validate(&self) -> Result<(), FormatError> {
        [
            self.asset_decimals,
            self.odds_decimals,
            self.bps_decimals,
            self.percent_decimals,
        ]
        .into_iter()
        .try_for_each(check_decimals)
    }

    /// Load precision settings from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, crate::Error> {
        let precision: Self = serde_json::from_str(json)?;
        precision.validate()?;
        Ok(precision)
    }
}

/// Formatter bound to a set of display precisions.
///
/// Display code formats every engine output through this type instead of
/// rendering numbers itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct PrecisionFormatter {
    precision: DisplayPrecision,
}

impl PrecisionFormatter {
    pub fn new(precision: DisplayPrecision) -> Result<Self, FormatError> {
        precision.validate()?;
        Ok(Self { precision })
    }

    pub fn precision(&self) -> &DisplayPrecision {
        &self.precision
    }

    pub fn amount(&self, value: u64) -> Result<String, FormatError> {
        to_display(value, self.precision.asset_decimals)
    }

    pub fn parse_amount(&self, display: &str) -> Result<u64, FormatError> {
        to_base_units(display, self.precision.asset_decimals)
    }

    pub fn odds(&self, odds: f64) -> Result<String, FormatError> {
        format_odds_with(odds, self.precision.odds_decimals)
    }

    pub fn bps(&self, bps: u32) -> String {
        round_half_up(
            Decimal::from(bps) / Decimal::ONE_HUNDRED,
            self.precision.bps_decimals,
        )
    }

    pub fn percent(&self, fraction: f64) -> Result<String, FormatError> {
        format_percent_with(fraction, self.precision.percent_decimals)
    }
}

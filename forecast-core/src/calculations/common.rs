//! Common utility functions for forecast calculations.
//!
//! This module provides the numeric coercion every calculator relies on, plus
//! rounding and other shared operations.

use rust_decimal::Decimal;

use crate::models::{CellValue, MONTH_COUNT, MonthlyValues};

/// Converts any cell into a number.
///
/// Numbers pass through unchanged. Text is parsed as a strict decimal literal
/// (optional sign, digits, optional fraction, optional exponent) after
/// trimming surrounding whitespace. Everything else, including empty cells,
/// thousands separators and free text, is exactly zero. This never fails.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use forecast_core::CellValue;
/// use forecast_core::calculations::common::coerce;
///
/// assert_eq!(coerce(&CellValue::from_raw("8000")), dec!(8000));
/// assert_eq!(coerce(&CellValue::from_raw("1,200")), dec!(0));
/// assert_eq!(coerce(&CellValue::Empty), dec!(0));
/// ```
pub fn coerce(cell: &CellValue) -> Decimal {
    match cell {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => parse_number(s).unwrap_or(Decimal::ZERO),
        CellValue::Empty => Decimal::ZERO,
    }
}

/// Coerces an optional cell; an absent cell is zero.
pub fn coerce_opt(cell: Option<&CellValue>) -> Decimal {
    cell.map(coerce).unwrap_or(Decimal::ZERO)
}

/// Parses a strict decimal literal, returning `None` for anything else.
///
/// Values that do not fit in a [`Decimal`] are also `None`.
pub fn parse_number(input: &str) -> Option<Decimal> {
    let trimmed = input.trim();
    if !is_decimal_literal(trimmed) {
        return None;
    }

    let (mantissa, exponent) = match trimmed.find(['e', 'E']) {
        Some(pos) => (&trimmed[..pos], Some(&trimmed[pos + 1..])),
        None => (trimmed, None),
    };
    let mantissa = normalize_mantissa(mantissa);

    match exponent {
        Some(exp) => Decimal::from_scientific(&format!("{mantissa}e{exp}")).ok(),
        None => mantissa.parse::<Decimal>().ok(),
    }
}

/// Accepts `[+-]? digits? (. digits?)? ([eE] [+-]? digits)?` with at least one
/// mantissa digit.
fn is_decimal_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let mut digits = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        digits += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return false;
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}

/// Rewrites `+.5`, `5.` and similar forms into `0.5`, `5`.
fn normalize_mantissa(mantissa: &str) -> String {
    let (sign, body) = match mantissa.as_bytes().first() {
        Some(b'-') => ("-", &mantissa[1..]),
        Some(b'+') => ("", &mantissa[1..]),
        _ => ("", mantissa),
    };
    let body = body.strip_suffix('.').unwrap_or(body);
    if body.starts_with('.') {
        format!("{sign}0{body}")
    } else {
        format!("{sign}{body}")
    }
}

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// This follows standard financial rounding conventions where values at exactly
/// 0.005 are rounded up to 0.01 (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use forecast_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(34.454)), dec!(34.45));
/// assert_eq!(round_half_up(dec!(34.455)), dec!(34.46));
/// assert_eq!(round_half_up(dec!(-34.455)), dec!(-34.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use forecast_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
/// assert_eq!(max(dec!(-100.00), dec!(-200.00)), dec!(-100.00));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Month-by-month sum of `rows`.
pub fn sum_months<'a, I>(rows: I) -> MonthlyValues<Decimal>
where
    I: IntoIterator<Item = &'a MonthlyValues<Decimal>>,
{
    rows.into_iter()
        .fold([Decimal::ZERO; MONTH_COUNT], |mut acc, values| {
            for (total, value) in acc.iter_mut().zip(values) {
                *total = total.saturating_add(*value);
            }
            acc
        })
}

//! Amount parsing and reconciliation.

use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

use super::patterns::AMOUNT_PATTERN;

/// Why a list of amount attributes could not be summed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountError<'a> {
    /// The value is not a plain decimal number.
    #[error("not a number: {0:?}")]
    NotANumber(&'a str),

    /// Adding the value overflows the decimal range.
    #[error("sum overflows at {0:?}")]
    Overflow(&'a str),
}

/// Largest difference still treated as equal (one centavo).
pub fn tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// Parse an amount attribute such as `"1160.00"`.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if !AMOUNT_PATTERN.is_match(s) {
        return None;
    }
    Decimal::from_str(s).ok()
}

/// Whether two amounts agree within [`tolerance`]. Amounts whose
/// difference overflows never match.
pub fn amounts_match(a: Decimal, b: Decimal) -> bool {
    a.checked_sub(b)
        .is_some_and(|difference| difference.abs() <= tolerance())
}

/// Sum a list of amount attributes, reporting the first one that does not
/// parse or that overflows the running total.
pub fn sum_amounts<'a, I>(values: I) -> Result<Decimal, AmountError<'a>>
where
    I: IntoIterator<Item = &'a str>,
{
    values.into_iter().try_fold(Decimal::ZERO, |acc, value| {
        let amount = parse_amount(value).ok_or(AmountError::NotANumber(value))?;
        acc.checked_add(amount).ok_or(AmountError::Overflow(value))
    })
}

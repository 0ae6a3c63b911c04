// src/domain/validate.rs
use crate::money::Amount;
use thiserror::Error;

/// Why a bid input was rejected before it ever reached the backend. The
/// messages are the ones shown inline at the amount field; the server
/// applies the same rules and its rejections are surfaced through the
/// identical display path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BidInputError {
    #[error("Please enter a bid amount")]
    Missing,

    #[error("Bid amount must be a valid number")]
    NotANumber,

    #[error("Bid amount must be greater than $0")]
    NotPositive,

    #[error("Bid must be at least {0}")]
    BelowMinimum(Amount),

    #[error("Bid amount seems unreasonably high. Please verify.")]
    UnreasonablyHigh,

    #[error("Bid amount can only have up to 2 decimal places")]
    TooManyDecimals,
}

/// Validates a raw amount-field value against the current price.
///
/// Rules apply in order and the first failure wins:
/// blank, non-numeric, non-positive, below `current + $0.01`, above the
/// `current * 100` sanity ceiling (a heuristic, not a business rule),
/// more than two decimal places. Returns the parsed amount on success.
///
/// This check is advisory: the server re-validates and remains the
/// authority.
pub fn validate_bid_input(raw: &str, current_price: Amount) -> Result<Amount, BidInputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BidInputError::Missing);
    }

    let value: f64 = trimmed.parse().map_err(|_| BidInputError::NotANumber)?;
    if !value.is_finite() {
        return Err(BidInputError::NotANumber);
    }

    if value <= 0.0 {
        return Err(BidInputError::NotPositive);
    }

    let minimum = current_price.plus_cents(1);
    if value < minimum.to_f64() {
        return Err(BidInputError::BelowMinimum(minimum));
    }

    if value > current_price.to_f64() * 100.0 {
        return Err(BidInputError::UnreasonablyHigh);
    }

    if (value * 100.0).fract() != 0.0 {
        return Err(BidInputError::TooManyDecimals);
    }

    Ok(Amount::from_input(value))
}

// src/money.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Minor currency units (cents).
pub type AmountValue = i64;

/// A price in the storefront's single display currency.
///
/// Stored in minor units so that comparisons and the minimum-raise
/// arithmetic are exact; the wire format is a two-decimal number in major
/// units to match the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount {
    cents: AmountValue,
}

#[derive(Debug, Error)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    Invalid(String),

    #[error("Amounts are limited to 2 decimal places: {0}")]
    TooPrecise(String),
}

impl Amount {
    pub fn from_cents(cents: AmountValue) -> Self {
        Amount { cents }
    }

    /// Converts a major-unit value to cents, rounding to the nearest cent.
    /// Callers that need the 2-decimal-place rule enforced validate before
    /// converting.
    pub fn from_input(major: f64) -> Self {
        Amount {
            cents: (major * 100.0).round() as AmountValue,
        }
    }

    pub fn cents(&self) -> AmountValue {
        self.cents
    }

    pub fn to_f64(&self) -> f64 {
        self.cents as f64 / 100.0
    }

    pub fn plus_cents(&self, cents: AmountValue) -> Self {
        Amount {
            cents: self.cents + cents,
        }
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let major = f64::deserialize(deserializer)?;
        if !major.is_finite() {
            return Err(serde::de::Error::custom(format!(
                "amount is not a finite number: {}",
                major
            )));
        }
        Ok(Amount::from_input(major))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cents < 0 {
            write!(f, "-${}.{:02}", -self.cents / 100, (-self.cents) % 100)
        } else {
            write!(f, "${}.{:02}", self.cents / 100, self.cents % 100)
        }
    }
}

impl FromStr for Amount {
    type Err = MoneyError;

    /// Parses a plain decimal such as `12`, `12.3` or `12.34`. A leading
    /// `$` is tolerated. More than two decimals is an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix('$').unwrap_or(s);
        let (sign, s) = match s.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, s),
        };

        let (major_str, minor_str) = match s.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (s, ""),
        };

        if minor_str.len() > 2 {
            return Err(MoneyError::TooPrecise(s.to_string()));
        }

        let major = major_str
            .parse::<i64>()
            .map_err(|_| MoneyError::Invalid(s.to_string()))?;

        let minor = if minor_str.is_empty() {
            0
        } else {
            let parsed = minor_str
                .parse::<i64>()
                .map_err(|_| MoneyError::Invalid(s.to_string()))?;
            // "12.3" means 30 cents, not 3
            if minor_str.len() == 1 {
                parsed * 10
            } else {
                parsed
            }
        };

        Ok(Amount {
            cents: sign * (major * 100 + minor),
        })
    }
}

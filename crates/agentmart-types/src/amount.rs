//! Atomic AMA amounts
//!
//! Prices and transfers are integers in atomic units. One AMA is 10^9
//! atomic units; the human-readable form is for display only.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Number of decimal places of the AMA token
pub const AMA_DECIMALS: u32 = 9;

/// Atomic units per whole AMA
pub const ATOMIC_PER_AMA: u64 = 1_000_000_000;

/// Currency symbol used by the Coin contract
pub const AMA_SYMBOL: &str = "AMA";

/// Largest integer an IEEE-754 double represents exactly
const MAX_EXACT_F64: f64 = 9_007_199_254_740_992.0;

/// Why a loosely-typed amount was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is required")]
    Missing,

    #[error("amount must be a number in atomic units")]
    NotANumber,

    #[error("amount cannot be negative")]
    Negative,

    #[error("amount must be a whole number of atomic units")]
    Fractional,

    #[error("amount is out of range")]
    OutOfRange,
}

/// A non-negative amount in atomic units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AtomicAmount(pub u64);

impl AtomicAmount {
    pub const ZERO: Self = Self(0);

    pub fn new(units: u64) -> Self {
        Self(units)
    }

    pub fn units(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Parse an amount from an arbitrary JSON value.
    ///
    /// Accepts unsigned integers and floats with no fractional part that
    /// fit exactly in a double. Strings, negatives and fractions are refused
    /// rather than coerced.
    pub fn from_json(value: Option<&Value>) -> Result<Self, AmountError> {
        let number = match value {
            None | Some(Value::Null) => return Err(AmountError::Missing),
            Some(Value::Number(n)) => n,
            Some(_) => return Err(AmountError::NotANumber),
        };

        if let Some(units) = number.as_u64() {
            return Ok(Self(units));
        }
        if number.as_i64().is_some() {
            return Err(AmountError::Negative);
        }

        let float = number.as_f64().ok_or(AmountError::NotANumber)?;
        if !float.is_finite() {
            return Err(AmountError::NotANumber);
        }
        if float < 0.0 {
            return Err(AmountError::Negative);
        }
        if float.fract() != 0.0 {
            return Err(AmountError::Fractional);
        }
        if float > MAX_EXACT_F64 {
            return Err(AmountError::OutOfRange);
        }
        Ok(Self(float as u64))
    }

    /// Render as whole AMA rounded half-up to two decimals, e.g. `5.00`.
    pub fn to_ama_string(&self) -> String {
        let hundredths_unit = ATOMIC_PER_AMA / 100;
        let hundredths = (self.0 as u128 + (hundredths_unit / 2) as u128) / hundredths_unit as u128;
        format!("{}.{:02}", hundredths / 100, hundredths % 100)
    }

    /// Convert to a signed 64-bit value for storage
    pub fn to_i64(&self) -> Option<i64> {
        i64::try_from(self.0).ok()
    }

    /// Convert from a stored signed value, refusing negatives
    pub fn from_i64(value: i64) -> Option<Self> {
        u64::try_from(value).ok().map(Self)
    }
}

impl fmt::Display for AtomicAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for AtomicAmount {
    fn from(units: u64) -> Self {
        Self(units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_accepts_integers() {
        let v = json!(5_000_000_000u64);
        assert_eq!(AtomicAmount::from_json(Some(&v)).unwrap(), AtomicAmount(5_000_000_000));
        let v = json!(0);
        assert_eq!(AtomicAmount::from_json(Some(&v)).unwrap(), AtomicAmount::ZERO);
    }

    #[test]
    fn test_from_json_accepts_integral_float() {
        let v = json!(2500.0);
        assert_eq!(AtomicAmount::from_json(Some(&v)).unwrap(), AtomicAmount(2500));
    }

    #[test]
    fn test_from_json_rejections() {
        assert_eq!(AtomicAmount::from_json(None), Err(AmountError::Missing));
        assert_eq!(AtomicAmount::from_json(Some(&Value::Null)), Err(AmountError::Missing));
        assert_eq!(AtomicAmount::from_json(Some(&json!("100"))), Err(AmountError::NotANumber));
        assert_eq!(AtomicAmount::from_json(Some(&json!(-1))), Err(AmountError::Negative));
        assert_eq!(AtomicAmount::from_json(Some(&json!(-0.5))), Err(AmountError::Negative));
        assert_eq!(AtomicAmount::from_json(Some(&json!(1.5))), Err(AmountError::Fractional));
        assert_eq!(AtomicAmount::from_json(Some(&json!(1e300))), Err(AmountError::OutOfRange));
    }

    #[test]
    fn test_ama_string() {
        assert_eq!(AtomicAmount(5_000_000_000).to_ama_string(), "5.00");
        assert_eq!(AtomicAmount(1_234_567_890).to_ama_string(), "1.23");
        assert_eq!(AtomicAmount(1_235_000_000).to_ama_string(), "1.24");
        assert_eq!(AtomicAmount(0).to_ama_string(), "0.00");
    }

    #[test]
    fn test_storage_conversion() {
        assert_eq!(AtomicAmount(42).to_i64(), Some(42));
        assert_eq!(AtomicAmount(u64::MAX).to_i64(), None);
        assert_eq!(AtomicAmount::from_i64(-1), None);
    }
}

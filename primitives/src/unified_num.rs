use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified precision number with 8 significant decimals, stored as a `u64`.
///
/// All monetary values of a campaign - the budget ceiling, the cumulative
/// spend and the CPM cost - are expressed in it. (De)serialized as the raw
/// inner integer.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnifiedNum(u64);

#[derive(Debug, Error, PartialEq)]
pub enum FromFloatError {
    #[error("{0} is not a finite number")]
    NotFinite(f64),
    #[error("{0} is negative")]
    Negative(f64),
    #[error("{0} overflows the unified precision")]
    Overflow(f64),
}

impl UnifiedNum {
    pub const PRECISION: u32 = 8;
    pub const MULTIPLIER: u64 = 10_u64.pow(Self::PRECISION);
    pub const ZERO: UnifiedNum = UnifiedNum(0);

    pub fn from_u64(value: u64) -> Self {
        Self(value)
    }

    /// A value of `whole` units, e.g. `from_whole(1)` is `1.00000000`.
    pub fn from_whole(whole: u64) -> Self {
        Self(whole.saturating_mul(Self::MULTIPLIER))
    }

    /// Converts an operator supplied floating point figure, rejecting
    /// negative and non-finite input before it can reach a budget.
    pub fn from_float(value: f64) -> Result<Self, FromFloatError> {
        if !value.is_finite() {
            return Err(FromFloatError::NotFinite(value));
        }
        if value < 0.0 {
            return Err(FromFloatError::Negative(value));
        }

        let scaled = (value * Self::MULTIPLIER as f64).round();
        if scaled > u64::MAX as f64 {
            return Err(FromFloatError::Overflow(value));
        }

        Ok(Self(scaled as u64))
    }

    pub fn to_u64(self) -> u64 {
        self.0
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / Self::MULTIPLIER as f64
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    pub fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    pub fn div_floor(self, divisor: u64) -> Self {
        Self(self.0 / divisor)
    }
}

impl From<u64> for UnifiedNum {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for UnifiedNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut string_value = self.0.to_string();
        let value_length = string_value.len();
        let precision = Self::PRECISION as usize;

        if value_length > precision {
            string_value.insert(value_length - precision, '.');

            f.write_str(&string_value)
        } else {
            write!(f, "0.{:0>8}", string_value)
        }
    }
}

impl fmt::Debug for UnifiedNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnifiedNum({})", self)
    }
}

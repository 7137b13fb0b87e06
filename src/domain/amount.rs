use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

use super::error::DomainError;

/// Loyalty point amount with two decimal places of precision.
///
/// Stored as a scaled `i64` (hundredths of a point) so ledger arithmetic is
/// exact. The accrual service reports amounts as JSON numbers such as `500`
/// or `729.98`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Points(i64);

impl Points {
    const SCALE: i64 = 100;
    const DECIMALS: usize = 2;

    /// Create from raw scaled value (hundredths)
    pub fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Create from a whole number of points
    pub fn from_whole(points: i64) -> Result<Self, DomainError> {
        points
            .checked_mul(Self::SCALE)
            .map(Self)
            .ok_or(DomainError::Overflow)
    }

    /// Get raw scaled value
    pub fn raw(&self) -> i64 {
        self.0
    }

    pub fn zero() -> Self {
        Self(0)
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Parse from decimal string (e.g., "729.98")
    pub fn from_decimal_str(s: &str) -> Result<Self, DomainError> {
        let s = s.trim();

        let (is_negative, s) = match s.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, s),
        };

        let (integer_part, decimal_part) = match s.split_once('.') {
            Some((int, dec)) => (int, dec),
            None => (s, ""),
        };

        if integer_part.is_empty()
            || decimal_part.len() > Self::DECIMALS
            || !integer_part.bytes().all(|b| b.is_ascii_digit())
            || !decimal_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(DomainError::InvalidAmount);
        }

        let integer: i64 = integer_part
            .parse()
            .map_err(|_| DomainError::InvalidAmount)?;

        let decimal: i64 = if decimal_part.is_empty() {
            0
        } else {
            format!("{:0<2}", decimal_part)
                .parse()
                .map_err(|_| DomainError::InvalidAmount)?
        };

        let scaled = integer
            .checked_mul(Self::SCALE)
            .and_then(|v| v.checked_add(decimal))
            .ok_or(DomainError::Overflow)?;

        Ok(Self(if is_negative { -scaled } else { scaled }))
    }

    /// Convert from a floating point value, rounding to the nearest hundredth
    pub fn from_f64(value: f64) -> Result<Self, DomainError> {
        if !value.is_finite() {
            return Err(DomainError::InvalidAmount);
        }
        let scaled = (value * Self::SCALE as f64).round();
        if scaled.abs() >= i64::MAX as f64 {
            return Err(DomainError::Overflow);
        }
        Ok(Self(scaled as i64))
    }

    /// Convert to decimal string with 2 decimal places
    pub fn to_decimal_string(&self) -> String {
        let abs_value = self.0.abs();
        let sign = if self.0 < 0 { "-" } else { "" };
        format!(
            "{}{}.{:02}",
            sign,
            abs_value / Self::SCALE,
            abs_value % Self::SCALE
        )
    }

    pub fn checked_add(&self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(&self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(&self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

impl<'de> Deserialize<'de> for Points {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PointsVisitor;

        impl Visitor<'_> for PointsVisitor {
            type Value = Points;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a point amount as a number or decimal string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Points, E> {
                v.checked_mul(Points::SCALE)
                    .map(Points)
                    .ok_or_else(|| E::custom(DomainError::Overflow))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Points, E> {
                i64::try_from(v)
                    .map_err(|_| E::custom(DomainError::Overflow))
                    .and_then(|v| self.visit_i64(v))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Points, E> {
                Points::from_f64(v).map_err(E::custom)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Points, E> {
                Points::from_decimal_str(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(PointsVisitor)
    }
}

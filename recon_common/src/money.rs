use std::fmt::Display;

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

//--------------------------------------       Money         ---------------------------------------------------------
/// A monetary amount in minor units (e.g. cents). All order totals are carried and stored as `Money`;
/// floating point never enters the books.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Money(i64);

op!(binary Money, Add, add);
op!(binary Money, Sub, sub);
op!(inplace Money, SubAssign, sub_assign);
op!(unary Money, Neg, neg);

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in minor units: {0}")]
pub struct MoneyConversionError(String);

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Money {}

impl TryFrom<u64> for Money {
    type Error = MoneyConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(MoneyConversionError(format!("Value {} is too large to convert to Money", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Money {
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Builds an amount from whole major units, e.g. `Money::from_major(5)` is 5.00.
    pub fn from_major(major: i64) -> Self {
        Self(major * 100)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Addition that reports overflow instead of wrapping. Order totals are built from
    /// client-supplied amounts, so every sum on that path goes through here.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Multiplication that reports overflow instead of wrapping. See [`Money::checked_add`].
    pub fn checked_mul(self, rhs: i64) -> Option<Self> {
        self.0.checked_mul(rhs).map(Self)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn arithmetic_and_ordering() {
        let subtotal = Money::from(10_000);
        let shipping = Money::from(500);
        assert_eq!(subtotal + shipping, Money::from(10_500));
        assert_eq!(subtotal - shipping, Money::from(9_500));
        assert!(shipping < subtotal);
        assert_eq!(-shipping, Money::from(-500));
    }

    #[test]
    fn checked_arithmetic_reports_overflow() {
        assert_eq!(Money::from(2_500).checked_mul(4), Some(Money::from(10_000)));
        assert_eq!(Money::from(10_000).checked_add(Money::from(500)), Some(Money::from(10_500)));
        assert_eq!(Money::from(i64::MAX).checked_mul(2), None);
        assert_eq!(Money::from(i64::MAX).checked_add(Money::from(1)), None);
    }

    #[test]
    fn display_is_decimal_major_units() {
        assert_eq!(Money::from(10_500).to_string(), "105.00");
        assert_eq!(Money::from(5).to_string(), "0.05");
        assert_eq!(Money::from(-1234).to_string(), "-12.34");
        assert_eq!(Money::from_major(105), Money::from(10_500));
    }

    #[test]
    fn u64_conversion_guards_overflow() {
        assert!(Money::try_from(u64::MAX).is_err());
        assert_eq!(Money::try_from(42u64).unwrap(), Money::from(42));
    }
}
